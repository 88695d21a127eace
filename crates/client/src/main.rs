//! Battle simulator binary.
//!
//! Loads battle content, builds the scenario's armies and plays its scripted
//! casts, either in one local session or against an authority task through a
//! replica, then prints the casualties.
//!
//! ```bash
//! BATTLE_SCENARIO=skirmish BATTLE_MODE=replicated RUST_LOG=debug cargo run -p battle-sim
//! ```
mod config;
mod content;
mod logging;
mod runner;

use anyhow::Result;
use battle_content::ContentFactory;

use config::{SimConfig, SimMode};
use content::Content;
use runner::RunPlan;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();
    let _guard = logging::setup_logging(config.log_dir.as_deref())?;

    let factory = match &config.content_dir {
        Some(dir) => ContentFactory::new(dir.clone()),
        None => ContentFactory::bundled(),
    };
    let content = Content::load(&factory, &config.scenario)?;

    let plan = RunPlan {
        rounds: config
            .rounds
            .unwrap_or_else(|| content.scenario.last_round().max(1)),
        seed: config.seed.unwrap_or(content.scenario.seed),
    };
    tracing::info!(
        scenario = %content.scenario.name,
        mode = %config.mode,
        rounds = plan.rounds,
        seed = plan.seed,
        "Starting battle"
    );

    let casualties = match config.mode {
        SimMode::Local => runner::run_local(&content, config.runtime.battle.clone(), plan)?,
        SimMode::Replicated => {
            let runtime = config.runtime.clone().with_seed(plan.seed);
            runner::run_replicated(&content, runtime, plan).await?
        }
    };

    print!("{}", runner::render_casualties(&content, &casualties));
    Ok(())
}
