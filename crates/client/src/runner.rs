//! Plays a scenario's scripted casts round by round.
use anyhow::{Context, Result};
use battle_core::{BattleConfig, Casualties, SeededRng};
use battle_runtime::{
    Authority, EventBus, LocalSession, Replica, ReplicaId, Resolution, RuntimeConfig, Topic,
};
use tracing::{info, warn};

use crate::content::Content;

/// Rounds to play and the seed to play them with.
#[derive(Clone, Copy, Debug)]
pub struct RunPlan {
    pub rounds: u32,
    pub seed: u64,
}

/// Plays every round in one in-process session.
pub fn run_local(content: &Content, battle: BattleConfig, plan: RunPlan) -> Result<Vec<Casualties>> {
    let setup = content.setup()?;
    let mut session = LocalSession::new(setup.build(battle)?, plan.seed);

    for round in 1..=plan.rounds {
        if session.battle().is_over() {
            break;
        }
        session.start_round()?;
        for cast in content.scenario.casts_in(round) {
            let effect = content.effect(cast)?;
            let m = content.context(cast)?;
            match session.cast(effect, &m, &cast.targets)? {
                Some(applied) => info!(
                    round,
                    spell = %cast.spell,
                    units = applied.deltas.len(),
                    deaths = applied.deaths().count(),
                    "cast applied"
                ),
                None => info!(round, spell = %cast.spell, "cast had no effect"),
            }
        }
    }
    Ok(session.finish())
}

/// Plays every round against an authority task, proposing each cast from a
/// replica and waiting for the commit stream to catch up after each round.
pub async fn run_replicated(
    content: &Content,
    config: RuntimeConfig,
    plan: RunPlan,
) -> Result<Vec<Casualties>> {
    let setup = content.setup()?;
    let bus = EventBus::with_capacity(config.event_buffer_size);
    let battle = config.battle.clone();
    let (authority, handle) = Authority::new(config, bus);

    let mut replica = Replica::new(ReplicaId(1), setup.build(battle)?);
    let mut stream = handle.subscribe(Topic::Mutation);
    let mut proxy = handle.proposer(replica.id());
    let server = tokio::spawn(authority.serve(setup.clone()));
    let mut rng = SeededRng::new(plan.seed);

    for round in 1..=plan.rounds {
        if replica.battle().is_over() {
            break;
        }
        handle.start_round().await?;
        let seq = handle.applied_seq().await?;
        replica.sync_to(&mut stream, Some(&mut proxy), seq).await?;
        rng.scope(round, 0);

        for cast in content.scenario.casts_in(round) {
            let effect = content.effect(cast)?;
            let m = content.context(cast)?;
            let target = replica.battle().target(&cast.targets);
            if effect.apply(&mut proxy, &mut rng, &m, &target)?.is_none() {
                info!(round, spell = %cast.spell, "cast had no effect");
            }
        }

        let seq = handle.applied_seq().await?;
        let report = replica.sync_to(&mut stream, Some(&mut proxy), seq).await?;
        for resolution in report.resolved {
            match resolution {
                Resolution::Committed { local, seq } => {
                    info!(round, %local, %seq, "proposal committed")
                }
                Resolution::Rejected {
                    local,
                    code,
                    reason,
                } => warn!(round, %local, code = %code, "proposal rejected: {}", reason),
            }
        }
    }

    let casualties = handle.finish().await?;
    server
        .await
        .context("authority task panicked")??;
    Ok(casualties)
}

/// Renders the end-of-battle table.
pub fn render_casualties(content: &Content, casualties: &[Casualties]) -> String {
    let mut out = format!("{}\n", content.scenario.name);
    for c in casualties {
        let name = content
            .creatures
            .get(c.creature)
            .map(|t| t.name.as_str())
            .unwrap_or("?");
        out.push_str(&format!(
            "  {:<8} {:<4} {:<12} killed {:>4}  survivors {:>4}\n",
            c.side.to_string(),
            c.unit.0,
            name,
            c.killed,
            c.survivors
        ));
    }
    out
}
