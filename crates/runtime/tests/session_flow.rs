mod common;

use battle_core::{BattleConfig, Casualties, UnitId};
use battle_runtime::{Event, EventBus, LocalSession, RoundEvent, Topic, UnitEvent};
use tokio::sync::broadcast::error::TryRecvError;

use common::Content;

const PIKEMEN: UnitId = UnitId(1);
const GRIFFINS: UnitId = UnitId(2);
const SWORDSMEN: UnitId = UnitId(3);
const ARCHERS: UnitId = UnitId(11);
const GOLEMS: UnitId = UnitId(13);

fn play_round(session: &mut LocalSession<'_>, content: &Content, round: u32) {
    let report = session.start_round().expect("round should start");
    assert_eq!(report.round, round);
    for cast in content.scenario.casts_in(round) {
        session
            .cast(content.effect(cast), &content.context(cast), &cast.targets)
            .expect("cast should apply");
    }
}

fn run(content: &Content, seed: u64) -> Vec<Casualties> {
    let setup = content.setup();
    let battle = setup.build(BattleConfig::new()).expect("battle should build");
    let mut session = LocalSession::new(battle, seed);
    for round in 1..=content.scenario.last_round() {
        play_round(&mut session, content, round);
    }
    session.finish()
}

/// Plays the bundled skirmish round by round through a local session,
/// checking the derived numbers after every scripted cast.
#[test]
fn skirmish_plays_out_through_the_local_session() {
    let content = Content::bundled();
    let setup = content.setup();
    let battle = setup.build(BattleConfig::new()).expect("battle should build");
    let bus = EventBus::new();
    let mut unit_events = bus.subscribe(Topic::Unit);
    let mut round_events = bus.subscribe(Topic::Round);
    let mut session = LocalSession::new(battle, content.scenario.seed).with_bus(bus);

    // Round 1: haste on the griffins, then slow on the whole attacking army.
    play_round(&mut session, &content, 1);
    let unit = |id| session.battle().unit(id).expect("unit should exist");
    assert_eq!(unit(GRIFFINS).initiative(), (6 + 3) * 50 / 100);
    assert_eq!(unit(PIKEMEN).initiative(), 2);
    assert_eq!(unit(SWORDSMEN).initiative(), 2);

    // Round 2: lightning bolt hits the archers; golems are immune to it.
    play_round(&mut session, &content, 2);
    let unit = |id| session.battle().unit(id).expect("unit should exist");
    let archers = unit(ARCHERS);
    assert!(archers.count() < 25, "archers should have lost creatures");
    assert!(archers.alive());
    assert_eq!(archers.defence(false), 3 + 3);
    assert_eq!(unit(GOLEMS).available_health(), 4 * 50);
    let archers_after_bolt = archers.count();

    // Round 3: slow has run out, dispel strips haste and stone skin.
    play_round(&mut session, &content, 3);
    let unit = |id| session.battle().unit(id).expect("unit should exist");
    assert_eq!(unit(GRIFFINS).initiative(), 6);
    assert_eq!(unit(PIKEMEN).initiative(), 4);
    assert_eq!(unit(ARCHERS).defence(false), 3);
    assert!(unit(ARCHERS).count() >= archers_after_bolt);

    // Round 4: the archers are raised for this battle only; the swordsmen
    // trade their defence for attack.
    play_round(&mut session, &content, 4);
    let unit = |id| session.battle().unit(id).expect("unit should exist");
    assert_eq!(unit(ARCHERS).count(), 25);
    assert_eq!(unit(SWORDSMEN).attack(false), 10 + 12);
    assert_eq!(unit(SWORDSMEN).defence(false), 0);
    assert!(!session.battle().is_over());

    let casualties = session.finish();
    let archers = casualties
        .iter()
        .find(|c| c.unit == ARCHERS)
        .expect("archers should be reported");
    assert!(archers.killed > 0, "one-battle resurrection should be reverted");
    assert_eq!(archers.killed + archers.survivors, 25);
    let golems = casualties
        .iter()
        .find(|c| c.unit == GOLEMS)
        .expect("golems should be reported");
    assert_eq!(golems.killed, 0);

    let mut archers_hit = false;
    loop {
        match unit_events.try_recv() {
            Ok(Event::Unit(UnitEvent::Changed {
                unit, health_change, ..
            })) if unit == ARCHERS && health_change > 0 => archers_hit = true,
            Ok(Event::Unit(UnitEvent::Died { unit, .. })) => panic!("{unit} should not die"),
            Ok(_) => {}
            Err(TryRecvError::Empty) => break,
            Err(e) => panic!("unexpected receive error: {e}"),
        }
    }
    assert!(archers_hit);

    let mut rounds = Vec::new();
    while let Ok(event) = round_events.try_recv() {
        match event {
            Event::Round(RoundEvent::Started { round, .. }) => rounds.push(round),
            Event::Round(RoundEvent::Finished { casualties }) => {
                assert_eq!(casualties.len(), content.scenario.units.len());
            }
            other => panic!("unexpected event on round topic: {other:?}"),
        }
    }
    assert_eq!(rounds, vec![1, 2, 3, 4]);
}

#[test]
fn same_seed_same_outcome() {
    let content = Content::bundled();
    assert_eq!(run(&content, 7), run(&content, 7));
    assert_eq!(
        run(&content, content.scenario.seed),
        run(&content, content.scenario.seed)
    );
}
