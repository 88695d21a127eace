mod common;

use battle_core::{
    BattleConfig, BattleMutation, BattleState, BattleStateProxy, SeededRng, UnitId, UnitOperation,
};
use battle_runtime::{
    Authority, EventBus, Replica, ReplicaId, Resolution, RuntimeConfig, RuntimeError, Topic,
};

use common::Content;

const GRIFFINS: UnitId = UnitId(2);
const ARCHERS: UnitId = UnitId(11);

fn assert_same_units(a: &BattleState<'_>, b: &BattleState<'_>) {
    assert_eq!(a.round(), b.round());
    for unit in a.units() {
        let other = b.unit(unit.unit_id()).expect("unit should exist on both replicas");
        assert_eq!(unit.count(), other.count(), "{}", unit.unit_id());
        assert_eq!(unit.available_health(), other.available_health());
        assert_eq!(unit.initiative(), other.initiative());
        assert_eq!(unit.attack(false), other.attack(false));
        assert_eq!(unit.defence(false), other.defence(false));
        assert_eq!(unit.flags(), other.flags());
    }
}

/// Two replicas follow one authority. Replica one casts through its proxy;
/// its change only shows up once the authority's commit comes back, and both
/// replicas end up with the same state.
#[tokio::test]
async fn replicas_follow_the_authority() {
    let content = Content::bundled();
    let setup = content.setup();
    let config = RuntimeConfig::default().with_seed(content.scenario.seed);
    let (authority, handle) = Authority::new(config, EventBus::new());

    let mut one = Replica::new(
        ReplicaId(1),
        setup.build(BattleConfig::new()).expect("replica should build"),
    );
    let mut two = Replica::new(
        ReplicaId(2),
        setup.build(BattleConfig::new()).expect("replica should build"),
    );
    let mut stream_one = handle.subscribe(Topic::Mutation);
    let mut stream_two = handle.subscribe(Topic::Mutation);
    let server = tokio::spawn(authority.serve(setup.clone()));

    handle.start_round().await.expect("round should start");

    let mut proxy = handle.proposer(one.id());
    let haste = content
        .scenario
        .casts_in(1)
        .find(|c| c.spell == "Haste")
        .expect("scenario should haste the griffins");
    let receipt = {
        let target = one.battle().target(&haste.targets);
        content
            .effect(haste)
            .apply(
                &mut proxy,
                &mut SeededRng::new(content.scenario.seed),
                &content.context(haste),
                &target,
            )
            .expect("proposal should be sent")
            .expect("griffins are a valid target")
    };
    assert!(!receipt.is_applied());
    assert_eq!(proxy.in_flight(), 1);
    assert_eq!(
        one.battle().unit(GRIFFINS).unwrap().initiative(),
        6,
        "nothing is visible before the commit"
    );

    let seq = handle.applied_seq().await.expect("authority should answer");
    assert_eq!(seq, 2);
    let report = one
        .sync_to(&mut stream_one, Some(&mut proxy), seq)
        .await
        .expect("replica should catch up");
    assert_eq!(report.applied, 2);
    assert_eq!(
        report.resolved,
        vec![Resolution::Committed {
            local: receipt.ticket(),
            seq: battle_core::MutationTicket(1),
        }]
    );
    assert_eq!(proxy.in_flight(), 0);
    assert_eq!(one.battle().unit(GRIFFINS).unwrap().initiative(), 9);

    // Authority-side changes reach every follower in the same order.
    let applied = handle
        .submit(BattleMutation::new().with(ARCHERS, UnitOperation::Damage { amount: 30 }))
        .await
        .expect("damage should apply");
    assert_eq!(applied.delta(ARCHERS).unwrap().health_change, 30);
    handle
        .after_attack(GRIFFINS, ARCHERS, false, false)
        .await
        .expect("attack should be recorded");
    handle
        .unit_gets_turn(ARCHERS)
        .await
        .expect("turn should start");

    let seq = handle.applied_seq().await.expect("authority should answer");
    one.sync_to(&mut stream_one, Some(&mut proxy), seq)
        .await
        .expect("replica should catch up");
    let report = two.drain(&mut stream_two, None).expect("replica should catch up");
    assert_eq!(report.applied as u64, seq);
    assert_eq!(two.next_seq(), seq);
    assert_eq!(two.battle().unit(ARCHERS).unwrap().available_health(), 250 - 30);
    assert_same_units(one.battle(), two.battle());

    let casualties = handle.finish().await.expect("battle should finish");
    let served = server
        .await
        .expect("authority task should not panic")
        .expect("authority should finish cleanly");
    assert_eq!(casualties, served);
    let archers = casualties.iter().find(|c| c.unit == ARCHERS).unwrap();
    assert_eq!(archers.killed, 3);
}

/// Proposals the authority refuses come back as rejections for the proposer
/// only, and leave every replica untouched.
#[tokio::test]
async fn rejected_proposals_resolve_the_local_ticket() {
    let content = Content::bundled();
    let setup = content.setup();
    let (authority, handle) = Authority::new(RuntimeConfig::default(), EventBus::new());
    let mut replica = Replica::new(
        ReplicaId(7),
        setup.build(BattleConfig::new()).expect("replica should build"),
    );
    let mut stream = handle.subscribe(Topic::Mutation);
    let server = tokio::spawn(authority.serve(setup.clone()));

    let mut proxy = handle.proposer(replica.id());
    let mut bystander = handle.proposer(ReplicaId(8));

    let unknown = proxy
        .submit(BattleMutation::new().with(UnitId(99), UnitOperation::Damage { amount: 5 }))
        .expect("proposal should be sent")
        .ticket();
    let mut stale = BattleMutation::new().with(ARCHERS, UnitOperation::Damage { amount: 5 });
    stale.version = 9;
    let outdated = proxy.submit(stale).expect("proposal should be sent").ticket();

    handle.applied_seq().await.expect("authority should answer");
    let report = replica
        .drain(&mut stream, Some(&mut proxy))
        .expect("replica should drain");
    assert_eq!(report.applied, 0);
    let codes: Vec<_> = report
        .resolved
        .iter()
        .map(|r| match r {
            Resolution::Rejected { local, code, .. } => (*local, code.as_str()),
            other => panic!("unexpected resolution {other:?}"),
        })
        .collect();
    assert_eq!(
        codes,
        vec![
            (unknown, "MUTATION_UNKNOWN_UNIT"),
            (outdated, "PACKET_UNSUPPORTED_VERSION"),
        ]
    );
    assert_eq!(proxy.in_flight(), 0);
    assert_eq!(bystander.in_flight(), 0);
    assert_eq!(
        replica.battle().unit(ARCHERS).unwrap().available_health(),
        250
    );

    // A valid proposal from someone else still goes through.
    bystander
        .submit(BattleMutation::new().with(ARCHERS, UnitOperation::Damage { amount: 5 }))
        .expect("proposal should be sent");
    let seq = handle.applied_seq().await.expect("authority should answer");
    replica
        .sync_to(&mut stream, Some(&mut proxy), seq)
        .await
        .expect("replica should catch up");
    assert_eq!(
        replica.battle().unit(ARCHERS).unwrap().available_health(),
        245
    );

    drop(proxy);
    drop(bystander);
    drop(handle);
    let casualties = server
        .await
        .expect("authority task should not panic")
        .expect("authority should finish once every handle is gone");
    assert_eq!(casualties.len(), content.scenario.units.len());
}

#[tokio::test]
async fn slow_replica_reports_lag() {
    let content = Content::bundled();
    let setup = content.setup();
    let (authority, handle) = Authority::new(RuntimeConfig::default(), EventBus::with_capacity(2));
    let mut replica = Replica::new(
        ReplicaId(1),
        setup.build(BattleConfig::new()).expect("replica should build"),
    );
    let mut stream = handle.subscribe(Topic::Mutation);
    let server = tokio::spawn(authority.serve(setup.clone()));

    for _ in 0..5 {
        handle.start_round().await.expect("round should start");
    }

    assert!(matches!(
        replica.drain(&mut stream, None),
        Err(RuntimeError::ReplicaLagged { missed: 3 })
    ));

    handle.finish().await.expect("battle should finish");
    server.await.unwrap().unwrap();
}
