mod common;

use common::{DUNGEON, World, drain, manual_shared};
use runtime::{RuntimeError, ScalingEngine, ScalingEvent, Topic};
use scaling_core::{
    ActorProfile, Combatant, ConfigurationSnapshot, DamageEvent, DamageKind, ErrorSeverity,
    ScalingHook, SessionId,
};

fn hit(source: Combatant, target: Combatant) -> DamageEvent {
    DamageEvent {
        source,
        target,
        amount: 1_000,
        kind: DamageKind::Damage,
    }
}

#[test]
fn sessions_are_registered_once() {
    let mut world = World::new();
    world.open(DUNGEON, 5);
    assert_eq!(world.engine.len(), 1);

    let err = world
        .engine
        .create_session(world.host.env(), DUNGEON)
        .unwrap_err();
    assert!(matches!(err, RuntimeError::SessionExists(DUNGEON)));

    // The host knows nothing about this instance.
    let err = world
        .engine
        .create_session(world.host.env(), SessionId(99))
        .unwrap_err();
    assert!(matches!(err, RuntimeError::SessionCreate { .. }));
    assert_eq!(err.severity(), ErrorSeverity::Recoverable);

    assert!(world.engine.destroy_session(DUNGEON));
    assert!(!world.engine.destroy_session(DUNGEON));
    assert!(world.engine.is_empty());
}

#[test]
fn spawned_actor_is_scaled_and_intercepted() {
    let mut world = World::new();
    world.open(DUNGEON, 5);
    let hero = world.join(DUNGEON, 1, 80);
    let (ogre, update) = world.spawn(DUNGEON, 10, 80);

    let update = update.expect("scaled on confirmation");
    assert!(update.max_health < 10_000);

    let damage = world.engine.scale_damage(
        DUNGEON,
        &hit(Combatant::Actor(ogre), Combatant::Participant(hero)),
    );
    assert!(damage < 1_000);

    let report = world.engine.actor_report(DUNGEON, ogre).expect("tracked");
    assert!(report.counted);
    assert_eq!(world.engine.actor_reports(DUNGEON).len(), 1);
}

#[test]
fn unknown_sessions_answer_neutrally() {
    let mut world = World::new();
    let ghost = SessionId(42);
    let event = hit(Combatant::World, Combatant::World);

    assert_eq!(world.engine.scale_damage(ghost, &event), 1_000);
    assert_eq!(world.engine.scale_destructible_damage(ghost, Combatant::World, 50), 50);
    assert!(!world.engine.set_population_override(world.host.env(), ghost, Some(3)));
    assert!(world.engine.refresh_session(world.host.env(), ghost).is_empty());
    assert!(world.engine.session_report(ghost).is_none());
}

#[test]
fn combat_lock_holds_population_until_everyone_disengages() {
    let mut world = World::new();
    world.open(DUNGEON, 10);
    let mut rx = world.engine.subscribe(Topic::Session).expect("session topic");

    let first = world.join(DUNGEON, 1, 80);
    world.join(DUNGEON, 2, 80);
    let third = world.join(DUNGEON, 3, 80);
    assert!(drain(&mut rx).contains(&ScalingEvent::DifficultyChanged {
        session: DUNGEON,
        raw: 3,
        adjusted: 3,
    }));

    world.fight(DUNGEON, first, true);
    assert_eq!(
        drain(&mut rx),
        vec![ScalingEvent::CombatLockChanged {
            session: DUNGEON,
            locked: true,
            floor: Some(3),
        }]
    );

    world.leave(DUNGEON, third);
    let report = world.engine.session_report(DUNGEON).expect("report");
    assert_eq!((report.raw_population, report.adjusted_population), (2, 3));
    assert!(report.combat_locked);

    world.fight(DUNGEON, first, false);
    let events = drain(&mut rx);
    assert!(events.contains(&ScalingEvent::CombatLockChanged {
        session: DUNGEON,
        locked: false,
        floor: None,
    }));
    assert!(events.contains(&ScalingEvent::DifficultyChanged {
        session: DUNGEON,
        raw: 2,
        adjusted: 2,
    }));
    let report = world.engine.session_report(DUNGEON).expect("report");
    assert_eq!(report.adjusted_population, 2);
    assert!(!report.combat_locked);
}

#[test]
fn population_notices_follow_notify_flag() {
    let mut config = ConfigurationSnapshot::new();
    config.population.notify_changes = false;
    let mut world = World::with_config(config);
    world.open(DUNGEON, 10);
    let mut rx = world.engine.subscribe(Topic::Session).expect("session topic");

    world.join(DUNGEON, 1, 80);
    world.join(DUNGEON, 2, 80);

    assert!(
        drain(&mut rx)
            .iter()
            .all(|event| !matches!(event, ScalingEvent::DifficultyChanged { .. }))
    );
}

#[test]
fn population_override_resyncs_immediately() {
    let mut world = World::new();
    world.open(DUNGEON, 25);
    world.join(DUNGEON, 1, 80);
    let mut rx = world.engine.subscribe(Topic::Session).expect("session topic");

    assert!(world.engine.set_population_override(world.host.env(), DUNGEON, Some(20)));

    let report = world.engine.session_report(DUNGEON).expect("report");
    assert_eq!(report.admin_override, Some(20));
    assert_eq!(report.adjusted_population, 20);
    assert!(
        drain(&mut rx)
            .iter()
            .any(|event| matches!(event, ScalingEvent::SessionResynced { .. }))
    );

    world.engine.set_population_override(world.host.env(), DUNGEON, None);
    let report = world.engine.session_report(DUNGEON).expect("report");
    assert_eq!(report.adjusted_population, 1);
}

#[test]
fn reload_reaches_every_engine_sharing_the_handle() {
    let shared = manual_shared(ConfigurationSnapshot::new());
    let mut north = World::with_engine(ScalingEngine::builder().shared_config(shared.clone()).build());
    let mut south = World::with_engine(ScalingEngine::builder().shared_config(shared).build());
    north.open(DUNGEON, 5);
    south.open(SessionId(2), 5);
    let mut config_rx = north.engine.subscribe(Topic::Config).expect("config topic");

    let mut disabled = ConfigurationSnapshot::new();
    disabled.enabled = false;
    let generation = north.engine.reload_config(disabled);
    assert_eq!(generation, 1);
    assert_eq!(
        drain(&mut config_rx),
        vec![ScalingEvent::ConfigReloaded { generation: 1 }]
    );

    // Sessions pick the snapshot up on their next callback.
    assert_eq!(
        south
            .engine
            .session_report(SessionId(2))
            .expect("report")
            .config_generation,
        0
    );
    south.join(SessionId(2), 7, 80);
    let (_, update) = south.spawn(SessionId(2), 70, 80);
    let report = south.engine.session_report(SessionId(2)).expect("report");
    assert_eq!(report.config_generation, 1);
    assert!(!report.enabled);
    assert!(update.is_none_or(|update| update.max_health == 10_000));
}

#[test]
fn forced_resync_refreshes_stale_actors() {
    let mut world = World::new();
    world.open(DUNGEON, 5);
    world.join(DUNGEON, 1, 80);
    let (ogre, _) = world.spawn(DUNGEON, 10, 80);
    assert!(world.engine.refresh_session(world.host.env(), DUNGEON).is_empty());

    let before = world.engine.session_report(DUNGEON).expect("report").epoch;
    world.engine.force_global_resync();

    let refreshed = world.engine.refresh_session(world.host.env(), DUNGEON);
    assert_eq!(refreshed.len(), 1);
    assert_eq!(refreshed[0].0, ogre);
    assert!(before.is_older_than(world.engine.session_report(DUNGEON).expect("report").epoch));
    // Already fresh for the new epoch.
    assert_eq!(world.engine.on_actor_tick(world.host.env(), DUNGEON, ogre), None);
}

struct FullRaid;

impl ScalingHook for FullRaid {
    fn name(&self) -> &'static str {
        "full_raid"
    }

    fn before_modify_attributes(&self, _actor: &ActorProfile, population: &mut u32) -> bool {
        *population = 5;
        true
    }
}

#[test]
fn registered_hooks_shape_recalculation() {
    let mut plain = World::new();
    plain.open(DUNGEON, 5);
    plain.join(DUNGEON, 1, 80);
    let (_, plain_update) = plain.spawn(DUNGEON, 10, 80);

    let mut hooked = World::with_engine(
        ScalingEngine::builder()
            .shared_config(manual_shared(ConfigurationSnapshot::new()))
            .hook(FullRaid)
            .build(),
    );
    assert_eq!(hooked.engine.hooks().len(), 1);
    hooked.open(DUNGEON, 5);
    hooked.join(DUNGEON, 1, 80);
    let (_, hooked_update) = hooked.spawn(DUNGEON, 10, 80);

    let plain_health = plain_update.expect("scaled").max_health;
    let hooked_health = hooked_update.expect("scaled").max_health;
    assert!(hooked_health > plain_health);
}

#[test]
fn events_serialize_for_forwarding() {
    let event = ScalingEvent::DifficultyChanged {
        session: DUNGEON,
        raw: 2,
        adjusted: 5,
    };
    let json = serde_json::to_string(&event).expect("serialize");
    let back: ScalingEvent = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, event);
}
