//! Shared host fake for engine tests.
#![allow(dead_code)]

use std::sync::Arc;

use runtime::{ScalingEngine, ScalingEvent, SharedConfig};
use scaling_core::{
    ActorId, ActorProfile, BaseStats, ConfigurationSnapshot, Difficulty, HostSnapshot,
    InstanceProfile, ManualClock, MapId, ParticipantId, ParticipantProfile, SessionId,
    StatUpdate, TemplateId,
};
use tokio::sync::broadcast::Receiver;

pub const DUNGEON: SessionId = SessionId(1);

/// In-memory host driving one engine.
pub struct World {
    pub host: HostSnapshot,
    pub engine: ScalingEngine,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(ConfigurationSnapshot::new())
    }

    pub fn with_config(config: ConfigurationSnapshot) -> Self {
        Self::with_engine(
            ScalingEngine::builder()
                .shared_config(manual_shared(config))
                .build(),
        )
    }

    pub fn with_engine(engine: ScalingEngine) -> Self {
        Self {
            host: HostSnapshot::with_linear_tables(90),
            engine,
        }
    }

    pub fn open(&mut self, session: SessionId, capacity: u32) {
        self.host.insert_instance(
            session,
            InstanceProfile::new(MapId(1), capacity, Difficulty::Normal),
        );
        self.engine
            .create_session(self.host.env(), session)
            .expect("session opens");
    }

    pub fn join(&mut self, session: SessionId, id: u64, level: u8) -> ParticipantId {
        let participant = ParticipantId(id);
        self.host
            .insert_participant(session, ParticipantProfile::new(participant, level));
        self.engine
            .on_participant_enter(self.host.env(), session, participant);
        participant
    }

    pub fn leave(&mut self, session: SessionId, participant: ParticipantId) {
        self.host.remove_participant(participant);
        self.engine
            .on_participant_exit(self.host.env(), session, participant);
    }

    pub fn fight(&mut self, session: SessionId, participant: ParticipantId, in_combat: bool) {
        self.host.set_in_combat(participant, in_combat);
        if in_combat {
            self.engine
                .on_combat_enter(self.host.env(), session, participant);
        } else {
            self.engine
                .on_combat_exit(self.host.env(), session, participant);
        }
    }

    /// Runs the two-phase spawn for a plain 10k-health actor.
    pub fn spawn(&mut self, session: SessionId, id: u64, level: u8) -> (ActorId, Option<StatUpdate>) {
        let actor = ActorId(id);
        self.host.insert_actor(
            ActorProfile::new(
                actor,
                TemplateId(100),
                level,
                BaseStats {
                    max_health: 10_000,
                    max_resource: 1_000,
                    armor: 400,
                },
            )
            .in_session(session),
        );
        let selected = self.engine.select_level(self.host.env(), session, actor);
        assert!(selected.is_some(), "{actor} has a level");
        let update = self.engine.confirm_spawn(self.host.env(), session, actor);
        (actor, update)
    }
}

pub fn manual_shared(config: ConfigurationSnapshot) -> SharedConfig {
    SharedConfig::with_clock(config, Arc::new(ManualClock::default()))
}

/// Everything published so far.
pub fn drain(rx: &mut Receiver<ScalingEvent>) -> Vec<ScalingEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
