//! Session state, invalidation, and the per-actor side table.
//!
//! A [`Session`] exclusively owns the [`SessionState`] of one live instance
//! and the [`ActorState`]s of the actors in it. It holds the configuration
//! snapshot it last synchronized against and swaps it only during a sync.
//!
//! Every host callback runs in two phases: first the aggregate pass (roster,
//! population, monster levels, and a sync when something went stale), then
//! the derivation pass, which only reads the session snapshot and writes the
//! one actor it is about.
mod actors;
mod population;
mod sync;

pub use population::adjust_population;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::ConfigurationSnapshot;
use crate::env::{HostEnv, OracleError};
use crate::epoch::{Epoch, EpochClock};
use crate::error::ScaleError;
use crate::hooks::HookRegistry;
use crate::ids::{ActorId, SessionId};
use crate::state::{ActorState, SessionState};

/// Everything a session callback needs from its caller.
#[derive(Clone, Copy)]
pub struct ScaleContext<'a> {
    /// Snapshot current at the time of the call.
    pub config: &'a Arc<ConfigurationSnapshot>,
    pub global_epoch: Epoch,
    pub clock: &'a dyn EpochClock,
    pub hooks: &'a HookRegistry,
    pub env: HostEnv<'a>,
}

/// Something a host may want to tell the participants or its logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionNotice {
    PopulationChanged { raw: u32, adjusted: u32 },
    Resynced { epoch: Epoch },
    CombatLockChanged { locked: bool, floor: Option<u32> },
}

/// Scaling state of one live instance.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    actors: BTreeMap<ActorId, ActorState>,
    config: Arc<ConfigurationSnapshot>,
    notices: Vec<SessionNotice>,
}

impl Session {
    /// Creates the session for a live instance and runs the first sync.
    ///
    /// # Errors
    ///
    /// Fails when the instance oracle is missing or does not know `id`.
    pub fn create(ctx: &ScaleContext<'_>, id: SessionId) -> Result<Self, ScaleError> {
        let instance = ctx
            .env
            .instances()?
            .instance(id)
            .ok_or(OracleError::InstanceNotFound(id))?;
        let mut session = Self {
            state: SessionState::new(id, &instance),
            actors: BTreeMap::new(),
            config: Arc::clone(ctx.config),
            notices: Vec::new(),
        };
        debug!(
            target: "scaling::session",
            session = %id,
            map = %instance.map,
            capacity = instance.capacity,
            "session created"
        );
        session.sync_if_stale(ctx, true);
        Ok(session)
    }

    pub fn id(&self) -> SessionId {
        self.state.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &Arc<ConfigurationSnapshot> {
        &self.config
    }

    pub fn actor(&self, id: ActorId) -> Option<&ActorState> {
        self.actors.get(&id)
    }

    pub fn actors(&self) -> impl Iterator<Item = &ActorState> {
        self.actors.values()
    }

    /// Takes the notices accumulated since the last call.
    pub fn drain_notices(&mut self) -> Vec<SessionNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Marks derived values stale and owes a resync.
    fn invalidate(&mut self, ctx: &ScaleContext<'_>, reason: &'static str) {
        self.state.epoch = ctx.clock.now();
        self.state.resync_pending = true;
        debug!(
            target: "scaling::session",
            session = %self.state.id,
            epoch = %self.state.epoch,
            reason,
            "session invalidated"
        );
    }
}
