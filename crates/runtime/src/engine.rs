//! Scaling engine: the host-facing orchestrator.
//!
//! The engine owns the sessions of one host partition, hands each callback a
//! [`ScaleContext`] built from the shared configuration, and turns the
//! notices sessions collect into [`ScalingEvent`]s.
//!
//! The host passes its query facade with every call. The engine never keeps
//! host references between calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use scaling_core::{
    ActorId, ActorReport, Combatant, ConfigurationSnapshot, CrowdControlEvent, DamageEvent, Epoch,
    HookRegistry, HostEnv, ParticipantId, ScaleContext, ScalingHook, Session, SessionId,
    SessionReport, StatUpdate,
};

use crate::error::{Result, RuntimeError};
use crate::events::{EventBus, ScalingEvent, Topic};
use crate::shared::SharedConfig;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub event_buffer_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 128,
        }
    }
}

/// Session registry plus everything a session callback needs.
pub struct ScalingEngine {
    shared: SharedConfig,
    hooks: HookRegistry,
    events: EventBus,
    sessions: BTreeMap<SessionId, Session>,
}

impl ScalingEngine {
    /// Create a new engine builder
    pub fn builder() -> ScalingEngineBuilder {
        ScalingEngineBuilder::new()
    }

    pub fn shared_config(&self) -> &SharedConfig {
        &self.shared
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Subscribe to scaling events of one topic
    pub fn subscribe(&self, topic: Topic) -> Option<tokio::sync::broadcast::Receiver<ScalingEvent>> {
        self.events.subscribe(topic)
    }

    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn session_ids(&self) -> impl Iterator<Item = SessionId> + '_ {
        self.sessions.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Registers the session for a live instance and runs its first sync.
    ///
    /// # Errors
    ///
    /// Fails when the session is already registered or the host cannot
    /// describe the instance.
    pub fn create_session(&mut self, env: HostEnv<'_>, id: SessionId) -> Result<()> {
        if self.sessions.contains_key(&id) {
            return Err(RuntimeError::SessionExists(id));
        }
        let config = self.shared.snapshot();
        let ctx = ScaleContext {
            config: &config,
            global_epoch: self.shared.global_epoch(),
            clock: self.shared.clock(),
            hooks: &self.hooks,
            env,
        };
        let mut session = Session::create(&ctx, id)
            .map_err(|source| RuntimeError::SessionCreate { session: id, source })?;
        publish_notices(&self.events, &mut session);
        info!(
            target: "runtime::engine",
            session = %id,
            sessions = self.sessions.len() + 1,
            "session registered"
        );
        self.sessions.insert(id, session);
        Ok(())
    }

    /// Drops a session and all actor state it tracked.
    pub fn destroy_session(&mut self, id: SessionId) -> bool {
        let removed = self.sessions.remove(&id).is_some();
        if removed {
            info!(target: "runtime::engine", session = %id, "session destroyed");
        }
        removed
    }

    // ------------------------------------------------------------------
    // Participant events
    // ------------------------------------------------------------------

    pub fn on_participant_enter(&mut self, env: HostEnv<'_>, session: SessionId, id: ParticipantId) {
        self.dispatch(env, session, "participant_enter", |s, ctx| {
            s.on_participant_enter(ctx, id)
        });
    }

    pub fn on_participant_exit(&mut self, env: HostEnv<'_>, session: SessionId, id: ParticipantId) {
        self.dispatch(env, session, "participant_exit", |s, ctx| {
            s.on_participant_exit(ctx, id)
        });
    }

    pub fn on_combat_enter(&mut self, env: HostEnv<'_>, session: SessionId, id: ParticipantId) {
        self.dispatch(env, session, "combat_enter", |s, ctx| s.on_combat_enter(ctx, id));
    }

    pub fn on_combat_exit(&mut self, env: HostEnv<'_>, session: SessionId, id: ParticipantId) {
        self.dispatch(env, session, "combat_exit", |s, ctx| s.on_combat_exit(ctx, id));
    }

    // ------------------------------------------------------------------
    // Actor events
    // ------------------------------------------------------------------

    /// Phase one of a spawn. `None` means "create the actor at its own level".
    pub fn select_level(&mut self, env: HostEnv<'_>, session: SessionId, id: ActorId) -> Option<u8> {
        self.dispatch(env, session, "select_level", |s, ctx| s.select_level(ctx, id))
            .flatten()
    }

    /// Phase two of a spawn.
    pub fn confirm_spawn(
        &mut self,
        env: HostEnv<'_>,
        session: SessionId,
        id: ActorId,
    ) -> Option<StatUpdate> {
        self.dispatch(env, session, "confirm_spawn", |s, ctx| s.confirm_spawn(ctx, id))
            .flatten()
    }

    pub fn on_actor_added(
        &mut self,
        env: HostEnv<'_>,
        session: SessionId,
        id: ActorId,
    ) -> Option<StatUpdate> {
        self.dispatch(env, session, "actor_added", |s, ctx| s.on_actor_added(ctx, id))
            .flatten()
    }

    pub fn on_actor_removed(&mut self, env: HostEnv<'_>, session: SessionId, id: ActorId) {
        self.dispatch(env, session, "actor_removed", |s, ctx| s.on_actor_removed(ctx, id));
    }

    pub fn on_actor_tick(
        &mut self,
        env: HostEnv<'_>,
        session: SessionId,
        id: ActorId,
    ) -> Option<StatUpdate> {
        self.dispatch(env, session, "actor_tick", |s, ctx| s.on_actor_tick(ctx, id))
            .flatten()
    }

    /// Recomputes every stale actor of a session at once.
    pub fn refresh_session(&mut self, env: HostEnv<'_>, session: SessionId) -> Vec<(ActorId, StatUpdate)> {
        self.dispatch(env, session, "refresh", |s, ctx| s.refresh_all(ctx))
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Interception
    // ------------------------------------------------------------------

    /// Unknown sessions leave the amount unchanged.
    pub fn scale_damage(&self, session: SessionId, event: &DamageEvent) -> u32 {
        self.sessions
            .get(&session)
            .map_or(event.amount, |s| s.scale_damage(event))
    }

    pub fn scale_crowd_control(&self, session: SessionId, event: &CrowdControlEvent) -> u32 {
        self.sessions
            .get(&session)
            .map_or(event.duration_ms, |s| s.scale_crowd_control(event))
    }

    pub fn scale_destructible_damage(&self, session: SessionId, source: Combatant, amount: u32) -> u32 {
        self.sessions
            .get(&session)
            .map_or(amount, |s| s.scale_destructible_damage(source, amount))
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Sets or clears an explicit population; the session resyncs at once.
    ///
    /// Returns `false` for an unknown session.
    pub fn set_population_override(
        &mut self,
        env: HostEnv<'_>,
        session: SessionId,
        population: Option<u32>,
    ) -> bool {
        info!(
            target: "runtime::engine",
            session = %session,
            ?population,
            "population override"
        );
        self.dispatch(env, session, "population_override", |s, ctx| {
            s.set_population_override(ctx, population)
        })
        .is_some()
    }

    /// Every session resyncs on its next callback.
    pub fn force_global_resync(&self) -> Epoch {
        let epoch = self.shared.bump();
        info!(target: "runtime::engine", %epoch, "global resync forced");
        epoch
    }

    /// Publishes a new configuration snapshot. Returns its generation.
    pub fn reload_config(&self, snapshot: ConfigurationSnapshot) -> u64 {
        let generation = self.shared.reload(snapshot);
        self.events
            .publish(ScalingEvent::ConfigReloaded { generation });
        generation
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    pub fn session_report(&self, id: SessionId) -> Option<SessionReport> {
        self.sessions.get(&id).map(Session::report)
    }

    pub fn session_reports(&self) -> Vec<SessionReport> {
        self.sessions.values().map(Session::report).collect()
    }

    pub fn actor_report(&self, session: SessionId, actor: ActorId) -> Option<ActorReport> {
        self.sessions.get(&session)?.actor_report(actor).ok()
    }

    pub fn actor_reports(&self, session: SessionId) -> Vec<ActorReport> {
        self.sessions
            .get(&session)
            .map(Session::actor_reports)
            .unwrap_or_default()
    }

    /// Runs `op` against a registered session and publishes its notices.
    ///
    /// Unknown sessions are logged and yield `None`.
    fn dispatch<R>(
        &mut self,
        env: HostEnv<'_>,
        id: SessionId,
        op: &'static str,
        f: impl FnOnce(&mut Session, &ScaleContext<'_>) -> R,
    ) -> Option<R> {
        let Some(session) = self.sessions.get_mut(&id) else {
            debug!(target: "runtime::engine", session = %id, op, "callback for unknown session");
            return None;
        };
        let config = self.shared.snapshot();
        let ctx = ScaleContext {
            config: &config,
            global_epoch: self.shared.global_epoch(),
            clock: self.shared.clock(),
            hooks: &self.hooks,
            env,
        };
        let result = f(session, &ctx);
        publish_notices(&self.events, session);
        Some(result)
    }
}

fn publish_notices(events: &EventBus, session: &mut Session) {
    let notify = session.config().population.notify_changes;
    let id = session.id();
    for notice in session.drain_notices() {
        if let Some(event) = ScalingEvent::from_notice(id, notice, notify) {
            events.publish(event);
        }
    }
}

/// Builder for [`ScalingEngine`].
pub struct ScalingEngineBuilder {
    config: EngineConfig,
    shared: Option<SharedConfig>,
    events: Option<EventBus>,
    hooks: Vec<Arc<dyn ScalingHook>>,
}

impl ScalingEngineBuilder {
    fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            shared: None,
            events: None,
            hooks: Vec::new(),
        }
    }

    /// Override engine configuration
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Start from a fresh handle around `snapshot`, stamped by the wall clock.
    pub fn snapshot(mut self, snapshot: ConfigurationSnapshot) -> Self {
        self.shared = Some(SharedConfig::new(snapshot));
        self
    }

    /// Share a configuration handle with other engines.
    pub fn shared_config(mut self, shared: SharedConfig) -> Self {
        self.shared = Some(shared);
        self
    }

    /// Publish on an existing bus instead of a private one.
    pub fn event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Add a customization hook. Hooks run in priority order.
    pub fn hook(mut self, hook: impl ScalingHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn build(self) -> ScalingEngine {
        let shared = self
            .shared
            .unwrap_or_else(|| SharedConfig::new(ConfigurationSnapshot::new()));
        let events = self
            .events
            .unwrap_or_else(|| EventBus::with_capacity(self.config.event_buffer_size));
        let hooks = HookRegistry::new(self.hooks);
        for (name, priority) in hooks.hooks() {
            debug!(target: "runtime::hooks", hook = name, priority, "hook registered");
        }
        ScalingEngine {
            shared,
            hooks,
            events,
            sessions: BTreeMap::new(),
        }
    }
}
