//! Traits describing the read-only host facade.
//!
//! Oracles expose instance facts, the participant roster, actor profiles, and
//! per-level base-stat tables. The [`Env`] aggregate bundles them so the core
//! can query everything it needs without holding host pointers, and so tests
//! can substitute the in-memory [`HostSnapshot`].
mod actors;
mod error;
mod instance;
mod participants;
mod snapshot;
mod tables;

pub use actors::{
    ActorControl, ActorOracle, ActorProfile, ActorRank, BaseStats, CreatureCategory,
    CurrentStats, SummonInfo, Summoner,
};
pub use error::OracleError;
pub use instance::{InstanceOracle, InstanceProfile};
pub use participants::{ParticipantOracle, ParticipantProfile};
pub use snapshot::HostSnapshot;
pub use tables::{BaseStatRow, StatTableOracle, UnitClass};

/// Aggregates read-only oracles required by the scaling core.
pub struct Env<'a, I, P, A, T>
where
    I: InstanceOracle + ?Sized,
    P: ParticipantOracle + ?Sized,
    A: ActorOracle + ?Sized,
    T: StatTableOracle + ?Sized,
{
    instances: Option<&'a I>,
    participants: Option<&'a P>,
    actors: Option<&'a A>,
    tables: Option<&'a T>,
}

// Manual impls: deriving would demand `I: Clone` etc., which trait objects never satisfy.
impl<I, P, A, T> Clone for Env<'_, I, P, A, T>
where
    I: InstanceOracle + ?Sized,
    P: ParticipantOracle + ?Sized,
    A: ActorOracle + ?Sized,
    T: StatTableOracle + ?Sized,
{
    fn clone(&self) -> Self {
        *self
    }
}

impl<I, P, A, T> Copy for Env<'_, I, P, A, T>
where
    I: InstanceOracle + ?Sized,
    P: ParticipantOracle + ?Sized,
    A: ActorOracle + ?Sized,
    T: StatTableOracle + ?Sized,
{
}

pub type HostEnv<'a> = Env<
    'a,
    dyn InstanceOracle + 'a,
    dyn ParticipantOracle + 'a,
    dyn ActorOracle + 'a,
    dyn StatTableOracle + 'a,
>;

impl<'a, I, P, A, T> Env<'a, I, P, A, T>
where
    I: InstanceOracle + ?Sized,
    P: ParticipantOracle + ?Sized,
    A: ActorOracle + ?Sized,
    T: StatTableOracle + ?Sized,
{
    pub fn new(
        instances: Option<&'a I>,
        participants: Option<&'a P>,
        actors: Option<&'a A>,
        tables: Option<&'a T>,
    ) -> Self {
        Self {
            instances,
            participants,
            actors,
            tables,
        }
    }

    pub fn with_all(instances: &'a I, participants: &'a P, actors: &'a A, tables: &'a T) -> Self {
        Self::new(
            Some(instances),
            Some(participants),
            Some(actors),
            Some(tables),
        )
    }

    pub fn empty() -> Self {
        Self {
            instances: None,
            participants: None,
            actors: None,
            tables: None,
        }
    }

    /// Returns the InstanceOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::InstancesNotAvailable` if no instance oracle was provided.
    pub fn instances(&self) -> Result<&'a I, OracleError> {
        self.instances.ok_or(OracleError::InstancesNotAvailable)
    }

    /// Returns the ParticipantOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ParticipantsNotAvailable` if no participant oracle was provided.
    pub fn participants(&self) -> Result<&'a P, OracleError> {
        self.participants
            .ok_or(OracleError::ParticipantsNotAvailable)
    }

    /// Returns the ActorOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::ActorsNotAvailable` if no actor oracle was provided.
    pub fn actors(&self) -> Result<&'a A, OracleError> {
        self.actors.ok_or(OracleError::ActorsNotAvailable)
    }

    /// Returns the StatTableOracle, or an error if not available.
    ///
    /// # Errors
    ///
    /// Returns `OracleError::TablesNotAvailable` if no table oracle was provided.
    pub fn tables(&self) -> Result<&'a T, OracleError> {
        self.tables.ok_or(OracleError::TablesNotAvailable)
    }
}

impl<'a, I, P, A, T> Env<'a, I, P, A, T>
where
    I: InstanceOracle + 'a,
    P: ParticipantOracle + 'a,
    A: ActorOracle + 'a,
    T: StatTableOracle + 'a,
{
    /// Converts this environment into a trait-object based `HostEnv`.
    pub fn as_host_env(&self) -> HostEnv<'a> {
        let instances: Option<&'a dyn InstanceOracle> = self.instances.map(|i| i as _);
        let participants: Option<&'a dyn ParticipantOracle> = self.participants.map(|p| p as _);
        let actors: Option<&'a dyn ActorOracle> = self.actors.map(|a| a as _);
        let tables: Option<&'a dyn StatTableOracle> = self.tables.map(|t| t as _);
        Env::new(instances, participants, actors, tables)
    }
}
