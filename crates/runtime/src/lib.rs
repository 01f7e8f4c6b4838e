//! Host-facing orchestration for dungeon scaling.
//!
//! The core crate is a set of pure, per-session computations. This crate
//! wires them to a live host: it keeps the session registry, the shared
//! configuration handle with its global epoch, and an event bus for the
//! notices sessions raise.
//!
//! Modules are organized by responsibility:
//! - [`engine`] hosts the orchestrator and builder
//! - [`shared`] owns the swappable configuration snapshot
//! - [`events`] provides topic-based event bus for scaling notices
pub mod engine;
pub mod error;
pub mod events;
pub mod shared;

pub use engine::{EngineConfig, ScalingEngine, ScalingEngineBuilder};
pub use error::{Result, RuntimeError};
pub use events::{EventBus, ScalingEvent, Topic};
pub use shared::SharedConfig;
