//! Topic-based event bus for scaling notices.
//!
//! Sessions collect notices while handling host callbacks; the engine drains
//! them after every call and publishes them here. Publishing never blocks and
//! never fails: a topic without subscribers simply drops the event.

mod bus;
mod types;

pub use bus::{EventBus, Topic};
pub use types::ScalingEvent;
