//! Opaque handles for host objects.
//!
//! The core never holds host pointers. Every host object it reasons about is
//! named by one of these stable identifiers, and all side data lives in tables
//! owned by the core and keyed by them.
use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident($inner:ty), $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}

opaque_id!(
    /// One live dungeon/raid instance.
    SessionId(u64),
    "session#"
);
opaque_id!(
    /// Instance map (content) identifier; the key for per-instance overrides.
    MapId(u32),
    "map#"
);
opaque_id!(
    /// A hostile or neutral host actor.
    ActorId(u64),
    "actor#"
);
opaque_id!(
    /// A human-controlled participant.
    ParticipantId(u64),
    "participant#"
);
opaque_id!(
    /// Actor template (creature entry); the key for per-actor overrides.
    TemplateId(u32),
    "template#"
);
opaque_id!(
    /// Visual model identifier.
    ModelId(u32),
    "model#"
);
