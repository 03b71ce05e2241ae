pub mod hazard;
pub mod incident;
pub mod item;
pub mod maintenance_log;
pub mod mitigation_note;
pub mod shift;
pub mod trail_cam_capture;
pub mod transaction;

use std::fmt;

/// Error returned when a stored or user-supplied label does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}
