use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Who did something, and when.
///
/// The timestamp keeps its original UTC offset so that a commit written in
/// one zone and read in another serializes to the same bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Audit {
    pub name: String,
    pub timestamp: DateTime<FixedOffset>,
}

impl Audit {
    pub fn new(name: impl Into<String>, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            name: name.into(),
            timestamp,
        }
    }

    /// Stamp `name` with the current time in UTC.
    pub fn now(name: impl Into<String>) -> Self {
        Self::new(name, Utc::now().fixed_offset())
    }

    /// `true` for the default stamp: no name, at the Unix epoch, in UTC.
    ///
    /// Equality compares instants only, so the offset is checked separately.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
            && self.timestamp == DateTime::<FixedOffset>::default()
            && self.timestamp.offset().local_minus_utc() == 0
    }
}

impl fmt::Display for Audit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.timestamp.to_rfc3339())
    }
}
