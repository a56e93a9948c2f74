//! Trace event and interval record definitions.

use super::category::Category;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Traced thread/process identifier
pub type SubjectId = u32;

/// Logical clock value, counted in simulated instructions
pub type Tick = u64;

/// A single raw trace event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Semantic kind of the event
    pub category: Category,

    /// Subject the event refers to
    #[serde(default)]
    pub subject: SubjectId,

    /// Timestamp or category-specific value
    #[serde(default)]
    pub tag: u64,

    /// Opaque category-specific bytes (text for name-bearing events)
    #[serde(default, with = "payload_text", skip_serializing_if = "Vec::is_empty")]
    pub payload: Vec<u8>,
}

impl Event {
    pub fn new(category: Category, subject: SubjectId, tag: u64) -> Self {
        Self {
            category,
            subject,
            tag,
            payload: Vec::new(),
        }
    }

    /// Attach a payload
    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Payload decoded as text, with trailing NUL padding removed
    pub fn payload_text(&self) -> Cow<'_, str> {
        let end = self
            .payload
            .iter()
            .rposition(|b| *b != 0)
            .map_or(0, |i| i + 1);
        String::from_utf8_lossy(&self.payload[..end])
    }
}

/// Whether an interval covers running or waiting time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    Active,
    Inactive,
}

impl IntervalKind {
    pub const ALL: [IntervalKind; 2] = [IntervalKind::Active, IntervalKind::Inactive];

    /// Name used in output file names
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Active => 0,
            Self::Inactive => 1,
        }
    }
}

impl std::fmt::Display for IntervalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A half-open `[start, end)` span of one subject's activity or inactivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub subject: SubjectId,
    pub kind: IntervalKind,
    pub start: Tick,
    pub end: Tick,
}

impl Interval {
    pub fn new(subject: SubjectId, kind: IntervalKind, start: Tick, end: Tick) -> Self {
        debug_assert!(end >= start, "interval ends before it starts");
        Self {
            subject,
            kind,
            start,
            end,
        }
    }

    pub fn duration(&self) -> u64 {
        self.end - self.start
    }
}

/// Payloads travel as plain strings in the JSON trace
mod payload_text {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        String::deserialize(deserializer).map(String::into_bytes)
    }
}
