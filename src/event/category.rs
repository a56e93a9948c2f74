//! Event category taxonomy.
//!
//! Simulator instrumentation names its events `NAMESPACE/NAME`
//! (e.g. `SCHED/SWITCH_TO`). Only the final path segment decides the
//! category; anything unrecognised is kept verbatim as `Other` so it can be
//! forwarded untouched.

use serde::{Deserialize, Serialize};

/// Semantic kind of a trace event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// One simulated instruction; the only thing that advances the clock
    SingleTick,
    /// Subject starts running
    SwitchTo,
    /// Subject stops running
    SwitchFrom,
    /// Machine resumes the subject
    Run,
    /// Subject constructed
    SubjectCreated,
    /// Subject reached exit; doubles as the epoch marker
    SubjectExited,
    /// Any other category, carried by its original name
    Other(String),
}

impl std::str::FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl Category {
    /// Map an instrumentation name to a category
    pub fn from_name(name: &str) -> Self {
        let short = short_name(name);

        match short.to_lowercase().as_str() {
            "one_instruction" | "single_tick" | "tick" => Self::SingleTick,
            "switch_to" => Self::SwitchTo,
            "switch_from" => Self::SwitchFrom,
            "run" => Self::Run,
            "class_constructor" | "subject_created" | "created" => Self::SubjectCreated,
            "reached_exit" | "subject_exited" | "exited" => Self::SubjectExited,
            _ => Self::Other(name.to_string()),
        }
    }

    /// Canonical instrumentation name
    pub fn name(&self) -> &str {
        match self {
            Self::SingleTick => "MACHINE/ONE_INSTRUCTION",
            Self::SwitchTo => "SCHED/SWITCH_TO",
            Self::SwitchFrom => "SCHED/SWITCH_FROM",
            Self::Run => "MACHINE/RUN",
            Self::SubjectCreated => "THREAD/CLASS_CONSTRUCTOR",
            Self::SubjectExited => "THREAD/REACHED_EXIT",
            Self::Other(name) => name,
        }
    }

    /// Name without its namespace prefix
    pub fn short_name(&self) -> &str {
        short_name(self.name())
    }

    /// True for categories that only ride along the stream
    pub fn is_pass_through(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(name) => name,
            known => known.name().to_string(),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn short_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_names() {
        assert_eq!(Category::from_name("MACHINE/ONE_INSTRUCTION"), Category::SingleTick);
        assert_eq!(Category::from_name("SCHED/SWITCH_TO"), Category::SwitchTo);
        assert_eq!(Category::from_name("SCHED/SWITCH_FROM"), Category::SwitchFrom);
        assert_eq!(Category::from_name("MACHINE/RUN"), Category::Run);
        assert_eq!(
            Category::from_name("THREAD/CLASS_CONSTRUCTOR"),
            Category::SubjectCreated
        );
        assert_eq!(Category::from_name("THREAD/REACHED_EXIT"), Category::SubjectExited);
    }

    #[test]
    fn test_short_and_lowercase_names() {
        assert_eq!("switch_to".parse::<Category>().unwrap(), Category::SwitchTo);
        assert_eq!("Exited".parse::<Category>().unwrap(), Category::SubjectExited);
        assert_eq!("single_tick".parse::<Category>().unwrap(), Category::SingleTick);
    }

    #[test]
    fn test_unknown_kept_verbatim() {
        let category = Category::from_name("PAGING/PAGE_FAULTS");
        assert_eq!(category, Category::Other("PAGING/PAGE_FAULTS".to_string()));
        assert_eq!(category.short_name(), "PAGE_FAULTS");
        assert!(category.is_pass_through());
    }

    #[test]
    fn test_serde_string_form() {
        let json = serde_json::to_string(&Category::SwitchFrom).unwrap();
        assert_eq!(json, "\"SCHED/SWITCH_FROM\"");

        let parsed: Category = serde_json::from_str("\"DELTA\"").unwrap();
        assert_eq!(parsed, Category::Other("DELTA".to_string()));
    }
}
