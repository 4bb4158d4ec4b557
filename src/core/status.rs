//! Unit workload status as reported through `status-set`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    Active(String),
    Blocked(String),
    Maintenance(String),
    Waiting(String),
    Unknown,
}

impl UnitStatus {
    pub fn active() -> Self {
        UnitStatus::Active(String::new())
    }

    pub fn active_with(message: impl Into<String>) -> Self {
        UnitStatus::Active(message.into())
    }

    /// The status keyword `status-set` takes.
    pub fn name(&self) -> &'static str {
        match self {
            UnitStatus::Active(_) => "active",
            UnitStatus::Blocked(_) => "blocked",
            UnitStatus::Maintenance(_) => "maintenance",
            UnitStatus::Waiting(_) => "waiting",
            UnitStatus::Unknown => "unknown",
        }
    }

    /// Message, if one was given.
    pub fn message(&self) -> Option<&str> {
        match self {
            UnitStatus::Active(m)
            | UnitStatus::Blocked(m)
            | UnitStatus::Maintenance(m)
            | UnitStatus::Waiting(m) => Some(m.as_str()).filter(|m| !m.is_empty()),
            UnitStatus::Unknown => None,
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(msg) => write!(f, "{}: {}", self.name(), msg),
            None => f.write_str(self.name()),
        }
    }
}
