use serde::{Deserialize, Serialize};

/// Score used by the priority store
pub type Score = i64;

/// Caller-supplied job priority (higher values are dequeued first).
///
/// The conventional range is `0..=10`; values outside it are accepted and
/// simply sort accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(pub i64);

impl Priority {
    /// Lowest conventional priority, also the default
    pub const LOWEST: Priority = Priority(0);

    /// Highest conventional priority
    pub const HIGHEST: Priority = Priority(10);

    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    /// Score this priority maps to in the store
    pub fn score(self) -> Score {
        self.0
    }

    /// Whether the value falls inside the conventional `0..=10` range
    pub fn is_conventional(self) -> bool {
        (Self::LOWEST..=Self::HIGHEST).contains(&self)
    }
}

impl From<i64> for Priority {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| format!("Invalid priority: {}", s))
    }
}
