// Copyright (c) 2022 THE STEEMVOTE AUTHORS

use crate::error::ModelsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Importance of an author or delegate.
///
/// The derived order is `Low < Normal < High` and is the order used
/// for every tie-break between tiers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PriorityLevel {
    /// low priority
    Low,
    /// normal priority
    Normal,
    /// high priority
    High,
}

impl PriorityLevel {
    /// All tiers, lowest first.
    pub const ALL: [PriorityLevel; 3] =
        [PriorityLevel::Low, PriorityLevel::Normal, PriorityLevel::High];
}

impl Default for PriorityLevel {
    fn default() -> Self {
        PriorityLevel::Normal
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityLevel::Low => write!(f, "low"),
            PriorityLevel::Normal => write!(f, "normal"),
            PriorityLevel::High => write!(f, "high"),
        }
    }
}

impl FromStr for PriorityLevel {
    type Err = ModelsError;

    /// ```
    /// # use steemvote_models::priority::PriorityLevel;
    /// # use std::str::FromStr;
    /// assert_eq!(PriorityLevel::from_str("High").unwrap(), PriorityLevel::High);
    /// assert!(PriorityLevel::from_str("urgent").is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(PriorityLevel::Low),
            "normal" => Ok(PriorityLevel::Normal),
            "high" => Ok(PriorityLevel::High),
            other => Err(ModelsError::ConfigError(format!(
                "unknown priority level: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_total_order() {
        assert!(PriorityLevel::Low < PriorityLevel::Normal);
        assert!(PriorityLevel::Normal < PriorityLevel::High);
        assert_eq!(
            PriorityLevel::ALL.iter().max(),
            Some(&PriorityLevel::High)
        );
    }

    #[test]
    fn test_priority_serde_lowercase() {
        let level: PriorityLevel = serde_json::from_str("\"normal\"").unwrap();
        assert_eq!(level, PriorityLevel::Normal);
        assert_eq!(serde_json::to_string(&PriorityLevel::High).unwrap(), "\"high\"");
    }
}
