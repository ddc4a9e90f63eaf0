//! Desired state and operation outcome types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested lifecycle state for a remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    /// The resource must exist after the operation.
    Present,
    /// The resource must not exist after the operation.
    Absent,
}

impl DesiredState {
    pub fn is_present(self) -> bool {
        matches!(self, Self::Present)
    }
}

impl fmt::Display for DesiredState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "present"),
            Self::Absent => write!(f, "absent"),
        }
    }
}

impl FromStr for DesiredState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(format!(
                "invalid state '{}', expected 'present' or 'absent'",
                other
            )),
        }
    }
}

/// Result payload of a reconcile operation: whether anything was mutated
/// (or would have been, in check mode) and the resulting resource object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub changed: bool,
    pub object: Option<T>,
}

impl<T> Outcome<T> {
    /// A mutation happened (or was planned in check mode).
    pub fn changed(object: Option<T>) -> Self {
        Self {
            changed: true,
            object,
        }
    }

    /// Remote state already matched the request.
    pub fn unchanged(object: Option<T>) -> Self {
        Self {
            changed: false,
            object,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip() {
        assert_eq!("present".parse::<DesiredState>(), Ok(DesiredState::Present));
        assert_eq!("absent".parse::<DesiredState>(), Ok(DesiredState::Absent));
        assert_eq!(DesiredState::Present.to_string(), "present");
        assert!("deleted".parse::<DesiredState>().is_err());
    }

    #[test]
    fn test_state_serde() {
        let s: DesiredState = serde_json::from_str("\"absent\"").unwrap();
        assert_eq!(s, DesiredState::Absent);
        assert_eq!(serde_json::to_string(&DesiredState::Present).unwrap(), "\"present\"");
    }

    #[test]
    fn test_outcome_constructors() {
        let o = Outcome::changed(Some(1));
        assert!(o.changed);
        assert_eq!(o.object, Some(1));

        let o: Outcome<i32> = Outcome::unchanged(None);
        assert!(!o.changed);
        assert!(o.object.is_none());
    }

    #[test]
    fn test_outcome_serialises_null_object() {
        let o: Outcome<String> = Outcome::unchanged(None);
        let json = serde_json::to_value(&o).unwrap();
        assert_eq!(json["changed"], false);
        assert!(json["object"].is_null());
    }
}
