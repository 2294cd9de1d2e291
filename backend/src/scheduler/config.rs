//! Scheduler configuration

use crate::scheduler::engine::SchedulerError;
use serde::{Deserialize, Serialize};

/// Tunables for an [`EventScheduler`](crate::scheduler::EventScheduler)
///
/// All fields default, so `{}` is a valid configuration document.
///
/// # Example
/// ```
/// use event_sim_core_rs::SchedulerConfig;
///
/// let config = SchedulerConfig::from_json(r#"{ "compaction_threshold": 1024 }"#).unwrap();
/// assert_eq!(config.compaction_threshold, Some(1024));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Queue length at which `schedule` purges deactivated events first.
    /// `None` keeps every cancelled event until it is popped.
    pub compaction_threshold: Option<usize>,
}

impl SchedulerConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json(json: &str) -> Result<Self, SchedulerError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.compaction_threshold == Some(0) {
            return Err(SchedulerError::InvalidConfig(
                "compaction_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        let config = SchedulerConfig::from_json("{}").unwrap();
        assert_eq!(config, SchedulerConfig::default());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = SchedulerConfig::from_json(r#"{ "compaction_threshold": 0 }"#).unwrap_err();
        assert!(matches!(err, SchedulerError::InvalidConfig(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = SchedulerConfig::from_json(r#"{ "threshold": 3 }"#).unwrap_err();
        assert!(matches!(err, SchedulerError::ConfigParse(_)));
    }
}
