use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::selector::Selector;

/// Markup conventions shared by the binder, the evaluator and the page bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LogicConfig {
    /// Attribute that flags a question and carries its serialized rule.
    #[serde(default = "default_flag_attribute")]
    pub flag_attribute: String,
    /// Prefix joined with a condition's `question_id` to form the trigger input name.
    #[serde(default = "default_trigger_prefix")]
    pub trigger_prefix: String,
    #[serde(default = "default_alert_dismiss_after_ms")]
    pub alert_dismiss_after_ms: u64,
    /// Alerts dismissed once the delay elapses, written as CSS text.
    #[serde(default = "default_alert_selector")]
    #[schemars(with = "String")]
    pub alert_selector: Selector,
}

fn default_flag_attribute() -> String {
    "data-conditional-logic".into()
}

fn default_trigger_prefix() -> String {
    "question_".into()
}

fn default_alert_dismiss_after_ms() -> u64 {
    5_000
}

fn default_alert_selector() -> Selector {
    Selector::Class {
        class: "alert".into(),
        except: Some("alert-permanent".into()),
    }
}

impl Default for LogicConfig {
    fn default() -> Self {
        Self {
            flag_attribute: default_flag_attribute(),
            trigger_prefix: default_trigger_prefix(),
            alert_dismiss_after_ms: default_alert_dismiss_after_ms(),
            alert_selector: default_alert_selector(),
        }
    }
}

impl LogicConfig {
    /// Parses a config document; blank input yields the defaults.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        if raw.trim().is_empty() {
            Ok(Self::default())
        } else {
            serde_json::from_str(raw)
        }
    }

    /// Name shared by every input of the trigger group for `question_id`.
    pub fn trigger_name(&self, question_id: &str) -> String {
        format!("{}{}", self.trigger_prefix, question_id)
    }

    pub fn alert_delay(&self) -> Duration {
        Duration::from_millis(self.alert_dismiss_after_ms)
    }
}
