use serde::{Deserialize, Serialize};

use crate::config::LogicConfig;
use crate::document::{Document, ElementId};
use crate::rule::{Condition, Operator, Rule};
use crate::selector::Selector;

/// A problem found in one question's rule payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleIssue {
    pub question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_index: Option<usize>,
    pub path: String,
    pub message: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub issues: Vec<RuleIssue>,
}

/// Lints every flagged rule payload against the document's inputs.
///
/// Reports what the binder silently tolerates; it never changes the document.
pub fn validate<D>(doc: &D, config: &LogicConfig) -> ValidationResult
where
    D: Document + ?Sized,
{
    let mut issues = Vec::new();

    for question in doc.query_all(&Selector::has_attribute(&config.flag_attribute)) {
        let Some(payload) = doc.attribute(&question, &config.flag_attribute) else {
            issues.push(question_issue(
                &question,
                "rule payload is missing",
                "missing_payload",
            ));
            continue;
        };

        match Rule::parse(&payload) {
            Err(err) => issues.push(question_issue(&question, &err.to_string(), "malformed_payload")),
            Ok(None) => issues.push(question_issue(
                &question,
                "rule payload has no conditions field",
                "missing_conditions",
            )),
            Ok(Some(rule)) => {
                for (index, condition) in rule.conditions.iter().enumerate() {
                    if let Some((message, code)) = check_condition(doc, config, condition) {
                        issues.push(RuleIssue {
                            question_id: question.to_string(),
                            condition_index: Some(index),
                            path: format!("/{}/conditions/{}", question, index),
                            message,
                            code: code.into(),
                        });
                    }
                }
            }
        }
    }

    ValidationResult {
        valid: issues.is_empty(),
        issues,
    }
}

fn check_condition<D>(
    doc: &D,
    config: &LogicConfig,
    condition: &Condition,
) -> Option<(String, &'static str)>
where
    D: Document + ?Sized,
{
    if condition.operator == Operator::Unsupported {
        return Some(("operator is not supported".into(), "unsupported_operator"));
    }

    let Some(question_id) = condition.question_id.as_deref() else {
        return Some(("condition has no question_id".into(), "missing_trigger"));
    };
    let name = config.trigger_name(question_id);
    let inputs = doc.inputs(&name);
    let first = match inputs.first() {
        Some(first) => first,
        None => {
            return Some((
                format!("no input named '{}'", name),
                "missing_trigger",
            ));
        }
    };

    if !first.kind.is_choice() {
        return None;
    }
    if condition.operator.is_substring() {
        return Some((
            format!(
                "'{}' is not defined for choice group '{}'",
                condition.operator.as_str(),
                name
            ),
            "substring_on_choice_group",
        ));
    }
    if !inputs.iter().any(|input| input.value == condition.value) {
        return Some((
            format!(
                "choice group '{}' has no option with value '{}'",
                name, condition.value
            ),
            "unknown_choice",
        ));
    }
    None
}

fn question_issue(question: &ElementId, message: &str, code: &str) -> RuleIssue {
    RuleIssue {
        question_id: question.to_string(),
        condition_index: None,
        path: format!("/{}", question),
        message: message.into(),
        code: code.into(),
    }
}
