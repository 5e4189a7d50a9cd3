use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Comparison applied between a trigger's current value and a condition literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    /// Any operator name this engine does not know; never restricts visibility.
    #[serde(other)]
    Unsupported,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "not_equals",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::Unsupported => "unsupported",
        }
    }

    /// Substring operators only make sense on single-value inputs.
    pub fn is_substring(&self) -> bool {
        matches!(self, Operator::Contains | Operator::NotContains)
    }
}

/// JSON scalar accepted wherever the payload carries text.
#[derive(Deserialize, JsonSchema)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Number(f64),
    Flag(bool),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Text(text) => text,
            Scalar::Integer(value) => value.to_string(),
            Scalar::Number(value) => value.to_string(),
            Scalar::Flag(flag) => flag.to_string(),
        }
    }
}

/// Text of a JSON scalar; `None` for null, arrays and objects.
fn scalar_text(value: &Value) -> Option<String> {
    Scalar::deserialize(value).ok().map(Scalar::into_text)
}

/// One atomic comparison against a trigger question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Condition {
    /// `None` when the payload names no trigger; such a condition never resolves.
    #[schemars(with = "Option<Scalar>")]
    pub question_id: Option<String>,
    pub operator: Operator,
    #[schemars(with = "Scalar")]
    pub value: String,
}

impl Condition {
    pub fn new(question_id: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            question_id: Some(question_id.into()),
            operator,
            value: value.into(),
        }
    }

    /// Decodes one payload entry without ever failing.
    ///
    /// A missing or non-scalar `question_id` leaves the trigger unset, an
    /// unreadable `operator` becomes [`Operator::Unsupported`] and a missing
    /// or null `value` reads as empty text.
    pub fn from_value(entry: &Value) -> Self {
        let operator = entry
            .get("operator")
            .and_then(|operator| Operator::deserialize(operator).ok())
            .unwrap_or(Operator::Unsupported);
        Self {
            question_id: entry.get("question_id").and_then(scalar_text),
            operator,
            value: entry.get("value").and_then(scalar_text).unwrap_or_default(),
        }
    }
}

/// The full set of AND-combined conditions governing one question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Rule {
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule payload is not well-formed: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl Rule {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Self { conditions }
    }

    /// Parses the serialized payload attached to a question.
    ///
    /// Returns `Ok(None)` when the payload is well-formed but carries no
    /// `conditions` field, and an error when it cannot be decoded at all or
    /// `conditions` is not a list. Incomplete entries are kept and skipped
    /// at evaluation time.
    pub fn parse(payload: &str) -> Result<Option<Rule>, RuleError> {
        let mut value: Value = serde_json::from_str(payload).map_err(RuleError::Malformed)?;
        let conditions = match value
            .as_object_mut()
            .and_then(|object| object.remove("conditions"))
        {
            None | Some(Value::Null) => return Ok(None),
            Some(conditions) => conditions,
        };
        let entries: Vec<Value> =
            serde_json::from_value(conditions).map_err(RuleError::Malformed)?;
        Ok(Some(Rule {
            conditions: entries.iter().map(Condition::from_value).collect(),
        }))
    }

    /// Distinct trigger question ids, in the order they are first referenced.
    pub fn triggers(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for question_id in self
            .conditions
            .iter()
            .filter_map(|condition| condition.question_id.as_deref())
        {
            if !seen.contains(&question_id) {
                seen.push(question_id);
            }
        }
        seen
    }
}

/// JSON Schema describing the rule payload attribute.
pub fn rule_schema() -> Value {
    serde_json::to_value(schemars::schema_for!(Rule)).unwrap_or(Value::Null)
}
