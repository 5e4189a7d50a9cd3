use serde::Serialize;
use tracing::trace;

use crate::config::LogicConfig;
use crate::document::{Display, Document, ElementId, FormState, InputState};
use crate::rule::{Condition, Operator, Rule};

pub type VisibilityMap = std::collections::BTreeMap<String, bool>;

/// Why a condition was left out of the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipCause {
    /// The condition names no trigger, or no input carries the trigger name.
    MissingTrigger,
    UnsupportedOperator,
    /// `contains`/`not_contains` against a radio or checkbox group.
    SubstringOnChoiceGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "cause", rename_all = "snake_case")]
pub enum ConditionOutcome {
    Held,
    Failed,
    Skipped(SkipCause),
}

impl ConditionOutcome {
    fn from_bool(held: bool) -> Self {
        if held {
            ConditionOutcome::Held
        } else {
            ConditionOutcome::Failed
        }
    }
}

/// Checks one condition against the current form state.
pub fn check_condition<S>(condition: &Condition, state: &S, config: &LogicConfig) -> ConditionOutcome
where
    S: FormState + ?Sized,
{
    let Some(question_id) = condition.question_id.as_deref() else {
        return ConditionOutcome::Skipped(SkipCause::MissingTrigger);
    };
    let inputs = state.inputs(&config.trigger_name(question_id));
    let Some(first) = inputs.first() else {
        return ConditionOutcome::Skipped(SkipCause::MissingTrigger);
    };

    if first.kind.is_choice() {
        check_choice_group(condition, &inputs)
    } else {
        check_single_value(condition, &first.value)
    }
}

fn check_choice_group(condition: &Condition, inputs: &[InputState]) -> ConditionOutcome {
    let selected = inputs
        .iter()
        .any(|input| input.checked && input.value == condition.value);
    match condition.operator {
        Operator::Equals => ConditionOutcome::from_bool(selected),
        Operator::NotEquals => ConditionOutcome::from_bool(!selected),
        Operator::Contains | Operator::NotContains => {
            ConditionOutcome::Skipped(SkipCause::SubstringOnChoiceGroup)
        }
        Operator::Unsupported => ConditionOutcome::Skipped(SkipCause::UnsupportedOperator),
    }
}

fn check_single_value(condition: &Condition, value: &str) -> ConditionOutcome {
    let expected = condition.value.as_str();
    match condition.operator {
        Operator::Equals => ConditionOutcome::from_bool(value == expected),
        Operator::NotEquals => ConditionOutcome::from_bool(value != expected),
        Operator::Contains => ConditionOutcome::from_bool(value.contains(expected)),
        Operator::NotContains => ConditionOutcome::from_bool(!value.contains(expected)),
        Operator::Unsupported => ConditionOutcome::Skipped(SkipCause::UnsupportedOperator),
    }
}

/// Per-condition outcomes, in listed order.
pub fn explain<S>(rule: &Rule, state: &S, config: &LogicConfig) -> Vec<ConditionOutcome>
where
    S: FormState + ?Sized,
{
    rule.conditions
        .iter()
        .map(|condition| check_condition(condition, state, config))
        .collect()
}

/// Whether the governed question should be shown: every condition that
/// could be checked must hold.
pub fn evaluate<S>(rule: &Rule, state: &S, config: &LogicConfig) -> bool
where
    S: FormState + ?Sized,
{
    explain(rule, state, config)
        .iter()
        .all(|outcome| *outcome != ConditionOutcome::Failed)
}

/// Reflects a decision on the question element.
pub fn apply<D>(doc: &mut D, question: &ElementId, shown: bool)
where
    D: Document + ?Sized,
{
    trace!(question = %question, shown, "applying visibility");
    let display = if shown { Display::Default } else { Display::None };
    doc.set_display(question, display);
}
