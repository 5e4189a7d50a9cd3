use serde_json::{Map, Value, json};

use crate::binder::{Binding, SkipReason};
use crate::memory::MemoryDocument;
use crate::selector::Selector;
use crate::visibility::{ConditionOutcome, SkipCause, explain};

/// Counters exposed to renderers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportCounts {
    pub shown: usize,
    pub hidden: usize,
    pub unmanaged: usize,
}

/// Describes a single flagged question.
#[derive(Debug, Clone)]
pub struct QuestionReport {
    pub id: String,
    pub visible: bool,
    pub skip_reason: Option<SkipReason>,
    pub triggers: Vec<String>,
    pub outcomes: Vec<ConditionOutcome>,
}

impl QuestionReport {
    pub fn managed(&self) -> bool {
        self.skip_reason.is_none()
    }
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone)]
pub struct PageReport {
    pub page_id: String,
    pub page_title: String,
    pub counts: ReportCounts,
    pub questions: Vec<QuestionReport>,
}

/// Snapshot of every flagged question after binding and any later events.
pub fn build_report(doc: &MemoryDocument, binding: &Binding) -> PageReport {
    let config = binding.config();
    let flag = Selector::has_attribute(&config.flag_attribute);
    let mut counts = ReportCounts::default();
    let mut questions = Vec::new();

    for element in doc.page().elements.iter().filter(|element| element.matches(&flag)) {
        let visible = !element.hidden;
        let skip_reason = binding
            .unmanaged()
            .iter()
            .find(|(candidate, _)| candidate == &element.id)
            .map(|(_, reason)| *reason);

        let (triggers, outcomes) = match binding.rule_for(&element.id) {
            Some(rule) => (
                rule.triggers()
                    .into_iter()
                    .map(|trigger| config.trigger_name(trigger))
                    .collect(),
                explain(rule, doc, config),
            ),
            None => (Vec::new(), Vec::new()),
        };

        if skip_reason.is_some() {
            counts.unmanaged += 1;
        } else if visible {
            counts.shown += 1;
        } else {
            counts.hidden += 1;
        }

        questions.push(QuestionReport {
            id: element.id.to_string(),
            visible,
            skip_reason,
            triggers,
            outcomes,
        });
    }

    PageReport {
        page_id: doc.page().id.clone(),
        page_title: doc.page().title.clone(),
        counts,
        questions,
    }
}

/// Render the report as a structured JSON value.
pub fn render_json(report: &PageReport) -> Value {
    let questions = report
        .questions
        .iter()
        .map(|question| {
            let mut map = Map::new();
            map.insert("id".into(), Value::String(question.id.clone()));
            map.insert("visible".into(), Value::Bool(question.visible));
            map.insert("managed".into(), Value::Bool(question.managed()));
            if let Some(reason) = question.skip_reason {
                map.insert("skip_reason".into(), json!(reason));
            }
            if !question.triggers.is_empty() {
                map.insert("triggers".into(), json!(question.triggers));
                map.insert("conditions".into(), json!(question.outcomes));
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "page_id": report.page_id,
        "page_title": report.page_title,
        "counts": {
            "shown": report.counts.shown,
            "hidden": report.counts.hidden,
            "unmanaged": report.counts.unmanaged,
        },
        "questions": questions,
    })
}

/// Render the report as human-friendly text.
pub fn render_text(report: &PageReport) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Page: {} ({})", report.page_title, report.page_id));
    lines.push(format!(
        "Questions: {} shown, {} hidden, {} unmanaged",
        report.counts.shown, report.counts.hidden, report.counts.unmanaged
    ));

    for question in &report.questions {
        let state = if question.visible { "shown" } else { "hidden" };
        let mut entry = format!(" - {} [{}]", question.id, state);
        if let Some(reason) = question.skip_reason {
            entry.push_str(&format!(" unmanaged: {}", skip_label(reason)));
        } else if !question.triggers.is_empty() {
            entry.push_str(&format!(" <- {}", question.triggers.join(", ")));
        }
        lines.push(entry);
        for (index, outcome) in question.outcomes.iter().enumerate() {
            lines.push(format!("     #{} {}", index, outcome_label(outcome)));
        }
    }

    lines.join("\n")
}

fn skip_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::MissingPayload => "missing payload",
        SkipReason::MalformedPayload => "malformed payload",
        SkipReason::NoConditions => "no conditions",
    }
}

fn outcome_label(outcome: &ConditionOutcome) -> String {
    match outcome {
        ConditionOutcome::Held => "held".to_string(),
        ConditionOutcome::Failed => "failed".to_string(),
        ConditionOutcome::Skipped(cause) => format!("skipped ({})", cause_label(*cause)),
    }
}

fn cause_label(cause: SkipCause) -> &'static str {
    match cause {
        SkipCause::MissingTrigger => "missing trigger",
        SkipCause::UnsupportedOperator => "unsupported operator",
        SkipCause::SubstringOnChoiceGroup => "substring on choice group",
    }
}
