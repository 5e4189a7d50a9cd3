use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use survey_logic::{
    Decision, LogicConfig, MemoryDocument, PageError, RecordingToolkit, bind, build_report,
    enhance, render_json, render_text as logic_render_text, validate,
};

#[derive(Debug, Error)]
enum ComponentError {
    #[error("failed to parse config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to parse changes: {0}")]
    ChangesParse(#[source] serde_json::Error),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error("json encode error: {0}")]
    JsonEncode(#[source] serde_json::Error),
}

/// One simulated user answer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Change {
    pub name: String,
    pub value: String,
}

fn load_config(config_json: &str) -> Result<LogicConfig, ComponentError> {
    LogicConfig::from_json(config_json).map_err(ComponentError::ConfigParse)
}

fn load_page(page_json: &str) -> Result<MemoryDocument, ComponentError> {
    Ok(MemoryDocument::from_json(page_json)?)
}

fn respond(result: Result<Value, ComponentError>) -> String {
    match result {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|error| {
            json!({"error": format!("json encode: {}", error)}).to_string()
        }),
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn respond_string(result: Result<String, ComponentError>) -> String {
    match result {
        Ok(value) => value,
        Err(err) => json!({ "error": err.to_string() }).to_string(),
    }
}

fn describe_inner(page_json: &str, config_json: &str) -> Result<Value, ComponentError> {
    let config = load_config(config_json)?;
    let mut doc = load_page(page_json)?;
    let binding = bind(&mut doc, &config);

    let mut questions = Vec::new();
    for bound in binding.questions() {
        questions.push(json!({
            "id": bound.element,
            "rule": serde_json::to_value(&bound.rule).map_err(ComponentError::JsonEncode)?,
        }));
    }
    for (element, reason) in binding.unmanaged() {
        questions.push(json!({
            "id": element,
            "rule": Value::Null,
            "skip_reason": reason,
        }));
    }

    Ok(json!({
        "page_id": doc.page().id,
        "config": serde_json::to_value(&config).map_err(ComponentError::JsonEncode)?,
        "questions": questions,
    }))
}

/// Lists the parsed rule of every flagged question.
pub fn describe(page_json: &str, config_json: &str) -> String {
    respond(describe_inner(page_json, config_json))
}

fn evaluate_page_inner(page_json: &str, config_json: &str) -> Result<Value, ComponentError> {
    let config = load_config(config_json)?;
    let mut doc = load_page(page_json)?;
    let mut toolkit = RecordingToolkit::default();
    let enhancement = enhance(&mut doc, &mut toolkit, &config);

    let mut report = render_json(&build_report(&doc, &enhancement.binding));
    report["visibility"] = json!(doc.visibility(&config));
    report["widgets"] = json!({
        "tooltips": enhancement.tooltips,
        "popovers": enhancement.popovers,
        "alerts_pending": enhancement.alert_timer.pending(&doc),
        "alert_selector": enhancement.alert_timer.selector,
        "dismiss_after_ms": enhancement.alert_timer.delay.as_millis() as u64,
    });
    Ok(report)
}

/// Runs the page bootstrap and reports the resulting visibility.
pub fn evaluate_page(page_json: &str, config_json: &str) -> String {
    respond(evaluate_page_inner(page_json, config_json))
}

fn apply_changes_inner(
    page_json: &str,
    config_json: &str,
    changes_json: &str,
) -> Result<Value, ComponentError> {
    let config = load_config(config_json)?;
    let changes: Vec<Change> =
        serde_json::from_str(changes_json).map_err(ComponentError::ChangesParse)?;
    let mut doc = load_page(page_json)?;
    let binding = bind(&mut doc, &config);

    let mut steps = Vec::new();
    for change in &changes {
        let events = doc.change(&change.name, &change.value)?;
        let decisions: Vec<Decision> = events
            .iter()
            .flat_map(|event| binding.dispatch(&mut doc, event))
            .collect();
        debug!(
            name = %change.name,
            events = events.len(),
            decisions = decisions.len(),
            "applied change"
        );
        steps.push(json!({
            "name": change.name,
            "value": change.value,
            "decisions": decisions,
        }));
    }

    let report = build_report(&doc, &binding);
    Ok(json!({
        "steps": steps,
        "report": render_json(&report),
        "text": logic_render_text(&report),
    }))
}

/// Binds the page, replays `changes` in order and reports every decision.
pub fn apply_changes(page_json: &str, config_json: &str, changes_json: &str) -> String {
    respond(apply_changes_inner(page_json, config_json, changes_json))
}

fn validate_rules_inner(page_json: &str, config_json: &str) -> Result<Value, ComponentError> {
    let config = load_config(config_json)?;
    let doc = load_page(page_json)?;
    serde_json::to_value(validate(&doc, &config)).map_err(ComponentError::JsonEncode)
}

pub fn validate_rules(page_json: &str, config_json: &str) -> String {
    respond(validate_rules_inner(page_json, config_json))
}

fn render_text_inner(page_json: &str, config_json: &str) -> Result<String, ComponentError> {
    let config = load_config(config_json)?;
    let mut doc = load_page(page_json)?;
    let binding = bind(&mut doc, &config);
    Ok(logic_render_text(&build_report(&doc, &binding)))
}

pub fn render_text(page_json: &str, config_json: &str) -> String {
    respond_string(render_text_inner(page_json, config_json))
}

pub fn rule_schema() -> String {
    respond(Ok(survey_logic::rule_schema()))
}
