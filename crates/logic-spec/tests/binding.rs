use survey_logic::{
    Binding, Decision, ElementId, EventKind, InputRef, LogicConfig, MemoryDocument, SkipReason,
    bind,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "survey_page" => include_str!("../tests/fixtures/survey_page.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn bound_page() -> (MemoryDocument, Binding) {
    let mut doc = MemoryDocument::from_json(fixture("survey_page")).expect("page");
    let binding = bind(&mut doc, &LogicConfig::default());
    (doc, binding)
}

fn hidden(doc: &MemoryDocument, id: &str) -> bool {
    doc.is_hidden(&ElementId::new(id)).expect("element exists")
}

fn dispatch_all(
    doc: &mut MemoryDocument,
    binding: &Binding,
    name: &str,
    value: &str,
) -> Vec<Decision> {
    let events = doc.change(name, value).expect("change");
    events
        .iter()
        .flat_map(|event| binding.dispatch(doc, event))
        .collect()
}

#[test]
fn initial_evaluation_matches_prefilled_state() {
    let (doc, _) = bound_page();
    assert!(hidden(&doc, "question-6"));
    assert!(hidden(&doc, "question-8"));
    assert!(hidden(&doc, "question-10"));
    assert!(!hidden(&doc, "question-14"));
    assert!(!hidden(&doc, "question-15"));
}

#[test]
fn select_change_reveals_question_synchronously() {
    let (mut doc, binding) = bound_page();
    assert!(hidden(&doc, "question-6"));

    let decisions = dispatch_all(&mut doc, &binding, "question_5", "yes");
    assert!(!hidden(&doc, "question-6"));
    assert!(decisions.contains(&Decision {
        question: ElementId::new("question-6"),
        shown: true,
    }));

    dispatch_all(&mut doc, &binding, "question_5", "no");
    assert!(hidden(&doc, "question-6"));
}

#[test]
fn malformed_payload_is_left_untouched() {
    let (doc, binding) = bound_page();
    assert!(hidden(&doc, "question-12"));
    assert!(
        binding
            .unmanaged()
            .contains(&(ElementId::new("question-12"), SkipReason::MalformedPayload))
    );
    assert!(binding.rule_for(&ElementId::new("question-12")).is_none());
    assert!(
        binding
            .subscriptions()
            .iter()
            .all(|subscription| subscription.question != ElementId::new("question-12"))
    );
}

#[test]
fn payload_without_conditions_is_shown() {
    let (doc, binding) = bound_page();
    assert!(!hidden(&doc, "question-13"));
    assert!(
        binding
            .unmanaged()
            .contains(&(ElementId::new("question-13"), SkipReason::NoConditions))
    );
}

#[test]
fn every_radio_in_the_group_is_watched() {
    let (doc, _) = bound_page();
    for index in 0..3 {
        let input = InputRef::new("question_7", index);
        // question-8 and question-15 both depend on the score group.
        assert_eq!(doc.watcher_count(&input, EventKind::Change), 2);
        assert_eq!(doc.watcher_count(&input, EventKind::Input), 0);
    }
}

#[test]
fn text_triggers_watch_change_and_input() {
    let (doc, _) = bound_page();
    let input = InputRef::new("question_11", 0);
    assert_eq!(doc.watcher_count(&input, EventKind::Change), 1);
    assert_eq!(doc.watcher_count(&input, EventKind::Input), 1);
}

#[test]
fn radio_selection_toggles_dependent_question() {
    let (mut doc, binding) = bound_page();
    dispatch_all(&mut doc, &binding, "question_7", "2");
    assert!(!hidden(&doc, "question-8"));
    dispatch_all(&mut doc, &binding, "question_7", "3");
    assert!(hidden(&doc, "question-8"));
}

#[test]
fn and_combination_needs_every_condition() {
    let (mut doc, binding) = bound_page();
    dispatch_all(&mut doc, &binding, "question_9", "phone");
    assert!(hidden(&doc, "question-10"));

    dispatch_all(&mut doc, &binding, "question_11", "please call me");
    assert!(!hidden(&doc, "question-10"));

    dispatch_all(&mut doc, &binding, "question_9", "phone");
    assert!(hidden(&doc, "question-10"));
}

#[test]
fn dispatch_evaluates_each_dependent_once() {
    let (mut doc, binding) = bound_page();
    let events = doc.change("question_7", "1").expect("change");
    assert_eq!(events.len(), 1);
    let decisions = binding.dispatch(&mut doc, &events[0]);
    let ids: Vec<_> = decisions
        .iter()
        .map(|decision| decision.question.as_str())
        .collect();
    assert_eq!(ids, vec!["question-8", "question-15"]);
}

#[test]
fn refresh_is_idempotent() {
    let (mut doc, binding) = bound_page();
    let first = binding.refresh(&mut doc);
    let second = binding.refresh(&mut doc);
    assert_eq!(first, second);
}

#[test]
fn dispose_releases_every_watcher() {
    let (mut doc, binding) = bound_page();
    assert!(doc.watched_inputs() > 0);
    binding.dispose(&mut doc);
    assert_eq!(doc.watched_inputs(), 0);
    assert!(doc.change("question_5", "yes").expect("change").is_empty());
}

#[test]
fn custom_prefix_rebinds_against_other_names() {
    let mut doc = MemoryDocument::from_json(fixture("survey_page")).expect("page");
    let config = LogicConfig {
        trigger_prefix: "answer_".into(),
        ..LogicConfig::default()
    };
    let binding = bind(&mut doc, &config);
    assert!(binding.subscriptions().is_empty());
    // Nothing resolves, so every managed question is shown.
    assert!(!hidden(&doc, "question-6"));
    assert!(!hidden(&doc, "question-8"));
}

fn inline_page(elements: serde_json::Value) -> MemoryDocument {
    MemoryDocument::from_json(
        &serde_json::json!({ "id": "inline", "title": "Inline", "elements": elements })
            .to_string(),
    )
    .expect("page")
}

#[test]
fn incomplete_condition_leaves_siblings_in_force() {
    let payload = r#"{"conditions":[{"operator":"equals","value":"x"},{"question_id":1,"operator":"equals","value":"yes"}]}"#;
    let mut doc = inline_page(serde_json::json!([
        { "id": "answer", "attributes": { "name": "question_1" }, "input": { "type": "text", "value": "no" } },
        { "id": "follow-up", "attributes": { "data-conditional-logic": payload } }
    ]));
    let binding = bind(&mut doc, &LogicConfig::default());

    assert!(binding.unmanaged().is_empty());
    assert!(hidden(&doc, "follow-up"));

    dispatch_all(&mut doc, &binding, "question_1", "yes");
    assert!(!hidden(&doc, "follow-up"));
}

#[test]
fn empty_condition_list_clears_forced_hidden_style() {
    let mut doc = inline_page(serde_json::json!([
        { "id": "always", "attributes": { "data-conditional-logic": r#"{"conditions":[]}"# }, "hidden": true }
    ]));
    let binding = bind(&mut doc, &LogicConfig::default());

    assert!(!hidden(&doc, "always"));
    assert!(binding.unmanaged().is_empty());
    assert!(binding.subscriptions().is_empty());
    assert_eq!(
        binding.rule_for(&ElementId::new("always")).map(|rule| rule.conditions.len()),
        Some(0)
    );
}
