use serde_json::json;

use survey_logic::{
    ElementId, ElementSpec, LogicConfig, MemoryDocument, RecordingToolkit, SkipReason, WidgetCall, bind,
    build_report, enhance, render_json, render_text, validate,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "survey_page" => include_str!("../tests/fixtures/survey_page.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

#[test]
fn report_counts_managed_and_unmanaged_questions() {
    let mut doc = MemoryDocument::from_json(fixture("survey_page")).expect("page");
    let binding = bind(&mut doc, &LogicConfig::default());
    let report = build_report(&doc, &binding);

    assert_eq!(report.page_id, "customer-feedback");
    assert_eq!(report.counts.shown, 2);
    assert_eq!(report.counts.hidden, 3);
    assert_eq!(report.counts.unmanaged, 2);

    let ids: Vec<_> = report.questions.iter().map(|question| question.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "question-6",
            "question-8",
            "question-10",
            "question-12",
            "question-13",
            "question-14",
            "question-15"
        ]
    );
    let malformed = &report.questions[3];
    assert!(!malformed.managed());
    assert_eq!(malformed.skip_reason, Some(SkipReason::MalformedPayload));
}

#[test]
fn json_report_exposes_condition_outcomes() {
    let mut doc = MemoryDocument::from_json(fixture("survey_page")).expect("page");
    let binding = bind(&mut doc, &LogicConfig::default());
    let ui = render_json(&build_report(&doc, &binding));

    assert_eq!(ui["counts"]["hidden"], 3);
    let questions = ui["questions"].as_array().expect("questions array");
    let q10 = questions
        .iter()
        .find(|question| question["id"] == "question-10")
        .expect("question-10");
    assert_eq!(q10["visible"], false);
    assert_eq!(q10["triggers"], json!(["question_9", "question_11"]));
    assert_eq!(q10["conditions"][0]["outcome"], "failed");

    let q15 = questions
        .iter()
        .find(|question| question["id"] == "question-15")
        .expect("question-15");
    assert_eq!(q15["conditions"][0]["outcome"], "skipped");
    assert_eq!(q15["conditions"][0]["cause"], "substring_on_choice_group");
}

#[test]
fn text_report_lists_questions() {
    let mut doc = MemoryDocument::from_json(fixture("survey_page")).expect("page");
    let binding = bind(&mut doc, &LogicConfig::default());
    let text = render_text(&build_report(&doc, &binding));
    assert!(text.contains("Page: Customer feedback (customer-feedback)"));
    assert!(text.contains("question-6 [hidden] <- question_5"));
    assert!(text.contains("question-12 [hidden] unmanaged: malformed payload"));
}

#[test]
fn validation_flags_tolerated_problems() {
    let doc = MemoryDocument::from_json(fixture("survey_page")).expect("page");
    let result = validate(&doc, &LogicConfig::default());
    assert!(!result.valid);

    let codes: Vec<_> = result
        .issues
        .iter()
        .map(|issue| (issue.question_id.as_str(), issue.code.as_str()))
        .collect();
    assert_eq!(
        codes,
        vec![
            ("question-12", "malformed_payload"),
            ("question-13", "missing_conditions"),
            ("question-14", "missing_trigger"),
            ("question-15", "substring_on_choice_group"),
        ]
    );
    assert_eq!(result.issues[2].path, "/question-14/conditions/0");
}

#[test]
fn enhance_initializes_widgets_and_schedules_alerts() {
    let mut doc = MemoryDocument::from_json(fixture("survey_page")).expect("page");
    let mut toolkit = RecordingToolkit::default();
    let enhancement = enhance(&mut doc, &mut toolkit, &LogicConfig::default());

    assert_eq!(enhancement.tooltips, 1);
    assert_eq!(enhancement.popovers, 1);
    assert_eq!(
        toolkit.calls,
        vec![
            WidgetCall::Tooltip(ElementId::new("help-name")),
            WidgetCall::Popover(ElementId::new("help-contact")),
        ]
    );
    assert_eq!(enhancement.alert_timer.delay.as_secs(), 5);
    assert_eq!(
        enhancement.alert_timer.pending(&doc),
        vec![ElementId::new("flash-saved")]
    );
    assert!(doc.is_hidden(&ElementId::new("question-6")).expect("exists"));

    let dismissed = enhancement.alert_timer.fire(&doc, &mut toolkit);
    assert_eq!(dismissed, vec![ElementId::new("flash-saved")]);
    assert_eq!(
        toolkit.count(|call| matches!(call, WidgetCall::DismissAlert(_))),
        1
    );
}

#[test]
fn alerts_added_during_the_delay_are_dismissed() {
    let mut doc = MemoryDocument::from_json(fixture("survey_page")).expect("page");
    let mut toolkit = RecordingToolkit::default();
    let enhancement = enhance(&mut doc, &mut toolkit, &LogicConfig::default());

    let late: ElementSpec = serde_json::from_value(json!({
        "id": "flash-late",
        "classes": ["alert", "alert-info"]
    }))
    .expect("element");
    doc.append(late).expect("append");

    let dismissed = enhancement.alert_timer.fire(&doc, &mut toolkit);
    assert_eq!(
        dismissed,
        vec![ElementId::new("flash-saved"), ElementId::new("flash-late")]
    );
}

#[test]
fn text_report_uses_readable_skip_causes() {
    let mut doc = MemoryDocument::from_json(fixture("survey_page")).expect("page");
    let binding = bind(&mut doc, &LogicConfig::default());
    let text = render_text(&build_report(&doc, &binding));
    assert!(text.contains("#0 skipped (substring on choice group)"));
    assert!(!text.contains("SubstringOnChoiceGroup"));
}
