#![allow(missing_docs)]

pub mod binder;
pub mod config;
pub mod document;
pub mod memory;
pub mod render;
pub mod rule;
pub mod selector;
pub mod spec;
pub mod validate;
pub mod visibility;
pub mod widgets;

pub use binder::{BoundQuestion, Binding, Decision, SkipReason, Subscription, bind};
pub use config::LogicConfig;
pub use document::{
    Display, Document, ElementId, EventKind, FormState, InputEvent, InputKind, InputRef,
    InputState,
};
pub use memory::{MemoryDocument, PageError};
pub use render::{PageReport, QuestionReport, ReportCounts, build_report, render_json, render_text};
pub use rule::{Condition, Operator, Rule, RuleError, rule_schema};
pub use selector::{Selector, SelectorError};
pub use spec::{ElementSpec, InputSpec, PageSpec};
pub use validate::{RuleIssue, ValidationResult, validate};
pub use visibility::{
    ConditionOutcome, SkipCause, VisibilityMap, apply, check_condition, evaluate, explain,
};
pub use widgets::{AlertTimer, Enhancement, RecordingToolkit, Toolkit, WidgetCall, enhance};
