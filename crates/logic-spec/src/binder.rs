use serde::Serialize;
use tracing::debug;

use crate::config::LogicConfig;
use crate::document::{Document, ElementId, EventKind, InputEvent, InputRef};
use crate::rule::Rule;
use crate::selector::Selector;
use crate::visibility::{apply, evaluate};

/// Why a flagged question was left unmanaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingPayload,
    MalformedPayload,
    NoConditions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuestion {
    pub element: ElementId,
    pub rule: Rule,
}

/// Interest of one question in one event of one trigger input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub input: InputRef,
    pub event: EventKind,
    pub question: ElementId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub question: ElementId,
    pub shown: bool,
}

/// Rules and subscriptions established for one document.
///
/// Dropping a binding leaves the document's watchers in place; call
/// [`Binding::dispose`] to release them.
#[derive(Debug, Clone)]
pub struct Binding {
    config: LogicConfig,
    questions: Vec<BoundQuestion>,
    subscriptions: Vec<Subscription>,
    unmanaged: Vec<(ElementId, SkipReason)>,
}

/// Discovers flagged questions, watches their triggers and applies the
/// initial visibility of each managed question.
pub fn bind<D>(doc: &mut D, config: &LogicConfig) -> Binding
where
    D: Document + ?Sized,
{
    let mut binding = Binding {
        config: config.clone(),
        questions: Vec::new(),
        subscriptions: Vec::new(),
        unmanaged: Vec::new(),
    };

    for element in doc.query_all(&Selector::has_attribute(&config.flag_attribute)) {
        let Some(payload) = doc.attribute(&element, &config.flag_attribute) else {
            debug!(question = %element, "flagged question has no rule payload");
            binding.unmanaged.push((element, SkipReason::MissingPayload));
            continue;
        };

        let rule = match Rule::parse(&payload) {
            Ok(Some(rule)) => rule,
            Ok(None) => {
                debug!(question = %element, "rule payload has no conditions");
                apply(doc, &element, true);
                binding.unmanaged.push((element, SkipReason::NoConditions));
                continue;
            }
            Err(err) => {
                debug!(question = %element, error = %err, "skipping malformed rule payload");
                binding.unmanaged.push((element, SkipReason::MalformedPayload));
                continue;
            }
        };

        for condition in &rule.conditions {
            let Some(question_id) = condition.question_id.as_deref() else {
                debug!(question = %element, "condition names no trigger question");
                continue;
            };
            let name = config.trigger_name(question_id);
            let inputs = doc.inputs(&name);
            let Some(first) = inputs.first() else {
                debug!(question = %element, trigger = %name, "trigger input not found");
                continue;
            };
            if first.kind.is_choice() {
                for index in 0..inputs.len() {
                    binding.subscribe(doc, InputRef::new(&name, index), EventKind::Change, &element);
                }
            } else {
                for event in [EventKind::Change, EventKind::Input] {
                    binding.subscribe(doc, InputRef::new(&name, 0), event, &element);
                }
            }
        }

        let shown = evaluate(&rule, &*doc, config);
        apply(doc, &element, shown);
        binding.questions.push(BoundQuestion { element, rule });
    }

    debug!(
        managed = binding.questions.len(),
        unmanaged = binding.unmanaged.len(),
        subscriptions = binding.subscriptions.len(),
        "conditional logic bound"
    );
    binding
}

impl Binding {
    fn subscribe<D>(&mut self, doc: &mut D, input: InputRef, event: EventKind, question: &ElementId)
    where
        D: Document + ?Sized,
    {
        let subscription = Subscription {
            input,
            event,
            question: question.clone(),
        };
        if self.subscriptions.contains(&subscription) {
            return;
        }
        doc.watch(&subscription.input, subscription.event);
        self.subscriptions.push(subscription);
    }

    pub fn config(&self) -> &LogicConfig {
        &self.config
    }

    pub fn questions(&self) -> &[BoundQuestion] {
        &self.questions
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn unmanaged(&self) -> &[(ElementId, SkipReason)] {
        &self.unmanaged
    }

    pub fn rule_for(&self, question: &ElementId) -> Option<&Rule> {
        self.questions
            .iter()
            .find(|bound| &bound.element == question)
            .map(|bound| &bound.rule)
    }

    /// Re-evaluates every question subscribed to `event`, once each, in binding order.
    pub fn dispatch<D>(&self, doc: &mut D, event: &InputEvent) -> Vec<Decision>
    where
        D: Document + ?Sized,
    {
        let dependents = self.questions.iter().filter(|bound| {
            self.subscriptions.iter().any(|subscription| {
                subscription.question == bound.element
                    && subscription.event == event.kind
                    && subscription.input == event.target
            })
        });
        let decisions = self.decide(doc, dependents);
        debug!(
            trigger = %event.target.name,
            dependents = decisions.len(),
            "re-evaluated after input event"
        );
        decisions
    }

    /// Re-evaluates every managed question.
    pub fn refresh<D>(&self, doc: &mut D) -> Vec<Decision>
    where
        D: Document + ?Sized,
    {
        self.decide(doc, self.questions.iter())
    }

    /// Releases every watcher registered by [`bind`].
    pub fn dispose<D>(self, doc: &mut D)
    where
        D: Document + ?Sized,
    {
        for subscription in &self.subscriptions {
            doc.unwatch(&subscription.input, subscription.event);
        }
    }

    fn decide<'a, D>(
        &self,
        doc: &mut D,
        questions: impl Iterator<Item = &'a BoundQuestion>,
    ) -> Vec<Decision>
    where
        D: Document + ?Sized,
    {
        let mut decisions = Vec::new();
        for bound in questions {
            let shown = evaluate(&bound.rule, &*doc, &self.config);
            apply(doc, &bound.element, shown);
            decisions.push(Decision {
                question: bound.element.clone(),
                shown,
            });
        }
        decisions
    }
}
