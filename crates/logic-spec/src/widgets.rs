use std::time::Duration;

use tracing::debug;

use crate::binder::{Binding, bind};
use crate::config::LogicConfig;
use crate::document::{Document, ElementId};
use crate::selector::Selector;

/// UI toolkit behaviours attached to page elements. Calls are fire-and-forget.
pub trait Toolkit {
    fn tooltip(&mut self, element: &ElementId);
    fn popover(&mut self, element: &ElementId);
    fn dismiss_alert(&mut self, element: &ElementId);
}

/// Toolkit call, as recorded by [`RecordingToolkit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetCall {
    Tooltip(ElementId),
    Popover(ElementId),
    DismissAlert(ElementId),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingToolkit {
    pub calls: Vec<WidgetCall>,
}

impl RecordingToolkit {
    pub fn count(&self, matches: impl Fn(&WidgetCall) -> bool) -> usize {
        self.calls.iter().filter(|call| matches(*call)).count()
    }
}

impl Toolkit for RecordingToolkit {
    fn tooltip(&mut self, element: &ElementId) {
        self.calls.push(WidgetCall::Tooltip(element.clone()));
    }

    fn popover(&mut self, element: &ElementId) {
        self.calls.push(WidgetCall::Popover(element.clone()));
    }

    fn dismiss_alert(&mut self, element: &ElementId) {
        self.calls.push(WidgetCall::DismissAlert(element.clone()));
    }
}

/// One-shot dismissal of alerts. The query runs when the timer fires, so
/// alerts added during the delay are dismissed as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertTimer {
    pub delay: Duration,
    pub selector: Selector,
}

impl AlertTimer {
    /// Alerts that would be dismissed if the timer fired now.
    pub fn pending<D>(&self, doc: &D) -> Vec<ElementId>
    where
        D: Document + ?Sized,
    {
        doc.query_all(&self.selector)
    }

    /// Dismisses every matching alert. The host calls this once `delay` has elapsed.
    pub fn fire<D, T>(self, doc: &D, toolkit: &mut T) -> Vec<ElementId>
    where
        D: Document + ?Sized,
        T: Toolkit + ?Sized,
    {
        let alerts = self.pending(doc);
        for alert in &alerts {
            toolkit.dismiss_alert(alert);
        }
        debug!(alerts = alerts.len(), "alerts dismissed");
        alerts
    }
}

#[derive(Debug, Clone)]
pub struct Enhancement {
    pub tooltips: usize,
    pub popovers: usize,
    pub alert_timer: AlertTimer,
    pub binding: Binding,
}

/// Page bootstrap: widgets first, then conditional logic.
pub fn enhance<D, T>(doc: &mut D, toolkit: &mut T, config: &LogicConfig) -> Enhancement
where
    D: Document + ?Sized,
    T: Toolkit + ?Sized,
{
    let tooltips = doc.query_all(&Selector::attribute_equals("data-bs-toggle", "tooltip"));
    for element in &tooltips {
        toolkit.tooltip(element);
    }

    let popovers = doc.query_all(&Selector::attribute_equals("data-bs-toggle", "popover"));
    for element in &popovers {
        toolkit.popover(element);
    }

    debug!(
        tooltips = tooltips.len(),
        popovers = popovers.len(),
        "widgets initialized"
    );

    Enhancement {
        tooltips: tooltips.len(),
        popovers: popovers.len(),
        alert_timer: AlertTimer {
            delay: config.alert_delay(),
            selector: config.alert_selector.clone(),
        },
        binding: bind(doc, config),
    }
}
