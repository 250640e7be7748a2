use super::*;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::{ServiceCaller, TransportError};

struct NoopServices;

#[async_trait]
impl ServiceCaller for NoopServices {
    async fn call_service(
        &self,
        _domain: &str,
        _service: &str,
        _data: Value,
    ) -> Result<(), TransportError> {
        Ok(())
    }
}

fn context(token: &str) -> ConnectionContext {
    ConnectionContext::new(token, Arc::new(NoopServices))
}

fn ready_editor(entity: &str) -> ConfigBindingController {
    let mut editor = ConfigBindingController::new();
    editor.mount();
    editor.set_config(CardConfig::new(entity));
    editor.set_context(context("t"));
    editor
}

#[test]
fn same_value_emits_nothing() {
    let mut editor = ready_editor("printer.a");
    let mut rx = editor.subscribe();

    assert!(editor.on_value_changed("printer.a").is_none());
    assert!(rx.try_recv().is_err());
    assert_eq!(editor.config(), Some(&CardConfig::new("printer.a")));
}

#[test]
fn different_value_emits_exactly_one_event() {
    let mut editor = ready_editor("printer.a");
    let mut rx = editor.subscribe();

    let event = editor.on_value_changed("printer.b").expect("event");
    assert_eq!(event.config.entity, "printer.b");
    assert!(event.bubbles() && event.composed());
    assert_eq!(event.name(), "config-changed");

    assert_eq!(rx.try_recv().expect("broadcast").config.entity, "printer.b");
    assert!(rx.try_recv().is_err());
    assert_eq!(editor.config().map(|c| c.entity.as_str()), Some("printer.b"));
    assert_eq!(editor.view().map(|v| v.value.as_str()), Some("printer.b"));

    assert!(editor.on_value_changed("printer.b").is_none());
}

#[test]
fn edits_keep_other_config_keys() {
    let mut editor = ConfigBindingController::new();
    editor.mount();
    let config: CardConfig = serde_json::from_value(serde_json::json!({
        "type": "custom:ipp-printer-card",
        "entity": "printer.a",
    }))
    .expect("config");
    editor.set_config(config);
    editor.set_context(context("t"));

    let event = editor.on_value_changed("printer.b").expect("event");
    let wire = serde_json::to_value(&event).expect("json");
    assert_eq!(
        wire,
        serde_json::json!({
            "config": { "type": "custom:ipp-printer-card", "entity": "printer.b" }
        })
    );
}

#[test]
fn edits_are_ignored_until_config_and_context_are_held() {
    let mut editor = ConfigBindingController::new();
    editor.mount();
    assert!(editor.on_value_changed("printer.b").is_none());

    editor.set_config(CardConfig::new("printer.a"));
    assert_eq!(editor.lifecycle(), EditorLifecycle::AwaitingContext);
    assert!(editor.on_value_changed("printer.b").is_none());
    assert_eq!(editor.config().map(|c| c.entity.as_str()), Some("printer.a"));
}

#[test]
fn lifecycle_walks_to_ready_and_stays_there() {
    let mut editor = ConfigBindingController::new();
    assert_eq!(editor.lifecycle(), EditorLifecycle::Unmounted);

    editor.mount();
    assert_eq!(editor.lifecycle(), EditorLifecycle::AwaitingConfig);

    editor.set_context(context("t"));
    assert_eq!(editor.lifecycle(), EditorLifecycle::AwaitingConfig);

    editor.set_config(CardConfig::new("printer.a"));
    assert_eq!(editor.lifecycle(), EditorLifecycle::Ready);

    editor.set_config(CardConfig::stub());
    editor.set_context(context("t2"));
    assert_eq!(editor.lifecycle(), EditorLifecycle::Ready);

    editor.unmount();
    assert_eq!(editor.lifecycle(), EditorLifecycle::Unmounted);
    assert!(editor.view().is_none());
}

#[test]
fn render_is_deferred_until_a_context_arrives() {
    let mut editor = ConfigBindingController::new();
    editor.mount();
    editor.set_config(CardConfig::new("printer.a"));
    assert!(editor.view().is_none());

    editor.set_context(context("t"));
    let view = editor.view().expect("view");
    assert_eq!(view.value, "printer.a");
    assert_eq!(view.label, "Printer Entity");
    assert!(view.required);
    assert_eq!(view.selector, EntitySelector::printers());
    assert_eq!(view.selector.domain, "sensor");
    assert_eq!(view.selector.integration, "ipp_printer_service");
    assert_eq!(editor.constructions(), 1);
}

#[test]
fn render_without_config_is_a_no_op() {
    let mut editor = ConfigBindingController::new();
    editor.mount();
    editor.render();
    assert!(editor.view().is_none());
    assert_eq!(editor.constructions(), 0);
}

#[test]
fn new_config_patches_instead_of_rebuilding() {
    let mut editor = ready_editor("printer.a");
    editor.set_config(CardConfig::new("printer.c"));
    editor.render();

    assert_eq!(editor.constructions(), 1);
    assert_eq!(editor.view().map(|v| v.value.as_str()), Some("printer.c"));
}

#[test]
fn new_context_is_pushed_into_the_view() {
    let mut editor = ready_editor("printer.a");
    let replacement = context("fresh");
    editor.set_context(replacement.clone());

    let pushed = editor
        .view()
        .and_then(|view| view.context.as_ref())
        .expect("context");
    assert!(pushed.same_as(&replacement));
    assert_eq!(pushed.access_token(), "fresh");
    assert_eq!(editor.constructions(), 1);
}

#[test]
fn projection_is_pure() {
    let config = CardConfig::new("printer.a");
    let first = SelectorView::project(&config, None);
    let second = SelectorView::project(&config, None);
    assert_eq!(first.value, second.value);
    assert_eq!(first.selector, second.selector);
    assert!(first.context.is_none());
}
