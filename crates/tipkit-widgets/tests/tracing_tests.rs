#![forbid(unsafe_code)]

//! Tracing integration tests.
//!
//! Instrumentation enabled:
//!   cargo test -p tipkit-widgets --features tracing --test tracing_tests
//!
//! Zero-overhead verification (no feature):
//!   cargo test -p tipkit-widgets --test tracing_tests -- zero_overhead

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tipkit_core::event::Event;
#[cfg(feature = "tracing")]
use tipkit_core::geometry::{LayoutMetrics, Rect, Size};
#[cfg(feature = "tracing")]
use tipkit_widgets::Placement;
use tipkit_widgets::{TooltipConfig, TooltipController};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Test Infrastructure
// ============================================================================

/// A captured event or span with its target and fields.
#[derive(Debug, Clone)]
#[allow(dead_code)]
struct Captured {
    target: String,
    name: String,
    fields: HashMap<String, String>,
    parent: Option<String>,
}

/// A tracing Layer that records spans and events.
struct Capture {
    spans: Arc<Mutex<Vec<Captured>>>,
    events: Arc<Mutex<Vec<Captured>>>,
}

#[derive(Clone)]
struct CaptureHandle {
    spans: Arc<Mutex<Vec<Captured>>>,
    events: Arc<Mutex<Vec<Captured>>>,
}

impl CaptureHandle {
    #[allow(dead_code)]
    fn spans(&self) -> Vec<Captured> {
        self.spans.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    fn events(&self) -> Vec<Captured> {
        self.events.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    fn messages(&self, target: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.target == target)
            .filter_map(|e| e.fields.get("message").cloned())
            .collect()
    }
}

impl Capture {
    fn new() -> (Self, CaptureHandle) {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let handle = CaptureHandle {
            spans: spans.clone(),
            events: events.clone(),
        };
        (Self { spans, events }, handle)
    }
}

/// Visitor that extracts fields as strings.
struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0
            .push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        let parent = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span_ref| span_ref.name().to_string());
        self.spans.lock().unwrap().push(Captured {
            target: attrs.metadata().target().to_string(),
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
            parent,
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        let parent = ctx
            .event_span(event)
            .map(|span_ref| span_ref.name().to_string());
        self.events.lock().unwrap().push(Captured {
            target: event.metadata().target().to_string(),
            name: event.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
            parent,
        });
    }
}

/// Run `f` under a subscriber that captures everything.
fn with_capture<F>(f: F) -> CaptureHandle
where
    F: FnOnce(),
{
    let (layer, handle) = Capture::new();
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    handle
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

// ============================================================================
// Instrumented Tests
// ============================================================================

#[test]
#[cfg(feature = "tracing")]
fn transitions_are_logged_in_order() {
    let handle = with_capture(|| {
        let mut tip = TooltipController::new(TooltipConfig::default());
        tip.connect();
        tip.handle_event(&Event::pointer_enter(), ms(0));
        tip.advance(ms(200));
        tip.handle_event(&Event::pointer_leave(), ms(300));
        tip.advance(ms(400));
    });

    let transitions: Vec<(String, String)> = handle
        .events()
        .into_iter()
        .filter(|e| e.fields.get("message").is_some_and(|m| m == "phase transition"))
        .map(|e| (e.fields["from"].clone(), e.fields["to"].clone()))
        .collect();

    assert_eq!(
        transitions,
        vec![
            ("hidden".to_string(), "pending_show".to_string()),
            ("pending_show".to_string(), "visible".to_string()),
            ("visible".to_string(), "pending_hide".to_string()),
            ("pending_hide".to_string(), "hidden".to_string()),
        ]
    );
}

#[test]
#[cfg(feature = "tracing")]
fn notifications_are_logged_with_event_name() {
    let handle = with_capture(|| {
        let mut tip = TooltipController::new(TooltipConfig::default().activation_delay_ms(0));
        tip.connect();
        tip.show(ms(10));
        tip.advance(ms(10));
    });

    let notices: Vec<_> = handle
        .events()
        .into_iter()
        .filter(|e| e.fields.get("message").is_some_and(|m| m == "notification"))
        .collect();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].fields["event"], "tooltip-show");
    assert_eq!(notices[0].fields["at_ms"], "10");
    assert_eq!(notices[0].target, "tipkit::tooltip");
}

#[test]
#[cfg(feature = "tracing")]
fn input_events_open_a_span() {
    let handle = with_capture(|| {
        let mut tip = TooltipController::new(TooltipConfig::default());
        tip.connect();
        tip.handle_event(&Event::Focus(true), ms(0));
    });

    let spans = handle.spans();
    let span = spans
        .iter()
        .find(|s| s.name == "tooltip_event")
        .expect("tooltip_event span");
    assert_eq!(span.fields["event"], "focus");

    let inside: Vec<_> = handle
        .events()
        .into_iter()
        .filter(|e| e.parent.as_deref() == Some("tooltip_event"))
        .collect();
    assert!(!inside.is_empty(), "transition should be logged inside the span");
}

#[test]
#[cfg(feature = "tracing")]
fn late_input_logs_elapsed_show_inside_its_span() {
    let handle = with_capture(|| {
        let mut tip = TooltipController::new(TooltipConfig::default());
        tip.connect();
        tip.handle_event(&Event::pointer_enter(), ms(0));
        tip.handle_event(&Event::pointer_leave(), ms(300));
    });

    let notices: Vec<_> = handle
        .events()
        .into_iter()
        .filter(|e| e.fields.get("message").is_some_and(|m| m == "notification"))
        .collect();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].fields["event"], "tooltip-show");
    assert_eq!(notices[0].fields["at_ms"], "200");
    assert_eq!(notices[0].parent.as_deref(), Some("tooltip_event"));
}

#[test]
#[cfg(feature = "tracing")]
fn placement_resolution_uses_its_own_target() {
    let handle = with_capture(|| {
        let mut tip = TooltipController::new(TooltipConfig::default().placement(Placement::Top));
        tip.connect();
        tip.handle_event(
            &Event::Resize(LayoutMetrics::new(
                Rect::new(100, 5, 16, 16),
                Size::new(120, 30),
                Size::new(800, 600),
            )),
            ms(0),
        );
        tip.show(ms(0));
        tip.advance(ms(200));
    });

    let resolved: Vec<_> = handle
        .events()
        .into_iter()
        .filter(|e| e.target == "tipkit::placement")
        .collect();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].fields["requested"], "top");
    assert_eq!(resolved[0].fields["effective"], "bottom");
}

#[test]
#[cfg(feature = "tracing")]
fn detached_inputs_are_traced_not_applied() {
    let handle = with_capture(|| {
        let mut tip = TooltipController::new(TooltipConfig::default());
        tip.show(ms(0));
    });
    let messages = handle.messages("tipkit::tooltip");
    assert_eq!(messages, vec!["ignored while detached".to_string()]);
}

// ============================================================================
// Zero-overhead
// ============================================================================

#[test]
#[cfg(not(feature = "tracing"))]
fn zero_overhead_without_feature() {
    let handle = with_capture(|| {
        let mut tip = TooltipController::new(TooltipConfig::default());
        tip.connect();
        tip.handle_event(&Event::pointer_enter(), ms(0));
        tip.advance(ms(200));
    });
    assert!(handle.spans().is_empty());
    assert!(handle.events().is_empty());
}
