#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! [`SessionRecorder`] wraps a [`Page`] and records every host operation
//! (element insertion, attribute writes, layout, input, time advances and
//! steps) together with the notifications each step produced. [`replay`]
//! re-drives a fresh page from the trace and reports whether it produced
//! the same notifications at the same times.
//!
//! # Format
//!
//! One JSON object per line, tagged by `"event"`:
//!
//! - **header**: schema version and initial viewport (must be first).
//! - **append** / **remove**: element lifecycle, with initial attributes.
//! - **attribute**, **layout**, **viewport**: host configuration.
//! - **input**, **show**, **hide**: user and imperative input.
//! - **tick**: absolute clock reading in nanoseconds.
//! - **step**: a [`Page::step`] boundary.
//! - **notification**: a notification produced by the preceding step.
//! - **summary**: notification count (must be last).
//!
//! # Determinism contract
//!
//! Time only advances through tick records and input is only delivered at
//! step records, so identical traces yield identical notifications.

use core::fmt;
use core::time::Duration;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tipkit_core::event::{
    Event, HitTarget, KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerEventKind,
};
use tipkit_core::geometry::{LayoutMetrics, Rect, Size};
use tipkit_core::{debug, info};

use crate::WebHostError;
use crate::element::TooltipElement;
use crate::page::{ElementId, Page, PageNotification, StepResult, Target};

/// Schema version for session traces.
pub const SCHEMA_VERSION: &str = "tipkit-session-v1";

/// Serializable rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectRecord {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl From<Rect> for RectRecord {
    fn from(r: Rect) -> Self {
        Self {
            x: r.x,
            y: r.y,
            width: r.width,
            height: r.height,
        }
    }
}

impl From<RectRecord> for Rect {
    fn from(r: RectRecord) -> Self {
        Rect::new(r.x, r.y, r.width, r.height)
    }
}

/// Serializable size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRecord {
    pub width: u32,
    pub height: u32,
}

impl From<Size> for SizeRecord {
    fn from(s: Size) -> Self {
        Self {
            width: s.width,
            height: s.height,
        }
    }
}

impl From<SizeRecord> for Size {
    fn from(s: SizeRecord) -> Self {
        Size::new(s.width, s.height)
    }
}

/// Serializable input event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputRecord {
    PointerEnter,
    PointerLeave,
    Touch {
        hit: String,
    },
    Focus,
    Blur,
    Key {
        key: String,
        modifiers: u8,
        event_kind: String,
    },
    Resize {
        anchor: RectRecord,
        content: SizeRecord,
        viewport: SizeRecord,
    },
}

/// A notification line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Host time of the transition, in nanoseconds.
    pub ts_ns: u64,
    /// Raw element id.
    pub element: u32,
    /// DOM event name.
    pub name: String,
}

impl From<&PageNotification> for NotificationRecord {
    fn from(n: &PageNotification) -> Self {
        Self {
            ts_ns: duration_to_ns(n.at),
            element: n.element.raw(),
            name: n.kind.event_name().to_string(),
        }
    }
}

/// A single record in a session trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceRecord {
    /// Session header (must be first).
    Header {
        schema_version: String,
        viewport: SizeRecord,
    },
    /// Element inserted with its initial attributes.
    Append {
        element: u32,
        attributes: Vec<(String, String)>,
    },
    /// Element removed.
    Remove { element: u32 },
    /// Attribute written (`None` = removed).
    Attribute {
        element: u32,
        name: String,
        value: Option<String>,
    },
    /// Element layout reported.
    Layout {
        element: u32,
        anchor: RectRecord,
        content: SizeRecord,
    },
    /// Viewport changed.
    Viewport { viewport: SizeRecord },
    /// Input queued. `target` is `None` for the document.
    Input {
        ts_ns: u64,
        target: Option<u32>,
        data: InputRecord,
    },
    /// Imperative show.
    Show { ts_ns: u64, element: u32 },
    /// Imperative hide.
    Hide { ts_ns: u64, element: u32 },
    /// Absolute clock reading.
    Tick { ts_ns: u64 },
    /// Step boundary.
    Step { ts_ns: u64 },
    /// Notification produced by the preceding step.
    Notification(NotificationRecord),
    /// Trace summary (must be last).
    Summary { total_notifications: u64 },
}

fn duration_to_ns(d: Duration) -> u64 {
    u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
}

fn hit_to_str(hit: HitTarget) -> &'static str {
    match hit {
        HitTarget::Trigger => "trigger",
        HitTarget::Component => "component",
        HitTarget::Outside => "outside",
    }
}

fn hit_from_str(hit: &str) -> HitTarget {
    match hit {
        "trigger" => HitTarget::Trigger,
        "component" => HitTarget::Component,
        _ => HitTarget::Outside,
    }
}

fn key_code_to_dom(code: KeyCode) -> String {
    match code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Escape => "Escape".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Space => " ".to_string(),
        KeyCode::Other => "Unidentified".to_string(),
    }
}

fn key_event_kind_to_str(kind: KeyEventKind) -> &'static str {
    match kind {
        KeyEventKind::Press => "press",
        KeyEventKind::Repeat => "repeat",
        KeyEventKind::Release => "release",
    }
}

fn key_event_kind_from_str(kind: &str) -> KeyEventKind {
    match kind {
        "repeat" => KeyEventKind::Repeat,
        "release" => KeyEventKind::Release,
        _ => KeyEventKind::Press,
    }
}

impl From<&Event> for InputRecord {
    fn from(event: &Event) -> Self {
        match event {
            Event::Pointer(p) => match p.kind {
                PointerEventKind::Enter => Self::PointerEnter,
                PointerEventKind::Leave => Self::PointerLeave,
            },
            Event::Touch(t) => Self::Touch {
                hit: hit_to_str(t.target).to_string(),
            },
            Event::Focus(true) => Self::Focus,
            Event::Focus(false) => Self::Blur,
            Event::Key(k) => Self::Key {
                key: key_code_to_dom(k.code),
                modifiers: k.modifiers.bits(),
                event_kind: key_event_kind_to_str(k.kind).to_string(),
            },
            Event::Resize(m) => Self::Resize {
                anchor: m.anchor.into(),
                content: m.content.into(),
                viewport: m.viewport.into(),
            },
        }
    }
}

impl From<&InputRecord> for Event {
    fn from(record: &InputRecord) -> Self {
        match record {
            InputRecord::PointerEnter => Event::pointer_enter(),
            InputRecord::PointerLeave => Event::pointer_leave(),
            InputRecord::Touch { hit } => Event::touch(hit_from_str(hit)),
            InputRecord::Focus => Event::Focus(true),
            InputRecord::Blur => Event::Focus(false),
            InputRecord::Key {
                key,
                modifiers,
                event_kind,
            } => Event::Key(
                KeyEvent::new(KeyCode::from_dom_key(key))
                    .with_modifiers(Modifiers::from_bits_truncate(*modifiers))
                    .with_kind(key_event_kind_from_str(event_kind)),
            ),
            InputRecord::Resize {
                anchor,
                content,
                viewport,
            } => Event::Resize(LayoutMetrics::new(
                (*anchor).into(),
                (*content).into(),
                (*viewport).into(),
            )),
        }
    }
}

impl TraceRecord {
    /// Serialize this record as one JSONL line (no trailing newline).
    pub fn to_jsonl(&self) -> String {
        // Every field is a string, integer, or sequence thereof.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Structural problems in a trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceValidationError {
    /// No records at all.
    EmptyTrace,
    /// No header record.
    MissingHeader,
    /// The header is not the first record.
    HeaderNotFirst,
    /// More than one header.
    MultipleHeaders,
    /// Header names a schema this build does not understand.
    UnsupportedSchema(String),
    /// No summary record.
    MissingSummary,
    /// A record follows the summary.
    SummaryNotLast { summary_index: usize },
    /// Summary count disagrees with the notification records.
    SummaryCountMismatch { expected: u64, actual: u64 },
}

impl fmt::Display for TraceValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTrace => write!(f, "trace is empty"),
            Self::MissingHeader => write!(f, "trace missing header record"),
            Self::HeaderNotFirst => write!(f, "header is not the first record"),
            Self::MultipleHeaders => write!(f, "trace has more than one header"),
            Self::UnsupportedSchema(v) => write!(f, "unsupported schema version: {v}"),
            Self::MissingSummary => write!(f, "trace missing summary record"),
            Self::SummaryNotLast { summary_index } => {
                write!(f, "summary at index {summary_index} is not the last record")
            }
            Self::SummaryCountMismatch { expected, actual } => write!(
                f,
                "summary reports {actual} notifications, trace has {expected}"
            ),
        }
    }
}

impl std::error::Error for TraceValidationError {}

/// A complete recorded session trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    /// Notification records in order.
    pub fn notifications(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.iter().filter_map(|r| match r {
            TraceRecord::Notification(n) => Some(n),
            _ => None,
        })
    }

    /// Number of notification records.
    #[must_use]
    pub fn notification_count(&self) -> u64 {
        self.notifications().count() as u64
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<(), TraceValidationError> {
        let Some(first) = self.records.first() else {
            return Err(TraceValidationError::EmptyTrace);
        };

        let headers = self
            .records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Header { .. }))
            .count();
        match headers {
            0 => return Err(TraceValidationError::MissingHeader),
            1 => {}
            _ => return Err(TraceValidationError::MultipleHeaders),
        }
        let TraceRecord::Header { schema_version, .. } = first else {
            return Err(TraceValidationError::HeaderNotFirst);
        };
        if schema_version != SCHEMA_VERSION {
            return Err(TraceValidationError::UnsupportedSchema(
                schema_version.clone(),
            ));
        }

        let Some(summary_index) = self
            .records
            .iter()
            .position(|r| matches!(r, TraceRecord::Summary { .. }))
        else {
            return Err(TraceValidationError::MissingSummary);
        };
        if summary_index != self.records.len() - 1 {
            return Err(TraceValidationError::SummaryNotLast { summary_index });
        }
        if let TraceRecord::Summary {
            total_notifications,
        } = &self.records[summary_index]
        {
            let expected = self.notification_count();
            if *total_notifications != expected {
                return Err(TraceValidationError::SummaryCountMismatch {
                    expected,
                    actual: *total_notifications,
                });
            }
        }
        Ok(())
    }

    /// Serialize the entire trace as JSONL.
    pub fn to_jsonl(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(&record.to_jsonl());
            out.push('\n');
        }
        out
    }

    /// Parse a JSONL trace. Blank lines are skipped.
    pub fn from_jsonl(input: &str) -> Result<Self, WebHostError> {
        let mut records = Vec::new();
        for (idx, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record = serde_json::from_str::<TraceRecord>(line).map_err(|e| {
                WebHostError::MalformedRecord {
                    line: idx + 1,
                    message: e.to_string(),
                }
            })?;
            records.push(record);
        }
        Ok(Self { records })
    }
}

/// Records a page session for deterministic replay.
#[derive(Debug)]
pub struct SessionRecorder {
    page: Page,
    records: Vec<TraceRecord>,
}

impl SessionRecorder {
    /// Start recording on a fresh page.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            page: Page::new(viewport),
            records: vec![TraceRecord::Header {
                schema_version: SCHEMA_VERSION.to_string(),
                viewport: viewport.into(),
            }],
        }
    }

    /// The page being recorded.
    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.page
    }

    fn now_ns(&self) -> u64 {
        duration_to_ns(self.page.now())
    }

    /// Insert an element, recording its current attributes.
    pub fn append(&mut self, element: TooltipElement) -> ElementId {
        let attributes = element
            .attributes()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let id = self.page.append(element);
        self.records.push(TraceRecord::Append {
            element: id.raw(),
            attributes,
        });
        id
    }

    /// Remove an element.
    pub fn remove(&mut self, id: ElementId) -> Result<TooltipElement, WebHostError> {
        let element = self.page.remove(id)?;
        self.records.push(TraceRecord::Remove { element: id.raw() });
        Ok(element)
    }

    /// Write or remove an attribute.
    pub fn set_attribute(
        &mut self,
        id: ElementId,
        name: &str,
        value: Option<&str>,
    ) -> Result<(), WebHostError> {
        let element = self.page.element_mut(id)?;
        match value {
            Some(value) => element.set_attribute(name, value),
            None => {
                element.remove_attribute(name);
            }
        }
        self.records.push(TraceRecord::Attribute {
            element: id.raw(),
            name: name.to_string(),
            value: value.map(str::to_string),
        });
        Ok(())
    }

    /// Report an element's layout.
    pub fn set_layout(
        &mut self,
        id: ElementId,
        anchor: Rect,
        content: Size,
    ) -> Result<(), WebHostError> {
        self.page.set_layout(id, anchor, content)?;
        self.records.push(TraceRecord::Layout {
            element: id.raw(),
            anchor: anchor.into(),
            content: content.into(),
        });
        Ok(())
    }

    /// Change the viewport.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.page.set_viewport(viewport);
        self.records.push(TraceRecord::Viewport {
            viewport: viewport.into(),
        });
    }

    /// Queue an input event.
    pub fn push_event(&mut self, target: Target, event: Event) -> Result<(), WebHostError> {
        let data = InputRecord::from(&event);
        self.page.push_event(target, event)?;
        let target = match target {
            Target::Element(id) => Some(id.raw()),
            Target::Document => None,
        };
        self.records.push(TraceRecord::Input {
            ts_ns: self.now_ns(),
            target,
            data,
        });
        Ok(())
    }

    /// Imperative show.
    pub fn show(&mut self, id: ElementId) -> Result<(), WebHostError> {
        self.page.show(id)?;
        self.records.push(TraceRecord::Show {
            ts_ns: self.now_ns(),
            element: id.raw(),
        });
        Ok(())
    }

    /// Imperative hide.
    pub fn hide(&mut self, id: ElementId) -> Result<(), WebHostError> {
        self.page.hide(id)?;
        self.records.push(TraceRecord::Hide {
            ts_ns: self.now_ns(),
            element: id.raw(),
        });
        Ok(())
    }

    /// Advance time by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.page.advance_time(dt);
        self.records.push(TraceRecord::Tick {
            ts_ns: self.now_ns(),
        });
    }

    /// Step the page and record what it produced.
    pub fn step(&mut self) -> StepResult {
        let result = self.page.step();
        self.records.push(TraceRecord::Step {
            ts_ns: duration_to_ns(result.now),
        });
        self.records.extend(
            result
                .notifications
                .iter()
                .map(|n| TraceRecord::Notification(n.into())),
        );
        result
    }

    /// Finish recording and return the completed trace.
    pub fn finish(mut self) -> SessionTrace {
        let total_notifications = self
            .records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Notification(_)))
            .count() as u64;
        self.records.push(TraceRecord::Summary {
            total_notifications,
        });
        debug!(
            target: "tipkit::web",
            records = self.records.len(),
            total_notifications,
            "session recorded"
        );
        SessionTrace {
            records: self.records,
        }
    }
}

/// Result of replaying a session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    /// Notifications produced by the replay.
    pub total_notifications: u64,
    /// First position where recorded and replayed notifications differ.
    pub first_mismatch: Option<ReplayMismatch>,
}

impl ReplayResult {
    /// Whether the replay produced identical notifications.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

/// Description of a notification mismatch during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayMismatch {
    /// Position in the notification sequence.
    pub index: usize,
    /// Recorded notification, if the trace has one at this position.
    pub expected: Option<NotificationRecord>,
    /// Replayed notification, if the replay produced one at this position.
    pub actual: Option<NotificationRecord>,
}

/// Errors that can occur during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The trace violates structural invariants.
    InvalidTrace(TraceValidationError),
    /// A host error occurred during replay.
    Host(WebHostError),
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTrace(e) => write!(f, "invalid trace: {e}"),
            Self::Host(e) => write!(f, "host error: {e}"),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidTrace(e) => Some(e),
            Self::Host(e) => Some(e),
        }
    }
}

impl From<WebHostError> for ReplayError {
    fn from(e: WebHostError) -> Self {
        Self::Host(e)
    }
}

impl From<TraceValidationError> for ReplayError {
    fn from(e: TraceValidationError) -> Self {
        Self::InvalidTrace(e)
    }
}

/// Replay a recorded trace through a fresh page.
pub fn replay(trace: &SessionTrace) -> Result<ReplayResult, ReplayError> {
    trace.validate()?;

    let mut page: Option<Page> = None;
    let mut ids: HashMap<u32, ElementId> = HashMap::new();
    let mut actual: Vec<NotificationRecord> = Vec::new();

    let lookup = |ids: &HashMap<u32, ElementId>, raw: u32| {
        ids.get(&raw)
            .copied()
            .ok_or(WebHostError::UnknownElement(ElementId::from_raw(raw)))
    };

    for record in &trace.records {
        if let TraceRecord::Header { viewport, .. } = record {
            page = Some(Page::new((*viewport).into()));
            continue;
        }
        let Some(page) = page.as_mut() else {
            return Err(TraceValidationError::HeaderNotFirst.into());
        };
        match record {
            TraceRecord::Header { .. } | TraceRecord::Summary { .. } => {}
            TraceRecord::Append {
                element,
                attributes,
            } => {
                let el = attributes
                    .iter()
                    .fold(TooltipElement::new(), |el, (name, value)| {
                        el.attribute(name, value.as_str())
                    });
                ids.insert(*element, page.append(el));
            }
            TraceRecord::Remove { element } => {
                let id = lookup(&ids, *element)?;
                page.remove(id)?;
                ids.remove(element);
            }
            TraceRecord::Attribute {
                element,
                name,
                value,
            } => {
                let el = page.element_mut(lookup(&ids, *element)?)?;
                match value {
                    Some(value) => el.set_attribute(name, value.as_str()),
                    None => {
                        el.remove_attribute(name);
                    }
                }
            }
            TraceRecord::Layout {
                element,
                anchor,
                content,
            } => {
                page.set_layout(lookup(&ids, *element)?, (*anchor).into(), (*content).into())?;
            }
            TraceRecord::Viewport { viewport } => page.set_viewport((*viewport).into()),
            TraceRecord::Input { target, data, .. } => {
                let target = match target {
                    Some(raw) => Target::Element(lookup(&ids, *raw)?),
                    None => Target::Document,
                };
                page.push_event(target, Event::from(data))?;
            }
            TraceRecord::Show { element, .. } => page.show(lookup(&ids, *element)?)?,
            TraceRecord::Hide { element, .. } => page.hide(lookup(&ids, *element)?)?,
            TraceRecord::Tick { ts_ns } => page.set_time(Duration::from_nanos(*ts_ns)),
            TraceRecord::Step { .. } => {
                let result = page.step();
                actual.extend(result.notifications.iter().map(NotificationRecord::from));
            }
            TraceRecord::Notification(_) => {}
        }
    }

    let expected: Vec<&NotificationRecord> = trace.notifications().collect();
    let len = expected.len().max(actual.len());
    let first_mismatch = (0..len).find_map(|index| {
        let e = expected.get(index).copied();
        let a = actual.get(index);
        (e != a).then(|| ReplayMismatch {
            index,
            expected: e.cloned(),
            actual: a.cloned(),
        })
    });

    info!(
        target: "tipkit::web",
        total_notifications = actual.len() as u64,
        ok = first_mismatch.is_none(),
        "replay finished"
    );

    Ok(ReplayResult {
        total_notifications: actual.len() as u64,
        first_mismatch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn recorded_session() -> SessionTrace {
        let mut rec = SessionRecorder::new(Size::new(800, 600));
        let a = rec.append(
            TooltipElement::new()
                .attribute("delay", "300")
                .attribute("position", "top"),
        );
        let b = rec.append(TooltipElement::new());
        rec.set_layout(a, Rect::new(100, 5, 16, 16), Size::new(120, 30))
            .expect("attached");

        rec.push_event(Target::Element(a), Event::pointer_enter())
            .expect("attached");
        rec.step();
        rec.advance_time(ms(300));
        rec.step();
        rec.push_event(Target::Element(b), Event::touch(HitTarget::Trigger))
            .expect("attached");
        rec.step();
        rec.advance_time(ms(200));
        rec.step();
        rec.set_attribute(b, "disabled", Some("")).expect("attached");
        rec.push_event(Target::Element(b), Event::key(KeyCode::Escape))
            .expect("attached");
        rec.step();
        rec.advance_time(ms(100));
        rec.step();
        rec.finish()
    }

    // ── Recording ─────────────────────────────────────────────────────

    #[test]
    fn recorder_captures_notifications() {
        let trace = recorded_session();
        assert_eq!(trace.validate(), Ok(()));
        let names: Vec<(u32, &str)> = trace
            .notifications()
            .map(|n| (n.element, n.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                (0, "tooltip-show"),
                (0, "tooltip-hide"),
                (1, "tooltip-show"),
                (1, "tooltip-hide"),
            ]
        );
    }

    #[test]
    fn jsonl_lines_are_tagged() {
        let trace = recorded_session();
        let jsonl = trace.to_jsonl();
        let first = jsonl.lines().next().expect("header line");
        assert!(first.contains(r#""event":"header""#));
        assert!(first.contains(SCHEMA_VERSION));
        assert!(jsonl.contains(r#""kind":"pointer_enter""#));
        assert!(jsonl.contains(r#""name":"tooltip-show""#));
        assert!(jsonl.lines().last().is_some_and(|l| l.contains("summary")));
    }

    #[test]
    fn jsonl_parses_back() {
        let trace = recorded_session();
        let parsed = SessionTrace::from_jsonl(&trace.to_jsonl()).expect("valid jsonl");
        assert_eq!(parsed, trace);
    }

    #[test]
    fn malformed_line_reports_line_number() {
        let input = format!(
            "{}\n\n{{\"event\":\"tick\"}}\n",
            TraceRecord::Tick { ts_ns: 0 }.to_jsonl()
        );
        match SessionTrace::from_jsonl(&input) {
            Err(WebHostError::MalformedRecord { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    // ── Replay ────────────────────────────────────────────────────────

    #[test]
    fn replay_matches_recording() {
        let trace = recorded_session();
        let result = replay(&trace).expect("valid trace");
        assert!(result.ok(), "mismatch: {:?}", result.first_mismatch);
        assert_eq!(result.total_notifications, 4);
    }

    #[test]
    fn replay_detects_tampering() {
        let mut trace = recorded_session();
        for record in &mut trace.records {
            if let TraceRecord::Notification(n) = record {
                n.ts_ns += 1;
                break;
            }
        }
        let result = replay(&trace).expect("valid trace");
        assert!(!result.ok());
        let mismatch = result.first_mismatch.expect("mismatch");
        assert_eq!(mismatch.index, 0);
        assert_eq!(mismatch.actual.map(|n| n.ts_ns), Some(300_000_000));
    }

    #[test]
    fn replay_rejects_invalid_traces() {
        assert_eq!(
            replay(&SessionTrace::default()),
            Err(ReplayError::InvalidTrace(TraceValidationError::EmptyTrace))
        );

        let mut trace = recorded_session();
        trace.records.pop();
        assert_eq!(
            trace.validate(),
            Err(TraceValidationError::MissingSummary)
        );

        let mut trace = recorded_session();
        trace.records.remove(0);
        assert_eq!(trace.validate(), Err(TraceValidationError::MissingHeader));

        let mut trace = recorded_session();
        if let Some(TraceRecord::Summary {
            total_notifications,
        }) = trace.records.last_mut()
        {
            *total_notifications = 9;
        }
        assert_eq!(
            trace.validate(),
            Err(TraceValidationError::SummaryCountMismatch {
                expected: 4,
                actual: 9
            })
        );
    }

    #[test]
    fn replay_reports_unknown_elements() {
        let trace = SessionTrace {
            records: vec![
                TraceRecord::Header {
                    schema_version: SCHEMA_VERSION.to_string(),
                    viewport: Size::new(10, 10).into(),
                },
                TraceRecord::Show {
                    ts_ns: 0,
                    element: 7,
                },
                TraceRecord::Summary {
                    total_notifications: 0,
                },
            ],
        };
        assert_eq!(
            replay(&trace),
            Err(ReplayError::Host(WebHostError::UnknownElement(
                ElementId::from_raw(7)
            )))
        );
    }

    // ── Input conversion ──────────────────────────────────────────────

    #[test]
    fn key_records_use_dom_names() {
        let event = Event::Key(
            KeyEvent::new(KeyCode::Escape)
                .with_modifiers(Modifiers::SHIFT)
                .with_kind(KeyEventKind::Repeat),
        );
        let record = InputRecord::from(&event);
        assert_eq!(
            record,
            InputRecord::Key {
                key: "Escape".to_string(),
                modifiers: Modifiers::SHIFT.bits(),
                event_kind: "repeat".to_string(),
            }
        );
        assert_eq!(Event::from(&record), event);
        assert_eq!(
            Event::from(&InputRecord::from(&Event::key(KeyCode::Space))),
            Event::key(KeyCode::Space)
        );
    }
}
