#![forbid(unsafe_code)]

//! tipkit demo.
//!
//! Builds a page with three tooltips and drives a short scripted session
//! against a deterministic clock: hover, keyboard focus and Escape, touch,
//! a disabled tooltip and a viewport resize. Every notification that
//! bubbles to the document is printed, along with the shadow markup of each
//! tooltip while it is open.

mod cli;

use std::error::Error;
use std::fs;
use std::process;
use std::time::Duration;

use tipkit_core::event::{Event, HitTarget, KeyCode};
use tipkit_core::geometry::{Rect, Size};
use tipkit_web::markup::host_open_tag;
use tipkit_web::session_record::{SessionRecorder, SessionTrace, replay};
use tipkit_web::{ElementId, SlotName, Target, TooltipElement};
use tipkit_widgets::tooltip::NotificationKind;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::Opts;

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env("TIPKIT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

/// Scripted host driving a recorded page.
struct Script {
    rec: SessionRecorder,
    seen: u64,
}

impl Script {
    fn input(&mut self, target: Target, event: Event) -> Result<(), Box<dyn Error>> {
        self.rec.push_event(target, event)?;
        self.step();
        Ok(())
    }

    fn wait(&mut self, ms: u64) {
        self.rec.advance_time(Duration::from_millis(ms));
        self.step();
    }

    fn step(&mut self) {
        let result = self.rec.step();
        for n in &result.notifications {
            self.seen += 1;
            info!(element = %n.element, event = n.kind.event_name(), "document notified");
            println!("t={:>5}ms  {}  {}", n.at.as_millis(), n.element, n.kind);
            if n.kind == NotificationKind::Shown
                && let Ok(el) = self.rec.page().element(n.element)
            {
                println!("    {}", host_open_tag(el));
                println!("      {}", el.shadow_markup());
            }
        }
    }
}

fn build(opts: &Opts) -> (Script, [ElementId; 3]) {
    let (width, height) = opts.viewport;
    let mut rec = SessionRecorder::new(Size::new(width, height));

    let save = rec.append(
        TooltipElement::new()
            .attribute("delay", opts.delay_ms.to_string())
            .attribute("position", opts.position.as_str())
            .slot(SlotName::Trigger, "<button>Save</button>")
            .slot(SlotName::Content, "Write all open buffers to disk"),
    );
    let help = rec.append(
        TooltipElement::new()
            .attribute("position", "bottom")
            .slot(SlotName::Content, "Press ? anywhere for shortcuts"),
    );
    let locked = rec.append(
        TooltipElement::new()
            .attribute("disabled", "")
            .slot(SlotName::Content, "You do not have access"),
    );

    let row = i32::try_from(height / 2).unwrap_or(i32::MAX);
    let bottom = i32::try_from(height.saturating_sub(24)).unwrap_or(i32::MAX);
    let layouts = [
        (save, Rect::new(120, row, 64, 24), Size::new(220, 32)),
        (help, Rect::new(240, bottom, 16, 16), Size::new(240, 32)),
        (locked, Rect::new(360, row, 16, 16), Size::new(180, 32)),
    ];
    for (id, anchor, content) in layouts {
        if let Err(err) = rec.set_layout(id, anchor, content) {
            warn!(element = %id, error = %err, "layout rejected");
        }
    }

    (Script { rec, seen: 0 }, [save, help, locked])
}

fn run(opts: &Opts) -> Result<(), Box<dyn Error>> {
    let (mut script, [save, help, locked]) = build(opts);

    info!(delay_ms = opts.delay_ms, position = %opts.position, "starting scripted session");

    println!("== hover the save button");
    script.input(Target::Element(save), Event::pointer_enter())?;
    script.wait(opts.delay_ms / 2);
    script.wait(opts.delay_ms - opts.delay_ms / 2);
    script.input(Target::Element(save), Event::pointer_leave())?;
    script.wait(100);

    println!("== focus help near the bottom edge, then Escape");
    script.input(Target::Element(help), Event::Focus(true))?;
    script.wait(200);
    script.input(Target::Element(help), Event::key(KeyCode::Escape))?;
    script.wait(100);

    println!("== touch the disabled tooltip");
    script.input(Target::Element(locked), Event::touch(HitTarget::Trigger))?;
    script.wait(1_000);

    println!("== touch help, then tap the page background");
    script.input(Target::Element(help), Event::touch(HitTarget::Trigger))?;
    script.wait(200);
    script
        .rec
        .set_viewport(Size::new(opts.viewport.0, opts.viewport.1.saturating_mul(2)));
    script.input(Target::Document, Event::touch(HitTarget::Outside))?;
    script.wait(100);

    let seen = script.seen;
    let trace = script.rec.finish();
    info!(notifications = seen, "session finished");

    if let Some(path) = &opts.record {
        fs::write(path, trace.to_jsonl())?;
        let reloaded = SessionTrace::from_jsonl(&fs::read_to_string(path)?)?;
        let result = replay(&reloaded)?;
        println!(
            "recorded {} records to {}; replay {}",
            reloaded.records.len(),
            path.display(),
            if result.ok() { "matches" } else { "DIVERGES" }
        );
        if let Some(mismatch) = result.first_mismatch {
            return Err(format!("replay diverged at notification {}", mismatch.index).into());
        }
    }

    Ok(())
}

fn main() {
    let opts = Opts::parse();
    init_tracing(opts.log_json);

    if let Err(err) = run(&opts) {
        eprintln!("tipkit-demo: {err}");
        process::exit(1);
    }
}
