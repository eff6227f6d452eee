//! Property-based invariant tests for the tooltip controller.
//!
//! These hold for **any** sequence of inputs and clock advances:
//!
//! 1. A deadline is pending exactly when the phase is a pending phase.
//! 2. Notifications strictly alternate, starting with `tooltip-show`, and
//!    the last one always agrees with rendered visibility.
//! 3. A tooltip disabled for its whole life never shows.
//! 4. Hover bursts shorter than the activation delay never show.
//! 5. Placement resolution never rewrites the configured placement, and
//!    flips only when the requested side overflows.
//! 6. Repeating an input at the same instant changes nothing.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use proptest::prelude::*;
use tipkit_core::event::{Event, HitTarget, KeyCode};
use tipkit_core::geometry::{LayoutMetrics, Rect, Size};
use tipkit_widgets::tooltip::{
    NotificationKind, Placement, TooltipConfig, TooltipController, TooltipPhase, placement,
};

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Op {
    Input(Event),
    Show,
    Hide,
    Wait(u64),
    Disable(bool),
    Delay(u64),
    Position(Placement),
}

fn placement_strategy() -> impl Strategy<Value = Placement> {
    prop_oneof![Just(Placement::Top), Just(Placement::Bottom)]
}

fn metrics_strategy() -> impl Strategy<Value = LayoutMetrics> {
    (
        -50i32..700,
        0i32..800,
        1u32..60,
        1u32..200,
        1u32..120,
        100u32..900,
    )
        .prop_map(|(y, x, anchor, w, h, vh)| {
            LayoutMetrics::new(Rect::new(x, y, anchor, anchor), Size::new(w, h), Size::new(800, vh))
        })
}

fn event_strategy() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::pointer_enter()),
        Just(Event::pointer_leave()),
        Just(Event::Focus(true)),
        Just(Event::Focus(false)),
        Just(Event::touch(HitTarget::Trigger)),
        Just(Event::touch(HitTarget::Component)),
        Just(Event::touch(HitTarget::Outside)),
        Just(Event::key(KeyCode::Escape)),
        Just(Event::key(KeyCode::Enter)),
        metrics_strategy().prop_map(Event::Resize),
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => event_strategy().prop_map(Op::Input),
        1 => Just(Op::Show),
        1 => Just(Op::Hide),
        4 => (0u64..400).prop_map(Op::Wait),
        1 => any::<bool>().prop_map(Op::Disable),
        1 => (0u64..500).prop_map(Op::Delay),
        1 => placement_strategy().prop_map(Op::Position),
    ]
}

struct Harness {
    tip: TooltipController,
    now: Duration,
    log: Rc<RefCell<Vec<NotificationKind>>>,
}

impl Harness {
    fn new(config: TooltipConfig) -> Self {
        let mut tip = TooltipController::new(config);
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        tip.subscribe(move |n| sink.borrow_mut().push(n.kind));
        tip.connect();
        Self {
            tip,
            now: Duration::ZERO,
            log,
        }
    }

    fn apply(&mut self, op: &Op) {
        match op {
            Op::Input(event) => self.tip.handle_event(event, self.now),
            Op::Show => self.tip.show(self.now),
            Op::Hide => self.tip.hide(self.now),
            Op::Wait(ms) => {
                self.now += Duration::from_millis(*ms);
                self.tip.advance(self.now);
            }
            Op::Disable(disabled) => self.tip.set_disabled(*disabled),
            Op::Delay(ms) => self.tip.set_activation_delay_ms(*ms),
            Op::Position(p) => self.tip.set_placement(*p),
        }
        // Hosts fire elapsed deadlines after every input, like `Page::step`.
        self.tip.advance(self.now);
    }

    fn settle(&mut self) {
        self.now += Duration::from_secs(10);
        self.tip.advance(self.now);
    }
}

// ── Invariants ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn deadline_pending_iff_pending_phase(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut h = Harness::new(TooltipConfig::default());
        for op in &ops {
            h.apply(op);
            let pending = matches!(
                h.tip.phase(),
                TooltipPhase::PendingShow | TooltipPhase::PendingHide
            );
            prop_assert_eq!(h.tip.next_deadline().is_some(), pending);
            prop_assert_eq!(h.tip.is_visible(), h.tip.phase().is_visible());
        }
    }

    #[test]
    fn notifications_alternate_and_match_visibility(
        ops in prop::collection::vec(op_strategy(), 0..64),
    ) {
        let mut h = Harness::new(TooltipConfig::default());
        for op in &ops {
            h.apply(op);
        }
        h.settle();

        let log = h.log.borrow();
        for (i, kind) in log.iter().enumerate() {
            let expected = if i % 2 == 0 { NotificationKind::Shown } else { NotificationKind::Hidden };
            prop_assert_eq!(*kind, expected);
        }
        let last_shown = log.last() == Some(&NotificationKind::Shown);
        prop_assert_eq!(last_shown, h.tip.is_visible());
    }

    #[test]
    fn permanently_disabled_never_shows(
        ops in prop::collection::vec(op_strategy(), 0..64),
    ) {
        let mut h = Harness::new(TooltipConfig::default().disabled(true));
        for op in ops.iter().filter(|op| !matches!(op, Op::Disable(_))) {
            h.apply(op);
            prop_assert!(!h.tip.is_visible());
        }
        h.settle();
        prop_assert!(h.log.borrow().is_empty());
    }

    #[test]
    fn short_hover_bursts_never_show(
        delay in 1u64..1_000,
        bursts in prop::collection::vec((0u64..1_000, 0u64..2_000), 1..16),
    ) {
        let mut h = Harness::new(TooltipConfig::default().activation_delay_ms(delay));
        for (hover, rest) in bursts {
            let hover = hover % delay;
            h.apply(&Op::Input(Event::pointer_enter()));
            h.apply(&Op::Wait(hover));
            h.apply(&Op::Input(Event::pointer_leave()));
            h.apply(&Op::Wait(rest));
        }
        h.settle();
        prop_assert!(h.log.borrow().is_empty());
    }

    #[test]
    fn configured_placement_survives_resolution(
        requested in placement_strategy(),
        metrics in metrics_strategy(),
    ) {
        let mut h = Harness::new(TooltipConfig::default().placement(requested));
        h.apply(&Op::Input(Event::Resize(metrics)));
        h.apply(&Op::Show);
        h.settle();

        prop_assert_eq!(h.tip.placement(), requested);
        let measured = placement::content_box(requested, &metrics);
        let overflows = match requested {
            Placement::Top => measured.top() < 0,
            Placement::Bottom => measured.bottom() > metrics.viewport.height as i32,
        };
        let expected = if overflows { requested.flipped() } else { requested };
        prop_assert_eq!(h.tip.effective_placement(), expected);
    }

    #[test]
    fn repeated_input_is_idempotent(
        prefix in prop::collection::vec(op_strategy(), 0..32),
        op in op_strategy().prop_filter("time must not move", |op| !matches!(op, Op::Wait(_))),
    ) {
        let mut h = Harness::new(TooltipConfig::default());
        for p in &prefix {
            h.apply(p);
        }
        h.apply(&op);
        let phase = h.tip.phase();
        let deadline = h.tip.next_deadline();
        let placement = h.tip.effective_placement();

        h.apply(&op);
        prop_assert_eq!(h.tip.phase(), phase);
        prop_assert_eq!(h.tip.next_deadline(), deadline);
        prop_assert_eq!(h.tip.effective_placement(), placement);
    }
}
