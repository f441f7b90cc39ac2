#![forbid(unsafe_code)]

//! Visibility gate: one-shot activation when the output region is on screen.
//!
//! The host's notion of visibility is abstracted behind [`VisibilityObserver`].
//! A [`VisibilityGate`] asks the observer how much of the region is visible,
//! and the first time that reaches [`VISIBILITY_THRESHOLD`] it reports
//! activation and drops the observer. After that it never reports again.
//!
//! # Failure Modes
//!
//! - No observer, or an observer that returns `None`: the host cannot tell,
//!   so the region is treated as visible and activation is immediate.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::geometry::Rect;

/// Fraction of the region that must be visible to trigger activation.
pub const VISIBILITY_THRESHOLD: f32 = 0.1;

/// Host capability: how much of a region is currently visible.
pub trait VisibilityObserver {
    /// Visible fraction of `region` in [0.0, 1.0], or `None` when the host
    /// has no way to know.
    fn intersection_ratio(&self, region: Rect) -> Option<f32>;
}

/// Observer for headless hosts and tests: everything is visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysVisible;

impl VisibilityObserver for AlwaysVisible {
    fn intersection_ratio(&self, _region: Rect) -> Option<f32> {
        Some(1.0)
    }
}

/// Shared handle to the visible page area.
///
/// The host updates it on resize and scroll; observers read it when asked.
#[derive(Debug, Clone, Default)]
pub struct Viewport(Rc<Cell<Rect>>);

impl Viewport {
    /// Create a viewport covering `area`.
    #[must_use]
    pub fn new(area: Rect) -> Self {
        Self(Rc::new(Cell::new(area)))
    }

    /// Current visible area.
    #[must_use]
    pub fn area(&self) -> Rect {
        self.0.get()
    }

    /// Replace the visible area.
    pub fn set_area(&self, area: Rect) {
        self.0.set(area);
    }

    /// Move the visible area to page row `top`, keeping its size.
    pub fn scroll_to(&self, top: u16) {
        let mut area = self.0.get();
        area.y = top;
        self.0.set(area);
    }
}

/// Observer that intersects regions with a [`Viewport`].
#[derive(Debug, Clone)]
pub struct ViewportObserver {
    viewport: Viewport,
}

impl ViewportObserver {
    /// Observe regions against `viewport`.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }
}

impl VisibilityObserver for ViewportObserver {
    fn intersection_ratio(&self, region: Rect) -> Option<f32> {
        Some(region.coverage_by(&self.viewport.area()))
    }
}

/// Where a gate is in its one-shot lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Visibility is not required; activation is immediate.
    Bypassed,
    /// Waiting for the region to become visible.
    Observing,
    /// Activation has been reported; observation has stopped.
    Triggered,
    /// Torn down before triggering.
    Disconnected,
}

/// One-shot activation gate.
pub struct VisibilityGate {
    state: GateState,
    threshold: f32,
    observer: Option<Box<dyn VisibilityObserver>>,
}

impl fmt::Debug for VisibilityGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisibilityGate")
            .field("state", &self.state)
            .field("threshold", &self.threshold)
            .field("observing", &self.observer.is_some())
            .finish()
    }
}

impl VisibilityGate {
    /// A gate that never waits.
    #[must_use]
    pub fn bypassed() -> Self {
        Self {
            state: GateState::Bypassed,
            threshold: VISIBILITY_THRESHOLD,
            observer: None,
        }
    }

    /// A gate that waits until `observer` reports the region as visible.
    #[must_use]
    pub fn observing(observer: Box<dyn VisibilityObserver>) -> Self {
        Self {
            state: GateState::Observing,
            threshold: VISIBILITY_THRESHOLD,
            observer: Some(observer),
        }
    }

    #[cfg(test)]
    fn with_threshold(mut self, threshold: f32) -> Self {
        if threshold.is_finite() {
            self.threshold = threshold.clamp(0.0, 1.0);
        }
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> GateState {
        self.state
    }

    /// Whether activation may proceed (bypassed or already triggered).
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, GateState::Bypassed | GateState::Triggered)
    }

    #[cfg(test)]
    fn is_observing(&self) -> bool {
        self.observer.is_some()
    }

    /// Check `region` once. Returns `true` exactly once: on the observation
    /// that first finds the region sufficiently visible.
    pub fn check(&mut self, region: Rect) -> bool {
        if self.state != GateState::Observing {
            return false;
        }
        let ratio = self
            .observer
            .as_ref()
            .and_then(|observer| observer.intersection_ratio(region));
        let visible = match ratio {
            None => true,
            Some(r) => r >= self.threshold && r > 0.0,
        };
        if visible {
            self.state = GateState::Triggered;
            self.observer = None;
        }
        visible
    }

    /// Stop observing. A gate that already opened stays open.
    pub fn disconnect(&mut self) {
        self.observer = None;
        if self.state == GateState::Observing {
            self.state = GateState::Disconnected;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(Rc<Cell<Option<f32>>>);

    impl VisibilityObserver for Scripted {
        fn intersection_ratio(&self, _region: Rect) -> Option<f32> {
            self.0.get()
        }
    }

    fn region() -> Rect {
        Rect::new(0, 0, 10, 1)
    }

    #[test]
    fn bypassed_gate_is_open_and_never_fires() {
        let mut gate = VisibilityGate::bypassed();
        assert!(gate.is_open());
        assert!(!gate.check(region()));
    }

    #[test]
    fn fires_once_when_threshold_reached() {
        let ratio = Rc::new(Cell::new(Some(0.05)));
        let mut gate = VisibilityGate::observing(Box::new(Scripted(ratio.clone())));
        assert!(!gate.check(region()));
        assert!(!gate.is_open());

        ratio.set(Some(0.1));
        assert!(gate.check(region()));
        assert!(gate.is_open());
        assert!(!gate.is_observing());

        ratio.set(Some(1.0));
        assert!(!gate.check(region()));
        assert_eq!(gate.state(), GateState::Triggered);
    }

    #[test]
    fn unknown_visibility_degrades_to_immediate() {
        let mut gate = VisibilityGate::observing(Box::new(Scripted(Rc::new(Cell::new(None)))));
        assert!(gate.check(region()));
    }

    #[test]
    fn zero_threshold_still_needs_some_overlap() {
        let ratio = Rc::new(Cell::new(Some(0.0)));
        let mut gate =
            VisibilityGate::observing(Box::new(Scripted(ratio.clone()))).with_threshold(0.0);
        assert!(!gate.check(region()));
        ratio.set(Some(0.01));
        assert!(gate.check(region()));
    }

    #[test]
    fn disconnect_before_trigger() {
        let mut gate = VisibilityGate::observing(Box::new(AlwaysVisible));
        gate.disconnect();
        assert_eq!(gate.state(), GateState::Disconnected);
        assert!(!gate.is_observing());
        assert!(!gate.check(region()));
    }

    #[test]
    fn disconnect_after_trigger_stays_open() {
        let mut gate = VisibilityGate::observing(Box::new(AlwaysVisible));
        assert!(gate.check(region()));
        gate.disconnect();
        assert!(gate.is_open());
    }

    #[test]
    fn viewport_observer_tracks_scrolling() {
        let viewport = Viewport::new(Rect::from_size(80, 24));
        let observer = ViewportObserver::new(viewport.clone());
        let below_fold = Rect::new(0, 30, 40, 2);
        assert_eq!(observer.intersection_ratio(below_fold), Some(0.0));

        viewport.scroll_to(10);
        assert_eq!(observer.intersection_ratio(below_fold), Some(1.0));
    }
}
