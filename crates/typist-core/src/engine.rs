#![forbid(unsafe_code)]

//! The typing engine: state machine + single-slot scheduler + visibility gate.
//!
//! A [`TypingEngine`] owns everything one animated text region needs. The host
//! drives it cooperatively:
//!
//! ```ignore
//! use std::time::Duration;
//! use typist_core::{TypingConfig, TypingEngine};
//!
//! let mut engine = TypingEngine::new(TypingConfig::new(["Hello", "World"]))?;
//! engine.on_render(|snap| println!("{}", snap.line()));
//! loop {
//!     let wait = engine.time_until_next().unwrap_or(Duration::from_millis(16));
//!     std::thread::sleep(wait);
//!     engine.advance(wait);
//! }
//! ```
//!
//! # Lifecycle
//!
//! - **Activation** happens on construction, or on the first [`observe`]
//!   that finds the region visible when `start_on_visible` is set. It resets
//!   the state and schedules the first keystroke after
//!   `initial_delay + keystroke`.
//! - **Reconfiguration** with a configuration that differs in any field
//!   cancels the pending tick, resets the state and activates again (at once
//!   if the region has already been seen).
//! - **Disposal** ([`dispose`] or drop) cancels the pending tick and stops
//!   observing. A disposed engine ignores further input.
//!
//! # Invariants
//!
//! 1. At most one tick is pending at any time.
//! 2. Every fired tick applies exactly one [`step`](crate::machine::step),
//!    notifies the render listener once, then schedules at most one tick.
//! 3. No tick is pending once the state is complete or the engine is disposed.
//! 4. Configuration errors are returned before any state is touched.
//!
//! [`observe`]: TypingEngine::observe
//! [`dispose`]: TypingEngine::dispose

use std::fmt;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{ConfigError, Timing, TypingConfig};
use crate::geometry::Rect;
use crate::machine::{self, EngineState, Phase, Wait};
use crate::scheduler::Scheduler;
use crate::script::{Script, Sentence};
use crate::snapshot::{self, RenderSnapshot};
use crate::visibility::{GateState, VisibilityGate, VisibilityObserver};

/// Upper bound on ticks fired by one [`TypingEngine::advance`] call.
///
/// Only reachable with long runs of zero-length waits. The remaining ticks
/// stay overdue, and the unspent part of the advance is carried into the next
/// call, so the clock catches up once the backlog drains.
pub const MAX_TICKS_PER_ADVANCE: usize = 10_000;

/// Lifecycle notifications, queued for [`TypingEngine::drain_events`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The state machine was armed.
    Activated,
    /// A sentence finished (deleted, or typed for the final time).
    SentenceComplete {
        /// Index in the configured sequence.
        index: usize,
        /// The sentence as configured.
        text: String,
    },
    /// The animation reached its terminal state.
    Completed,
    /// A new configuration replaced the old one.
    Reconfigured,
}

type SentenceHook = Box<dyn FnMut(&str, usize)>;
type RenderHook = Box<dyn FnMut(&RenderSnapshot<'_>)>;

/// A sequential type/delete text animation.
pub struct TypingEngine {
    config: TypingConfig,
    timing: Timing,
    script: Script,
    state: EngineState,
    scheduler: Scheduler<Wait>,
    gate: VisibilityGate,
    region: Rect,
    rng: SmallRng,
    events: Vec<EngineEvent>,
    on_sentence_complete: Option<SentenceHook>,
    on_render: Option<RenderHook>,
    ticks: u64,
    overdue: Duration,
    disposed: bool,
}

impl fmt::Debug for TypingEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypingEngine")
            .field("state", &self.state)
            .field("now", &self.scheduler.now())
            .field("pending", &self.scheduler.pending_count())
            .field("gate", &self.gate.state())
            .field("ticks", &self.ticks)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl TypingEngine {
    /// Create and activate an engine.
    ///
    /// Without an observer the host cannot report visibility, so
    /// `start_on_visible` degrades to immediate activation.
    pub fn new(config: TypingConfig) -> Result<Self, ConfigError> {
        Self::build(config, None)
    }

    /// Create an engine whose activation is gated by `observer` when the
    /// configuration sets `start_on_visible`.
    pub fn with_observer(
        config: TypingConfig,
        observer: impl VisibilityObserver + 'static,
    ) -> Result<Self, ConfigError> {
        Self::build(config, Some(Box::new(observer)))
    }

    fn build(
        config: TypingConfig,
        observer: Option<Box<dyn VisibilityObserver>>,
    ) -> Result<Self, ConfigError> {
        let timing = config.validate()?;
        let gate = match observer {
            Some(observer) if config.start_on_visible => VisibilityGate::observing(observer),
            _ => VisibilityGate::bypassed(),
        };
        let mut engine = Self {
            script: Script::new(&config.sequence, config.reverse_text),
            rng: seeded_rng(config.seed),
            config,
            timing,
            state: EngineState::awaiting(),
            scheduler: Scheduler::new(),
            gate,
            region: Rect::default(),
            events: Vec::new(),
            on_sentence_complete: None,
            on_render: None,
            ticks: 0,
            overdue: Duration::ZERO,
            disposed: false,
        };
        if engine.gate.is_open() {
            engine.activate();
        } else {
            crate::debug!("typing engine waiting for visibility");
        }
        Ok(engine)
    }

    /// Call `hook(text, index)` whenever a sentence finishes.
    pub fn on_sentence_complete(&mut self, hook: impl FnMut(&str, usize) + 'static) {
        self.on_sentence_complete = Some(Box::new(hook));
    }

    /// Call `hook` with the render snapshot after every tick.
    pub fn on_render(&mut self, hook: impl FnMut(&RenderSnapshot<'_>) + 'static) {
        self.on_render = Some(Box::new(hook));
    }
}

fn seeded_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    }
}

// ---------------------------------------------------------------------------
// Driving
// ---------------------------------------------------------------------------

impl TypingEngine {
    /// Report where the output region is. Activates the engine the first time
    /// the region is sufficiently visible; returns whether that happened.
    pub fn observe(&mut self, region: Rect) -> bool {
        self.region = region;
        if self.disposed || !self.gate.check(region) {
            return false;
        }
        self.activate();
        true
    }

    /// Advance the clock by `dt`, firing every tick that comes due, in order.
    /// Returns the number of ticks fired.
    pub fn advance(&mut self, dt: Duration) -> usize {
        if self.disposed {
            return 0;
        }
        let target = self
            .scheduler
            .now()
            .saturating_add(std::mem::take(&mut self.overdue))
            .saturating_add(dt);
        let mut fired = 0;
        while let Some(wait) = self.scheduler.poll(target) {
            self.fire(wait);
            fired += 1;
            if fired >= MAX_TICKS_PER_ADVANCE {
                self.overdue = target.saturating_sub(self.scheduler.now());
                crate::warn!(
                    fired,
                    overdue_ms = u64::try_from(self.overdue.as_millis()).unwrap_or(u64::MAX),
                    "tick budget exhausted; deferring remaining ticks to the next advance"
                );
                break;
            }
        }
        fired
    }

    /// Replace the configuration.
    ///
    /// Returns `Ok(false)` when `config` equals the current one (nothing is
    /// reset) or the engine is disposed. An invalid configuration is rejected
    /// and the running animation is left untouched.
    pub fn reconfigure(&mut self, config: TypingConfig) -> Result<bool, ConfigError> {
        if self.disposed || config == self.config {
            return Ok(false);
        }
        let timing = config.validate()?;
        self.scheduler.cancel_all();

        let seen = self.state.visible;
        self.script = Script::new(&config.sequence, config.reverse_text);
        self.rng = seeded_rng(config.seed);
        self.timing = timing;
        self.config = config;
        self.events.push(EngineEvent::Reconfigured);
        crate::info!(
            sentences = self.script.len(),
            looping = self.config.looping,
            "typing engine reconfigured"
        );

        if seen || !self.config.start_on_visible || self.gate.is_open() {
            self.gate.disconnect();
            self.activate();
        } else {
            self.state = EngineState::awaiting();
        }
        Ok(true)
    }

    /// Start the current configuration over. Has no effect before activation
    /// or after disposal.
    pub fn restart(&mut self) {
        if !self.disposed && self.state.visible {
            self.activate();
        }
    }

    /// Cancel the pending tick and stop observing visibility.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let canceled = self.scheduler.cancel_all();
        self.gate.disconnect();
        self.overdue = Duration::ZERO;
        self.disposed = true;
        let stats = self.scheduler.stats();
        crate::debug!(
            canceled,
            scheduled = stats.scheduled,
            fired = stats.fired,
            discarded = stats.canceled,
            "typing engine disposed"
        );
    }

    fn activate(&mut self) {
        self.scheduler.cancel_all();
        self.state = EngineState::armed();
        let delay = self
            .timing
            .initial_delay
            .saturating_add(self.keystroke_delay());
        self.scheduler.schedule(delay, Wait::Keystroke);
        self.events.push(EngineEvent::Activated);
        crate::info!(
            sentences = self.script.len(),
            first_tick_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "typing engine activated"
        );
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn fire(&mut self, wait: Wait) {
        let transition = machine::step(&self.state, &self.script, self.config.looping);
        self.state = transition.state;
        self.ticks += 1;
        crate::trace!(
            after = ?wait,
            phase = ?self.state.phase,
            sentence = self.state.sentence_index,
            revealed = self.state.revealed,
            "tick"
        );

        if let Some(index) = transition.finished {
            self.finish_sentence(index);
        }
        if self.state.complete {
            self.events.push(EngineEvent::Completed);
            crate::info!(ticks = self.ticks, "typing engine completed");
        }

        let snap = snapshot::assemble(&self.config, &self.script, &self.state);
        if let Some(hook) = self.on_render.as_mut() {
            hook(&snap);
        }

        if let Some(next) = transition.wait {
            let delay = self.delay_for(next);
            self.scheduler.schedule(delay, next);
        }
    }

    fn finish_sentence(&mut self, index: usize) {
        let text = self.script.get(index).map_or("", Sentence::source);
        crate::debug!(index, "sentence complete");
        if let Some(hook) = self.on_sentence_complete.as_mut() {
            hook(text, index);
        }
        self.events.push(EngineEvent::SentenceComplete {
            index,
            text: text.to_owned(),
        });
    }

    fn delay_for(&mut self, wait: Wait) -> Duration {
        match wait {
            Wait::Keystroke => self.keystroke_delay(),
            Wait::Erase => self.timing.deleting,
            Wait::Pause => self.timing.pause,
        }
    }

    fn keystroke_delay(&mut self) -> Duration {
        match self.timing.variable {
            Some((min, max)) => Duration::from_millis(self.rng.random_range(min..=max)),
            None => self.timing.typing,
        }
    }
}

// ---------------------------------------------------------------------------
// Inspection
// ---------------------------------------------------------------------------

impl TypingEngine {
    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &TypingConfig {
        &self.config
    }

    /// Normalized timing of the active configuration.
    #[must_use]
    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// The prepared sentences.
    #[must_use]
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Whether the animation has finished for good.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.complete
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Text currently on screen.
    #[must_use]
    pub fn displayed_text(&self) -> &str {
        self.snapshot().text
    }

    /// The current render snapshot.
    #[must_use]
    pub fn snapshot(&self) -> RenderSnapshot<'_> {
        snapshot::assemble(&self.config, &self.script, &self.state)
    }

    /// Whether the cursor is in the "on" half of its blink cycle.
    #[must_use]
    pub fn cursor_blink_on(&self) -> bool {
        snapshot::blink_on(self.scheduler.now(), self.timing.cursor_blink)
    }

    /// Number of pending ticks (0 or 1).
    #[must_use]
    pub fn pending_ticks(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Time until the next tick, if one is pending.
    #[must_use]
    pub fn time_until_next(&self) -> Option<Duration> {
        self.scheduler.time_until_due()
    }

    /// Engine clock: total time advanced so far, less any time still owed to
    /// a tick backlog (see [`MAX_TICKS_PER_ADVANCE`]).
    #[must_use]
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Ticks fired since construction.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Visibility gate state.
    #[must_use]
    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    /// Last region reported through [`observe`](Self::observe).
    #[must_use]
    pub fn region(&self) -> Rect {
        self.region
    }

    /// Take all queued lifecycle events.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Drop for TypingEngine {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::AlwaysVisible;
    use std::cell::RefCell;
    use std::rc::Rc;

    const MS_5: Duration = Duration::from_millis(5);
    const MS_10: Duration = Duration::from_millis(10);

    #[test]
    fn construction_activates_and_schedules_first_keystroke() {
        let engine = TypingEngine::new(
            TypingConfig::new(["Hi"]).typing_speed(10).initial_delay(100),
        )
        .unwrap();
        assert_eq!(engine.phase(), Phase::InitialDelay);
        assert_eq!(engine.pending_ticks(), 1);
        assert_eq!(engine.time_until_next(), Some(Duration::from_millis(110)));
        assert_eq!(engine.displayed_text(), "");
    }

    #[test]
    fn empty_sequence_fails_fast() {
        let err = TypingEngine::new(TypingConfig::new(Vec::<String>::new())).unwrap_err();
        assert_eq!(err, ConfigError::EmptySequence);
    }

    #[test]
    fn inverted_range_fails_fast() {
        let err = TypingEngine::new(TypingConfig::new(["x"]).variable_speed(9, 1)).unwrap_err();
        assert!(matches!(err, ConfigError::InvertedSpeedRange { .. }));
    }

    #[test]
    fn zero_advance_still_fires_due_zero_delay_tick() {
        let mut engine =
            TypingEngine::new(TypingConfig::new(["ab"]).typing_speed(0).looping(false)).unwrap();
        assert_eq!(engine.displayed_text(), "");
        assert_eq!(engine.advance(Duration::ZERO), 2);
        assert_eq!(engine.displayed_text(), "ab");
        assert!(engine.is_complete());
    }

    #[test]
    fn render_listener_sees_every_tick() {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let sink = frames.clone();
        let mut engine =
            TypingEngine::new(TypingConfig::new(["abc"]).typing_speed(10).looping(false)).unwrap();
        engine.on_render(move |snap| sink.borrow_mut().push(snap.text.to_string()));
        engine.advance(Duration::from_secs(1));
        assert_eq!(*frames.borrow(), vec!["a", "ab", "abc"]);
    }

    #[test]
    fn sentence_hook_receives_source_text() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut engine = TypingEngine::new(
            TypingConfig::new(["ab", "cd"])
                .reverse_text(true)
                .typing_speed(1)
                .deleting_speed(1)
                .pause_after_sentence(1)
                .looping(false),
        )
        .unwrap();
        engine.on_sentence_complete(move |text, index| {
            sink.borrow_mut().push((text.to_string(), index));
        });
        engine.advance(Duration::from_secs(1));
        assert_eq!(
            *seen.borrow(),
            vec![("ab".to_string(), 0), ("cd".to_string(), 1)]
        );
        assert_eq!(engine.displayed_text(), "dc");
    }

    #[test]
    fn events_queue_lifecycle() {
        let mut engine =
            TypingEngine::new(TypingConfig::new(["a"]).typing_speed(1).looping(false)).unwrap();
        engine.advance(MS_10);
        assert_eq!(
            engine.drain_events(),
            vec![
                EngineEvent::Activated,
                EngineEvent::SentenceComplete {
                    index: 0,
                    text: "a".into()
                },
                EngineEvent::Completed,
            ]
        );
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn gated_engine_waits_for_observation() {
        let mut engine = TypingEngine::with_observer(
            TypingConfig::new(["x"]).start_on_visible(true).typing_speed(1),
            AlwaysVisible,
        )
        .unwrap();
        assert_eq!(engine.phase(), Phase::AwaitingVisibility);
        assert_eq!(engine.pending_ticks(), 0);
        assert_eq!(engine.advance(Duration::from_secs(5)), 0);

        assert!(engine.observe(Rect::new(0, 0, 1, 1)));
        assert_eq!(engine.pending_ticks(), 1);
        assert!(!engine.observe(Rect::new(0, 0, 1, 1)));
        assert_eq!(engine.gate_state(), GateState::Triggered);
    }

    #[test]
    fn gated_without_observer_starts_immediately() {
        let engine = TypingEngine::new(TypingConfig::new(["x"]).start_on_visible(true)).unwrap();
        assert_eq!(engine.phase(), Phase::InitialDelay);
        assert_eq!(engine.gate_state(), GateState::Bypassed);
    }

    #[test]
    fn reconfigure_same_config_is_noop() {
        let config = TypingConfig::new(["abc"]).typing_speed(10);
        let mut engine = TypingEngine::new(config.clone()).unwrap();
        engine.advance(Duration::from_millis(20));
        assert_eq!(engine.reconfigure(config), Ok(false));
        assert_eq!(engine.displayed_text(), "ab");
    }

    #[test]
    fn reconfigure_resets_and_keeps_one_pending_tick() {
        let mut engine = TypingEngine::new(TypingConfig::new(["abc"]).typing_speed(10)).unwrap();
        engine.advance(Duration::from_millis(15));
        assert_eq!(engine.displayed_text(), "a");

        assert_eq!(
            engine.reconfigure(TypingConfig::new(["abc"]).typing_speed(5)),
            Ok(true)
        );
        assert_eq!(engine.pending_ticks(), 1);
        assert_eq!(engine.displayed_text(), "");
        assert_eq!(engine.time_until_next(), Some(MS_5));
    }

    #[test]
    fn invalid_reconfigure_keeps_running_animation() {
        let mut engine = TypingEngine::new(TypingConfig::new(["abc"]).typing_speed(10)).unwrap();
        engine.advance(Duration::from_millis(10));
        let before = *engine.state();
        assert!(engine.reconfigure(TypingConfig::default()).is_err());
        assert_eq!(*engine.state(), before);
        assert_eq!(engine.pending_ticks(), 1);
    }

    #[test]
    fn dispose_cancels_and_silences() {
        let mut engine = TypingEngine::new(TypingConfig::new(["abc"])).unwrap();
        engine.dispose();
        assert!(engine.is_disposed());
        assert_eq!(engine.pending_ticks(), 0);
        assert_eq!(engine.advance(Duration::from_secs(10)), 0);
        assert_eq!(engine.reconfigure(TypingConfig::new(["x"])), Ok(false));
        engine.dispose();
    }

    #[test]
    fn restart_rearms_with_initial_delay() {
        let mut engine = TypingEngine::new(
            TypingConfig::new(["ab"])
                .typing_speed(10)
                .initial_delay(50)
                .looping(false),
        )
        .unwrap();
        engine.advance(Duration::from_secs(1));
        assert!(engine.is_complete());
        engine.restart();
        assert!(!engine.is_complete());
        assert_eq!(engine.time_until_next(), Some(Duration::from_millis(60)));
    }

    #[test]
    fn cursor_blinks_on_engine_clock() {
        let mut engine =
            TypingEngine::new(TypingConfig::new(["abc"]).cursor_blink(100).typing_speed(1000))
                .unwrap();
        assert!(engine.cursor_blink_on());
        engine.advance(Duration::from_millis(150));
        assert!(!engine.cursor_blink_on());
        engine.advance(Duration::from_millis(100));
        assert!(engine.cursor_blink_on());
    }

    #[test]
    fn all_zero_looping_timing_is_bounded() {
        let mut engine = TypingEngine::new(
            TypingConfig::new(["a", "b"])
                .typing_speed(0)
                .deleting_speed(0)
                .pause_after_sentence(0),
        )
        .unwrap();
        assert_eq!(engine.advance(Duration::from_millis(1)), MAX_TICKS_PER_ADVANCE);
        assert_eq!(engine.pending_ticks(), 1);
        assert!(!engine.is_complete());
    }

    #[test]
    fn exhausted_budget_carries_unspent_time_forward() {
        let long = "x".repeat(MAX_TICKS_PER_ADVANCE + MAX_TICKS_PER_ADVANCE / 2);
        let mut engine =
            TypingEngine::new(TypingConfig::new([long]).typing_speed(0).looping(false)).unwrap();

        assert_eq!(engine.advance(MS_10), MAX_TICKS_PER_ADVANCE);
        assert_eq!(engine.now(), Duration::ZERO);
        assert!(!engine.is_complete());

        assert_eq!(engine.advance(Duration::ZERO), MAX_TICKS_PER_ADVANCE / 2);
        assert!(engine.is_complete());
        assert_eq!(engine.now(), MS_10);
    }
}
