#![forbid(unsafe_code)]

//! Typing state machine.
//!
//! [`step`] is the whole transition table: a pure function from the current
//! [`EngineState`] and the prepared [`Script`] to the next state, the kind of
//! wait that precedes the following tick, and the sentence (if any) that was
//! just finished. It performs no I/O, draws no random numbers and knows
//! nothing about clocks; the engine turns a [`Wait`] into a concrete delay.
//!
//! # Phases
//!
//! ```text
//! AwaitingVisibility -> InitialDelay -> Typing <-> Deleting
//!                                  \-> PauseAfterType / PauseAfterDelete
//!                                  \-> Completed (not looping, last sentence)
//! ```
//!
//! A pause phase names the wait that is in progress; the tick that ends it
//! performs the first unit of work of the next phase (the first deletion after
//! `PauseAfterType`, the first keystroke after `PauseAfterDelete`).
//!
//! # Invariants
//!
//! 1. `revealed <= script.len_of(sentence_index)`.
//! 2. Each step changes `revealed` by at most one.
//! 3. `complete` implies `phase == Completed` and no further wait.
//! 4. `Completed` is only reached when not looping, on the last sentence,
//!    with the whole sentence revealed.
//! 5. `sentence_index` only changes when a deletion reaches zero, and then
//!    advances by one modulo the sentence count.

use crate::script::Script;

/// Phase of the typing animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for the visibility gate.
    AwaitingVisibility,
    /// Armed; the first keystroke is pending.
    InitialDelay,
    /// Revealing characters.
    Typing,
    /// Sentence fully typed; holding before deletion.
    PauseAfterType,
    /// Removing characters.
    Deleting,
    /// Sentence fully deleted; holding before the next sentence.
    PauseAfterDelete,
    /// Finished for good.
    Completed,
}

/// Authoritative animation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineState {
    /// Index of the current sentence.
    pub sentence_index: usize,
    /// Characters of the current sentence on screen.
    pub revealed: usize,
    /// Whether characters are being removed.
    pub deleting: bool,
    /// Terminal flag; no more ticks once set.
    pub complete: bool,
    /// Whether the visibility gate has opened.
    pub visible: bool,
    /// Current phase.
    pub phase: Phase,
}

impl EngineState {
    /// Fresh state before activation.
    #[must_use]
    pub const fn awaiting() -> Self {
        Self {
            sentence_index: 0,
            revealed: 0,
            deleting: false,
            complete: false,
            visible: false,
            phase: Phase::AwaitingVisibility,
        }
    }

    /// Fresh state right after activation.
    #[must_use]
    pub const fn armed() -> Self {
        Self {
            visible: true,
            phase: Phase::InitialDelay,
            ..Self::awaiting()
        }
    }

    /// Whether characters are actively being typed or deleted (as opposed to
    /// holding a finished sentence or having stopped).
    #[must_use]
    pub fn is_revealing(&self, script: &Script) -> bool {
        match self.phase {
            Phase::Completed | Phase::PauseAfterType => false,
            Phase::Deleting => true,
            Phase::AwaitingVisibility
            | Phase::InitialDelay
            | Phase::Typing
            | Phase::PauseAfterDelete => self.revealed < script.len_of(self.sentence_index),
        }
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::awaiting()
    }
}

/// The kind of wait before the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// One typing keystroke.
    Keystroke,
    /// One deletion.
    Erase,
    /// The between-sentence hold.
    Pause,
}

/// Result of one [`step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// State after the tick.
    pub state: EngineState,
    /// Wait before the next tick, or `None` to stop.
    pub wait: Option<Wait>,
    /// Index of the sentence finished by this tick.
    pub finished: Option<usize>,
}

impl Transition {
    fn next(state: EngineState, wait: Wait) -> Self {
        Self {
            state,
            wait: Some(wait),
            finished: None,
        }
    }
}

/// Advance the animation by one tick.
///
/// Ticking a state that is not yet visible or already complete is a no-op
/// that requests no further wait.
#[must_use]
pub fn step(state: &EngineState, script: &Script, looping: bool) -> Transition {
    let mut next = *state;
    if state.complete || !state.visible || script.is_empty() {
        return Transition {
            state: next,
            wait: None,
            finished: None,
        };
    }

    let len = script.len_of(state.sentence_index);

    if state.deleting || state.phase == Phase::PauseAfterType {
        next.deleting = true;
        next.revealed = next.revealed.min(len).saturating_sub(1);
        if next.revealed > 0 {
            next.phase = Phase::Deleting;
            return Transition::next(next, Wait::Erase);
        }
        let finished = state.sentence_index;
        next.deleting = false;
        next.sentence_index = (finished + 1) % script.len();
        next.phase = Phase::PauseAfterDelete;
        return Transition {
            state: next,
            wait: Some(Wait::Pause),
            finished: Some(finished),
        };
    }

    if next.revealed < len {
        next.revealed += 1;
    }
    if next.revealed < len {
        next.phase = Phase::Typing;
        return Transition::next(next, Wait::Keystroke);
    }

    let last = state.sentence_index + 1 >= script.len();
    if last && !looping {
        next.revealed = len;
        next.complete = true;
        next.phase = Phase::Completed;
        return Transition {
            state: next,
            wait: None,
            finished: Some(state.sentence_index),
        };
    }

    next.phase = Phase::PauseAfterType;
    Transition::next(next, Wait::Pause)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(script: &Script, looping: bool, ticks: usize) -> Vec<(EngineState, Option<Wait>)> {
        let mut state = EngineState::armed();
        let mut out = Vec::new();
        for _ in 0..ticks {
            let t = step(&state, script, looping);
            state = t.state;
            out.push((state, t.wait));
            if t.wait.is_none() {
                break;
            }
        }
        out
    }

    #[test]
    fn types_then_completes_without_loop() {
        let script = Script::new(&["Hi"], false);
        let trace = run(&script, false, 10);
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[0].0.revealed, 1);
        assert_eq!(trace[0].1, Some(Wait::Keystroke));
        assert_eq!(trace[1].0.revealed, 2);
        assert!(trace[1].0.complete);
        assert_eq!(trace[1].0.phase, Phase::Completed);
        assert_eq!(trace[1].1, None);
    }

    #[test]
    fn single_sentence_loop_deletes_before_retyping() {
        let script = Script::new(&["ab"], false);
        let trace = run(&script, true, 6);
        let revealed: Vec<usize> = trace.iter().map(|(s, _)| s.revealed).collect();
        assert_eq!(revealed, vec![1, 2, 1, 0, 1, 2]);
        assert_eq!(trace[1].0.phase, Phase::PauseAfterType);
        assert_eq!(trace[1].1, Some(Wait::Pause));
        assert_eq!(trace[3].0.phase, Phase::PauseAfterDelete);
        assert_eq!(trace[3].0.sentence_index, 0);
    }

    #[test]
    fn deletion_end_advances_and_reports() {
        let script = Script::new(&["a", "b"], false);
        let mut state = EngineState::armed();
        state = step(&state, &script, true).state; // "a", pause
        let t = step(&state, &script, true); // delete -> ""
        assert_eq!(t.finished, Some(0));
        assert_eq!(t.state.sentence_index, 1);
        assert!(!t.state.deleting);
        assert_eq!(t.wait, Some(Wait::Pause));
    }

    #[test]
    fn index_wraps_when_looping() {
        let script = Script::new(&["a", "b"], false);
        let mut state = EngineState {
            sentence_index: 1,
            revealed: 1,
            phase: Phase::PauseAfterType,
            ..EngineState::armed()
        };
        state = step(&state, &script, true).state;
        assert_eq!(state.sentence_index, 0);
    }

    #[test]
    fn empty_sentence_is_a_noop_tick() {
        let script = Script::new(&["", "x"], false);
        let t = step(&EngineState::armed(), &script, false);
        assert_eq!(t.state.revealed, 0);
        assert_eq!(t.state.phase, Phase::PauseAfterType);
        assert!(!t.state.deleting);
        assert_eq!(t.wait, Some(Wait::Pause));
        let t = step(&t.state, &script, false);
        assert_eq!(t.finished, Some(0));
        assert_eq!(t.state.sentence_index, 1);
    }

    #[test]
    fn lone_empty_sentence_completes() {
        let script = Script::new(&[""], false);
        let t = step(&EngineState::armed(), &script, false);
        assert!(t.state.complete);
        assert_eq!(t.finished, Some(0));
    }

    #[test]
    fn invisible_or_complete_state_is_inert() {
        let script = Script::new(&["abc"], false);
        let t = step(&EngineState::awaiting(), &script, true);
        assert_eq!(t.state, EngineState::awaiting());
        assert_eq!(t.wait, None);

        let done = EngineState {
            complete: true,
            phase: Phase::Completed,
            ..EngineState::armed()
        };
        assert_eq!(step(&done, &script, true).wait, None);
    }

    #[test]
    fn revealing_excludes_pauses_after_typing() {
        let script = Script::new(&["ab"], false);
        let mut state = EngineState::armed();
        assert!(state.is_revealing(&script));
        state = step(&state, &script, true).state;
        assert!(state.is_revealing(&script));
        state = step(&state, &script, true).state;
        assert_eq!(state.phase, Phase::PauseAfterType);
        assert!(!state.is_revealing(&script));
        state = step(&state, &script, true).state;
        assert_eq!(state.phase, Phase::Deleting);
        assert!(state.is_revealing(&script));
    }

    #[test]
    fn deleting_flag_rises_with_first_removal() {
        let script = Script::new(&["abc"], false);
        let mut state = EngineState::armed();
        for _ in 0..3 {
            state = step(&state, &script, true).state;
            assert!(!state.deleting);
        }
        assert_eq!(state.phase, Phase::PauseAfterType);
        assert_eq!(state.revealed, 3);

        state = step(&state, &script, true).state;
        assert!(state.deleting);
        assert_eq!(state.phase, Phase::Deleting);
        assert_eq!(state.revealed, 2);
    }
}
