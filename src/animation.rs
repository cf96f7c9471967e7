//! Step sequencing for `turn_to` and autoplay.

use crate::frames::FrameRange;

/// What the sequencer is currently doing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceState {
    /// No sequence running
    Idle,
    /// Stepping one frame at a time toward a target
    Turning { target: usize },
    /// Stepping forward until stopped
    Playing,
}

/// Identifies one sequence run. Ticks carrying an older token are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StepToken(u64);

/// Request to call back into the viewer after `delay_ms`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepSchedule {
    pub token: StepToken,
    pub delay_ms: u32,
}

/// Result of asking the sequencer for its next move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Show this frame, then schedule another tick
    Advance(usize),
    /// The turn target is reached; the sequence is now idle
    Arrived(usize),
    /// Nothing to do
    Idle,
}

/// Platform-agnostic step sequencer.
///
/// Like a frame timer, this does not keep time itself: every started
/// sequence hands out a [`StepToken`], and the caller is expected to call
/// back with that token after the delay it was told to wait. Starting a new
/// sequence or cancelling bumps the generation, which turns every token in
/// flight into a no-op.
///
/// ## Example
///
/// ```rust
/// use spin_view::{FrameRange, Step, StepSequencer};
///
/// let range = FrameRange::new(8, true);
/// let mut seq = StepSequencer::new();
///
/// let token = seq.start_turn(2);
/// assert_eq!(seq.next_step(token, 0, &range), Step::Advance(1));
/// assert_eq!(seq.next_step(token, 1, &range), Step::Advance(2));
/// assert_eq!(seq.next_step(token, 2, &range), Step::Arrived(2));
/// assert!(!seq.is_running());
/// ```
#[derive(Clone, Debug)]
pub struct StepSequencer {
    state: SequenceState,
    generation: u64,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl StepSequencer {
    pub fn new() -> Self {
        Self {
            state: SequenceState::Idle,
            generation: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> SequenceState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state != SequenceState::Idle
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state == SequenceState::Playing
    }

    #[inline]
    pub fn is_turning(&self) -> bool {
        matches!(self.state, SequenceState::Turning { .. })
    }

    /// Token of the live sequence; tokens from earlier runs never match it.
    #[inline]
    pub fn token(&self) -> StepToken {
        StepToken(self.generation)
    }

    /// Whether a tick with `token` should still act.
    #[inline]
    pub fn is_live(&self, token: StepToken) -> bool {
        self.is_running() && token == self.token()
    }

    /// Start stepping toward `target` (already normalized).
    pub fn start_turn(&mut self, target: usize) -> StepToken {
        self.restart(SequenceState::Turning { target })
    }

    /// Start open-ended forward stepping.
    pub fn start_play(&mut self) -> StepToken {
        self.restart(SequenceState::Playing)
    }

    /// Cancel the running sequence. Returns `true` if one was running.
    pub fn cancel(&mut self) -> bool {
        let was_running = self.is_running();
        self.generation = self.generation.wrapping_add(1);
        self.state = SequenceState::Idle;
        was_running
    }

    /// Decide the next move from `current`.
    ///
    /// Turning moves one index toward the target by plain comparison, so a
    /// cycling viewer does not take the shorter way around. Playing moves
    /// forward through `range`; a non-cycling range stops on the last frame.
    pub fn next_step(&mut self, token: StepToken, current: usize, range: &FrameRange) -> Step {
        if !self.is_live(token) {
            return Step::Idle;
        }

        match self.state {
            SequenceState::Idle => Step::Idle,
            SequenceState::Turning { target } => {
                if target == current {
                    self.state = SequenceState::Idle;
                    Step::Arrived(target)
                } else if target < current {
                    Step::Advance(range.offset(current, -1))
                } else {
                    Step::Advance(range.offset(current, 1))
                }
            }
            SequenceState::Playing => {
                let next = range.offset(current, 1);
                if next == current {
                    self.state = SequenceState::Idle;
                    Step::Idle
                } else {
                    Step::Advance(next)
                }
            }
        }
    }

    fn restart(&mut self, state: SequenceState) -> StepToken {
        self.generation = self.generation.wrapping_add(1);
        self.state = state;
        self.token()
    }
}
