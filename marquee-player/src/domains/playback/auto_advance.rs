//! End-of-item countdown and queue advance.
//!
//! `Idle -> CountingDown -> Advancing -> Idle`, with `Cancelled` reached
//! from `Idle` or `CountingDown` when the user leaves queue mode. Every
//! transition is a method returning whether it applied, so the coordinator
//! can run it inside a single watch-channel modification and act only when
//! it won.

use marquee_model::QueueItem;

/// Where the end-of-item flow currently is
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AutoAdvanceState {
    /// No countdown; a new one may start
    #[default]
    Idle,
    /// Counting down to `next`, one second per tick
    CountingDown {
        /// Whole seconds left, reaches 0 before the advance
        seconds_remaining: u32,
        /// Entry that will play
        next: QueueItem,
    },
    /// Loading the next entry
    Advancing {
        /// Entry being loaded, when known
        next: Option<QueueItem>,
    },
    /// The user left queue mode
    Cancelled,
}

/// Outcome of one countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Seconds still left
    Remaining(u32),
    /// Reached zero. The state stays `CountingDown { seconds_remaining: 0 }`
    /// until the advance is claimed with [`AutoAdvanceState::begin_advance`].
    Expired,
    /// The countdown was cancelled or already advanced
    Inactive,
}

impl AutoAdvanceState {
    /// A countdown is on screen
    pub fn is_counting_down(&self) -> bool {
        matches!(self, AutoAdvanceState::CountingDown { .. })
    }

    /// The next entry is being loaded
    pub fn is_advancing(&self) -> bool {
        matches!(self, AutoAdvanceState::Advancing { .. })
    }

    /// Seconds left while counting down
    pub fn seconds_remaining(&self) -> Option<u32> {
        match self {
            AutoAdvanceState::CountingDown {
                seconds_remaining, ..
            } => Some(*seconds_remaining),
            _ => None,
        }
    }

    /// Entry the countdown or advance is heading to
    pub fn next_item(&self) -> Option<&QueueItem> {
        match self {
            AutoAdvanceState::CountingDown { next, .. } => Some(next),
            AutoAdvanceState::Advancing { next } => next.as_ref(),
            _ => None,
        }
    }

    /// End of item reached with something queued
    pub fn begin_countdown(&mut self, seconds: u32, next: QueueItem) -> bool {
        match self {
            AutoAdvanceState::Idle => {
                *self = AutoAdvanceState::CountingDown {
                    seconds_remaining: seconds,
                    next,
                };
                true
            }
            _ => false,
        }
    }

    /// One second elapsed
    pub fn tick(&mut self) -> CountdownTick {
        match self {
            AutoAdvanceState::CountingDown {
                seconds_remaining, ..
            } => {
                *seconds_remaining = seconds_remaining.saturating_sub(1);
                if *seconds_remaining == 0 {
                    CountdownTick::Expired
                } else {
                    CountdownTick::Remaining(*seconds_remaining)
                }
            }
            _ => CountdownTick::Inactive,
        }
    }

    /// "Play next now", from a running countdown or straight from `Idle`
    pub fn begin_advance(&mut self, next: Option<QueueItem>) -> bool {
        match self {
            AutoAdvanceState::CountingDown { next: pending, .. } => {
                let next = next.or_else(|| Some(pending.clone()));
                *self = AutoAdvanceState::Advancing { next };
                true
            }
            AutoAdvanceState::Idle => {
                *self = AutoAdvanceState::Advancing { next };
                true
            }
            _ => false,
        }
    }

    /// Leave queue mode. Not allowed while an advance is in flight.
    pub fn cancel(&mut self) -> bool {
        match self {
            AutoAdvanceState::Idle | AutoAdvanceState::CountingDown { .. } => {
                *self = AutoAdvanceState::Cancelled;
                true
            }
            _ => false,
        }
    }

    /// Advance finished or aborted; a new item can count down again
    pub fn finish(&mut self) -> bool {
        match self {
            AutoAdvanceState::Advancing { .. } => {
                *self = AutoAdvanceState::Idle;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_model::ItemId;

    fn next() -> QueueItem {
        QueueItem::new(ItemId::new(), "Next Episode")
    }

    #[test]
    fn countdown_reaches_advancing_after_full_length() {
        let mut state = AutoAdvanceState::default();
        assert!(state.begin_countdown(5, next()));
        assert_eq!(state.seconds_remaining(), Some(5));

        for expected in [4, 3, 2, 1] {
            assert_eq!(state.tick(), CountdownTick::Remaining(expected));
            assert_eq!(state.seconds_remaining(), Some(expected));
        }
        assert_eq!(state.tick(), CountdownTick::Expired);
        assert_eq!(state.seconds_remaining(), Some(0));
        assert_eq!(state.tick(), CountdownTick::Expired);

        assert!(state.begin_advance(None));
        assert!(state.is_advancing());
        assert!(state.next_item().is_some());
        assert_eq!(state.tick(), CountdownTick::Inactive);
    }

    #[test]
    fn countdown_does_not_restart_while_advancing() {
        let mut state = AutoAdvanceState::default();
        state.begin_countdown(5, next());
        assert!(!state.begin_countdown(5, next()));
        assert!(state.begin_advance(None));
        assert!(!state.begin_advance(None));
        assert!(!state.cancel());
        assert!(!state.begin_countdown(5, next()));
        assert!(state.finish());
        assert!(state.begin_countdown(5, next()));
    }

    #[test]
    fn cancel_stops_countdown() {
        let mut state = AutoAdvanceState::default();
        state.begin_countdown(5, next());
        assert!(state.cancel());
        assert_eq!(state, AutoAdvanceState::Cancelled);
        assert_eq!(state.tick(), CountdownTick::Inactive);
        assert!(!state.begin_advance(None));
    }
}
