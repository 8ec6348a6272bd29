//! Playback session domain
//!
//! Leaf components first: [`segments`], [`negotiation`], [`reporter`] and
//! [`auto_advance`] know nothing of each other. [`coordinator`] wires them
//! to the host and owns the [`state::PlayerViewState`].

pub mod auto_advance;
mod controls;
pub mod coordinator;
pub mod negotiation;
pub mod reporter;
/// Skippable segment lookup
pub mod segments;
/// Observable player view
pub mod state;
/// Cancellable background timer slots
pub mod timers;
/// Audio and subtitle track choice
pub mod track_selection;

pub use auto_advance::{AutoAdvanceState, CountdownTick};
pub use coordinator::{PlaybackCoordinator, PlaybackServices};
pub use negotiation::{NegotiatedStream, StreamNegotiator};
pub use reporter::{SessionPhaseKind, SessionReporter};
pub use segments::SegmentIndex;
pub use state::PlayerViewState;
pub use timers::TimerSlot;
