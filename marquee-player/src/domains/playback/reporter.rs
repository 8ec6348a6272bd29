//! Playback lifecycle reporting.
//!
//! Each negotiated session walks `NotStarted -> Started -> Stopped` exactly
//! once. Start is only sent from `NotStarted`, progress only while
//! `Started`, and stop only from `Started`, so a stop can never precede a
//! start and nothing is sent after a stop. Phase transitions happen under a
//! short lock; the HTTP calls run after it is released.
//!
//! Checkpoint writes and the clear that follows a confirmed stop share one
//! async gate, and a write only lands while its session is still `Started`.
//! A progress report still in flight when the stop is claimed can therefore
//! never resurrect the checkpoint.

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::{Handle, RuntimeFlavor};

use marquee_model::{PlaybackCheckpoint, PlaybackSession, Ticks};

use crate::error::{PlaybackError, PlaybackResult};
use crate::infra::services::{
    CheckpointStore, MediaServerService, PlaybackReport,
};

/// Observable summary of where the current session is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhaseKind {
    /// Nothing negotiated yet
    Idle,
    /// Negotiated, waiting for the first frame
    NotStarted,
    /// Start report sent
    Started,
    /// Stop claimed; nothing more is reported for this session
    Stopped,
}

#[derive(Debug, Default)]
enum SessionPhase {
    #[default]
    Idle,
    NotStarted(Arc<PlaybackSession>),
    Started {
        session: Arc<PlaybackSession>,
        last_position: Ticks,
    },
    Stopped(Arc<PlaybackSession>),
}

impl SessionPhase {
    fn kind(&self) -> SessionPhaseKind {
        match self {
            SessionPhase::Idle => SessionPhaseKind::Idle,
            SessionPhase::NotStarted(_) => SessionPhaseKind::NotStarted,
            SessionPhase::Started { .. } => SessionPhaseKind::Started,
            SessionPhase::Stopped(_) => SessionPhaseKind::Stopped,
        }
    }

    fn session(&self) -> Option<&Arc<PlaybackSession>> {
        match self {
            SessionPhase::Idle => None,
            SessionPhase::NotStarted(session)
            | SessionPhase::Started { session, .. }
            | SessionPhase::Stopped(session) => Some(session),
        }
    }
}

/// Sends start/progress/stop for one session at a time and keeps the
/// crash-recovery checkpoint in step with them.
#[derive(Debug)]
pub struct SessionReporter {
    server: Arc<dyn MediaServerService>,
    checkpoints: Arc<dyn CheckpointStore>,
    phase: Mutex<SessionPhase>,
    checkpoint_gate: tokio::sync::Mutex<()>,
}

impl SessionReporter {
    /// A reporter with no session installed
    pub fn new(
        server: Arc<dyn MediaServerService>,
        checkpoints: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            server,
            checkpoints,
            phase: Mutex::new(SessionPhase::Idle),
            checkpoint_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Install a freshly negotiated session. The previous one must already
    /// be stopped; a started one is abandoned with a warning.
    pub fn begin(&self, session: Arc<PlaybackSession>) {
        let previous = std::mem::replace(
            &mut *self.phase.lock(),
            SessionPhase::NotStarted(session),
        );
        if let SessionPhase::Started { session, .. } = previous {
            warn!(
                "[Reporter] Session for {} replaced without a stop report",
                session.item_id
            );
        }
    }

    /// Current phase without the session payload
    pub fn phase(&self) -> SessionPhaseKind {
        self.phase.lock().kind()
    }

    /// The installed session, whatever its phase
    pub fn session(&self) -> Option<Arc<PlaybackSession>> {
        self.phase.lock().session().cloned()
    }

    /// Remember the position a later stop falls back to. Ignored unless
    /// started.
    pub fn note_position(&self, position: Ticks) {
        if let SessionPhase::Started { last_position, .. } =
            &mut *self.phase.lock()
        {
            *last_position = position;
        }
    }

    /// Send the start report. Returns `false` if the session was not
    /// waiting to start.
    pub async fn report_start(&self, position: Ticks) -> bool {
        let session = {
            let mut phase = self.phase.lock();
            let SessionPhase::NotStarted(session) = &*phase else {
                debug!(
                    "[Reporter] Ignoring start in phase {:?}",
                    phase.kind()
                );
                return false;
            };
            let session = session.clone();
            *phase = SessionPhase::Started {
                session: session.clone(),
                last_position: position,
            };
            session
        };

        info!(
            "[Reporter] Playback started for {} at {} ms",
            session.item_id,
            position.as_millis()
        );
        let report = PlaybackReport::for_session(&session, position, false);
        if let Err(err) = self.server.report_playback_start(&report).await {
            warn!("[Reporter] Start report failed: {:#}", err);
        }
        self.write_checkpoint(&session, position).await;
        true
    }

    /// Send a progress report. Dropped unless the session has started and
    /// not yet stopped.
    pub async fn report_progress(&self, position: Ticks, is_paused: bool) -> bool {
        let session = {
            let mut phase = self.phase.lock();
            match &mut *phase {
                SessionPhase::Started {
                    session,
                    last_position,
                } => {
                    *last_position = position;
                    session.clone()
                }
                other => {
                    debug!(
                        "[Reporter] Dropping progress in phase {:?}",
                        other.kind()
                    );
                    return false;
                }
            }
        };

        let report = PlaybackReport::for_session(&session, position, is_paused);
        if let Err(err) = self.server.report_playback_progress(&report).await {
            warn!("[Reporter] Progress report failed: {:#}", err);
        }
        self.write_checkpoint(&session, position).await;
        true
    }

    /// Send the stop report at `position`, or at the last known position.
    /// Only the first call for a started session sends anything.
    pub async fn report_stop(&self, position: Option<Ticks>) -> bool {
        let Some((session, position)) = self.take_started(position) else {
            return false;
        };
        self.deliver_stop(&session, position).await
    }

    /// Teardown path: claim the stop the same way [`Self::report_stop`]
    /// does, then deliver it from synchronous code. On a multi-thread
    /// runtime the calling worker blocks until the server answered; on a
    /// current-thread runtime the report is handed to a spawned task.
    /// Returns whether a report was sent or handed off.
    pub fn stop_detached(self: &Arc<Self>) -> bool {
        let Some((session, position)) = self.take_started(None) else {
            return false;
        };
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| {
                    handle.block_on(self.deliver_stop(&session, position))
                })
            }
            Ok(handle) => {
                let reporter = self.clone();
                handle.spawn(async move {
                    reporter.deliver_stop(&session, position).await;
                });
                true
            }
            Err(_) => {
                warn!(
                    "[Reporter] No runtime to send the stop report for {}; checkpoint kept for next launch",
                    session.item_id
                );
                false
            }
        }
    }

    /// Checkpoint left behind by a session that never stopped
    pub async fn pending_checkpoint(
        &self,
    ) -> PlaybackResult<Option<PlaybackCheckpoint>> {
        self.checkpoints
            .active_playback_session()
            .await
            .map_err(PlaybackError::Checkpoint)
    }

    fn take_started(
        &self,
        position: Option<Ticks>,
    ) -> Option<(Arc<PlaybackSession>, Ticks)> {
        let mut phase = self.phase.lock();
        match std::mem::take(&mut *phase) {
            SessionPhase::Started {
                session,
                last_position,
            } => {
                *phase = SessionPhase::Stopped(session.clone());
                Some((session, position.unwrap_or(last_position)))
            }
            SessionPhase::NotStarted(session) => {
                debug!(
                    "[Reporter] Session for {} closed before it started",
                    session.item_id
                );
                *phase = SessionPhase::Stopped(session);
                None
            }
            other => {
                *phase = other;
                None
            }
        }
    }

    fn is_started(&self, session: &Arc<PlaybackSession>) -> bool {
        matches!(
            &*self.phase.lock(),
            SessionPhase::Started { session: current, .. } if Arc::ptr_eq(current, session)
        )
    }

    async fn write_checkpoint(&self, session: &Arc<PlaybackSession>, position: Ticks) {
        let _gate = self.checkpoint_gate.lock().await;
        if !self.is_started(session) {
            debug!(
                "[Reporter] Session for {} ended while reporting, checkpoint left alone",
                session.item_id
            );
            return;
        }
        if let Err(err) = self
            .checkpoints
            .set_active_playback_session(
                session.item_id,
                position,
                session.media_source_id.clone(),
            )
            .await
        {
            warn!("[Reporter] Failed to write checkpoint: {:#}", err);
        }
    }

    /// The checkpoint is only cleared once the server accepted the stop
    async fn deliver_stop(&self, session: &PlaybackSession, position: Ticks) -> bool {
        info!(
            "[Reporter] Playback stopped for {} at {} ms",
            session.item_id,
            position.as_millis()
        );
        let report = PlaybackReport::for_session(session, position, false);
        match self.server.report_playback_stopped(&report).await {
            Ok(()) => {
                let _gate = self.checkpoint_gate.lock().await;
                if let Err(err) =
                    self.checkpoints.clear_active_playback_session().await
                {
                    warn!("[Reporter] Failed to clear checkpoint: {:#}", err);
                }
            }
            Err(err) => {
                warn!(
                    "[Reporter] Stop report failed, keeping checkpoint: {:#}",
                    err
                );
            }
        }
        true
    }
}
