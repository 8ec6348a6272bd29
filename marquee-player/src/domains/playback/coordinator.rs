//! Playback session coordinator.
//!
//! Owns the view state and sequences negotiation, reporting, segment
//! loading and auto-advance. Hosts call the async operations from their
//! event loop; timers run as tokio tasks that hold only a weak reference
//! back, so dropping the coordinator ends them.

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;

use marquee_model::{
    ItemId, PlaybackCheckpoint, PlaybackSession, SUBTITLES_DISABLED, Ticks,
    TrackOverrides, TrackPreferences,
};

use crate::error::{PlaybackError, PlaybackResult};
use crate::infra::runtime_config::RuntimeConfig;
use crate::infra::services::{
    CheckpointStore, MediaServerService, QueueManager,
};

use super::auto_advance::{AutoAdvanceState, CountdownTick};
use super::negotiation::StreamNegotiator;
use super::reporter::{SessionPhaseKind, SessionReporter};
use super::segments::SegmentIndex;
use super::state::PlayerViewState;
use super::timers::TimerSlot;

/// External collaborators the coordinator drives
#[derive(Debug, Clone)]
pub struct PlaybackServices {
    /// Item lookup, negotiation and playback reports
    pub media_server: Arc<dyn MediaServerService>,
    /// Play queue driving auto-advance
    pub queue: Arc<dyn QueueManager>,
    /// Crash-recovery checkpoint storage
    pub checkpoints: Arc<dyn CheckpointStore>,
}

/// Bookkeeping for the item currently loaded
#[derive(Debug, Clone)]
struct LoadedItem {
    item_id: ItemId,
    position_ms: u64,
    watched: bool,
}

#[derive(Debug)]
pub(super) struct CoordinatorInner {
    server: Arc<dyn MediaServerService>,
    queue: Arc<dyn QueueManager>,
    negotiator: StreamNegotiator,
    reporter: Arc<SessionReporter>,
    segments: Mutex<SegmentIndex>,
    pub(super) config: RuntimeConfig,
    preferences: TrackPreferences,
    pub(super) view: watch::Sender<PlayerViewState>,
    current: Mutex<Option<LoadedItem>>,
    overrides: Mutex<HashMap<ItemId, TrackOverrides>>,
    generation: AtomicU64,
    countdown_timer: TimerSlot,
    pub(super) controls_timer: TimerSlot,
}

/// Entry point for hosts. See the module docs.
///
/// Call [`PlaybackCoordinator::finalize`] before dropping it. Dropping a
/// coordinator with a started session still sends the stop report, but on
/// a detached task that may not finish if the runtime is shutting down.
#[derive(Debug)]
pub struct PlaybackCoordinator {
    inner: Arc<CoordinatorInner>,
}

impl PlaybackCoordinator {
    /// Create an idle coordinator. Nothing is loaded and no timers run.
    pub fn new(
        services: PlaybackServices,
        config: RuntimeConfig,
        preferences: TrackPreferences,
    ) -> Self {
        let (view, _) = watch::channel(PlayerViewState {
            is_queue_mode: services.queue.is_queue_mode(),
            ..PlayerViewState::default()
        });
        let inner = CoordinatorInner {
            negotiator: StreamNegotiator::new(services.media_server.clone()),
            reporter: Arc::new(SessionReporter::new(
                services.media_server.clone(),
                services.checkpoints,
            )),
            server: services.media_server,
            queue: services.queue,
            segments: Mutex::new(SegmentIndex::default()),
            config,
            preferences,
            view,
            current: Mutex::new(None),
            overrides: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            countdown_timer: TimerSlot::new("countdown"),
            controls_timer: TimerSlot::new("controls"),
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Receiver for view updates. Every receiver sees the latest state.
    pub fn subscribe(&self) -> watch::Receiver<PlayerViewState> {
        self.inner.view.subscribe()
    }

    /// Snapshot of the current view state
    pub fn view(&self) -> PlayerViewState {
        self.inner.view.borrow().clone()
    }

    /// Effective runtime tuning
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// The session of the loaded item, if negotiation produced one
    pub fn current_session(&self) -> Option<Arc<PlaybackSession>> {
        self.inner.reporter.session()
    }

    /// Where the current session is in its start/stop lifecycle
    pub fn session_phase(&self) -> SessionPhaseKind {
        self.inner.reporter.phase()
    }

    /// Checkpoint of a session the previous run never stopped. Read it
    /// before loading anything to offer resume.
    pub async fn pending_resume(
        &self,
    ) -> PlaybackResult<Option<PlaybackCheckpoint>> {
        self.inner.reporter.pending_checkpoint().await
    }

    /// Load an item chosen by the user, replacing whatever is playing.
    ///
    /// Without `start_position_ms` playback starts at the server's resume
    /// position.
    pub async fn load_item(
        &self,
        item_id: ItemId,
        start_position_ms: Option<u64>,
    ) -> PlaybackResult<()> {
        let inner = &self.inner;
        inner.countdown_timer.cancel();
        inner.reporter.report_stop(None).await;
        inner
            .view
            .send_modify(|view| view.auto_advance = AutoAdvanceState::Idle);
        inner
            .load(item_id, start_position_ms, TrackOverrides::default())
            .await
    }

    /// The video backend opened the stream
    pub fn set_player_ready(&self) {
        self.inner.view.send_if_modified(|view| {
            !std::mem::replace(&mut view.is_player_ready, true)
        });
        self.inner.show_controls();
    }

    /// First frame is playing. Sends the start report once per session.
    pub async fn on_playback_started(&self, position_ms: u64) {
        let inner = &self.inner;
        inner.record_position(position_ms);
        inner.view.send_if_modified(|view| {
            std::mem::replace(&mut view.is_paused, false)
        });
        inner
            .reporter
            .report_start(Ticks::from_millis(position_ms))
            .await;
    }

    /// Periodic position update from the host
    pub async fn report_progress(&self, position_ms: u64, is_paused: bool) {
        self.inner.record_position(position_ms);
        self.inner
            .reporter
            .report_progress(Ticks::from_millis(position_ms), is_paused)
            .await;
    }

    /// Pause/resume edge. Repeated calls with the same state are ignored.
    pub async fn on_pause_state_changed(&self, is_paused: bool, position_ms: u64) {
        let inner = &self.inner;
        inner.record_position(position_ms);
        let changed = inner.view.send_if_modified(|view| {
            if view.is_paused == is_paused {
                return false;
            }
            view.is_paused = is_paused;
            true
        });
        if !changed {
            return;
        }

        if is_paused {
            inner.controls_timer.cancel();
            inner.view.send_if_modified(|view| {
                !std::mem::replace(&mut view.controls_visible, true)
            });
        } else {
            inner.arm_hide_timer();
        }

        inner
            .reporter
            .report_progress(Ticks::from_millis(position_ms), is_paused)
            .await;
    }

    /// Mark the item watched once it passes the configured fraction.
    /// Returns `true` only for the call that marked it.
    pub async fn check_video_completion(
        &self,
        position_ms: u64,
        duration_ms: u64,
    ) -> bool {
        if duration_ms == 0 {
            return false;
        }
        let inner = &self.inner;
        let fraction = position_ms as f64 / duration_ms as f64;
        if fraction < inner.config.watched_threshold() {
            return false;
        }

        let item_id = {
            let mut current = inner.current.lock();
            match current.as_mut() {
                Some(item) if !item.watched => {
                    item.watched = true;
                    item.item_id
                }
                _ => return false,
            }
        };

        info!(
            "[Coordinator] {} watched ({:.1}%), marking played",
            item_id,
            fraction * 100.0
        );
        match inner.server.set_played(item_id, true).await {
            Ok(()) => {
                inner.view.send_modify(|view| view.is_watched = true);
            }
            Err(err) => {
                warn!("[Coordinator] Failed to mark {} played: {:#}", item_id, err);
            }
        }
        true
    }

    /// The user left playback. Sends the stop report and discards the
    /// session.
    pub async fn stop_playback(&self, position_ms: u64) {
        let inner = &self.inner;
        inner.countdown_timer.cancel();
        inner.controls_timer.cancel();
        inner.generation.fetch_add(1, Ordering::SeqCst);
        inner.record_position(position_ms);
        inner
            .reporter
            .report_stop(Some(Ticks::from_millis(position_ms)))
            .await;
        inner.view.send_modify(|view| {
            view.stream_url = None;
            view.session = None;
            view.is_player_ready = false;
            view.is_loading = false;
            settle_auto_advance(&mut view.auto_advance);
        });
    }

    /// Switch the audio track.
    ///
    /// Renegotiates the stream at the current position. Fails with
    /// [`PlaybackError::NoActiveItem`] when nothing is loaded.
    pub async fn set_audio_stream_index(&self, index: i32) -> PlaybackResult<()> {
        self.inner
            .switch_tracks(TrackOverrides {
                audio_stream_index: Some(index),
                subtitle_stream_index: None,
            })
            .await
    }

    /// `None` turns subtitles off
    pub async fn set_subtitle_stream_index(
        &self,
        index: Option<i32>,
    ) -> PlaybackResult<()> {
        self.inner
            .switch_tracks(TrackOverrides {
                audio_stream_index: None,
                subtitle_stream_index: Some(index.unwrap_or(SUBTITLES_DISABLED)),
            })
            .await
    }

    /// Show controls and re-arm the auto-hide timer
    pub fn show_controls(&self) {
        self.inner.show_controls();
    }

    /// Hide controls and cancel any pending auto-hide
    pub fn hide_controls(&self) {
        self.inner.hide_controls();
    }

    /// Flip control visibility
    pub fn toggle_controls(&self) {
        self.inner.toggle_controls();
    }

    /// User activity: push the auto-hide back
    pub fn reset_controls_hide_timer(&self) {
        self.inner.reset_controls_hide_timer();
    }

    /// Playback reached the end. Starts the countdown when auto-advance is
    /// on and the queue has a next entry. Returns whether it started.
    pub fn on_video_ended(&self) -> bool {
        let inner = &self.inner;
        if !inner.config.auto_advance() {
            debug!("[Coordinator] Auto-advance disabled");
            return false;
        }
        if !inner.queue.is_queue_mode() {
            return false;
        }
        let Some(next) = inner.queue.peek_next() else {
            debug!("[Coordinator] End of queue reached");
            return false;
        };

        let seconds = inner.config.countdown_seconds();
        let title = next.display_title();
        let started = inner
            .view
            .send_if_modified(|view| view.auto_advance.begin_countdown(seconds, next));
        if started {
            info!("[Coordinator] Next up in {}s: {}", seconds, title);
            inner.start_countdown_ticker();
        }
        started
    }

    /// Skip the countdown (or start the next entry right away)
    pub async fn play_next_now(&self) -> PlaybackResult<()> {
        let inner = &self.inner;
        let next = inner.queue.peek_next();
        if next.is_none() {
            return Err(PlaybackError::QueueExhausted);
        }
        let won = inner
            .view
            .send_if_modified(|view| view.auto_advance.begin_advance(next));
        if !won {
            debug!("[Coordinator] Advance already running or queue cancelled");
            return Ok(());
        }
        inner.countdown_timer.cancel();
        inner.advance().await
    }

    /// Stop the countdown, clear the queue and stay on the current item
    pub fn cancel_queue(&self) {
        let inner = &self.inner;
        let cancelled = inner.view.send_if_modified(|view| {
            if !view.auto_advance.cancel() {
                return false;
            }
            view.is_queue_mode = false;
            true
        });
        if cancelled {
            inner.countdown_timer.cancel();
            inner.queue.clear();
            info!("[Coordinator] Queue cancelled");
        } else {
            debug!("[Coordinator] Ignoring cancel while advancing");
        }
    }

    /// Resolve the skippable segment at the position. The view only changes
    /// when a different segment (or none) becomes active.
    pub fn update_active_segment(&self, position_ms: u64) -> bool {
        let inner = &self.inner;
        inner.record_position(position_ms);
        let active = inner.segments.lock().active_at(position_ms).cloned();
        inner.view.send_if_modified(|view| {
            let current = view.active_segment.as_ref().map(|s| s.id);
            if current == active.as_ref().map(|s| s.id) {
                return false;
            }
            view.active_segment = active;
            true
        })
    }

    /// Where the skip button seeks to, if a segment is active
    pub fn get_skip_target_ms(&self) -> Option<u64> {
        self.inner.view.borrow().skip_target_ms()
    }

    /// Label for the skip button of the active segment
    pub fn get_skip_button_label(&self) -> Option<&'static str> {
        self.inner.view.borrow().skip_button_label()
    }

    /// Orderly shutdown: stop timers and send the pending stop report.
    /// Safe to call more than once.
    pub async fn finalize(&self) {
        let inner = &self.inner;
        inner.countdown_timer.cancel();
        inner.controls_timer.cancel();
        inner.generation.fetch_add(1, Ordering::SeqCst);
        if inner.reporter.report_stop(None).await {
            info!("[Coordinator] Finalized with stop report");
        }
        inner.view.send_if_modified(|view| {
            let was_loading = std::mem::replace(&mut view.is_loading, false);
            settle_auto_advance(&mut view.auto_advance) || was_loading
        });
    }
}

impl CoordinatorInner {
    fn record_position(&self, position_ms: u64) {
        if let Some(item) = self.current.lock().as_mut() {
            item.position_ms = position_ms;
        }
        self.reporter.note_position(Ticks::from_millis(position_ms));
    }

    async fn load(
        self: &Arc<Self>,
        item_id: ItemId,
        start_position_ms: Option<u64>,
        queue_overrides: TrackOverrides,
    ) -> PlaybackResult<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let was_watched = self
            .current
            .lock()
            .take()
            .is_some_and(|item| item.item_id == item_id && item.watched);
        self.segments.lock().clear();

        let is_queue_mode = self.queue.is_queue_mode();
        self.view.send_modify(|view| {
            *view = PlayerViewState {
                is_loading: true,
                controls_visible: view.controls_visible,
                auto_advance: view.auto_advance.clone(),
                is_queue_mode,
                ..PlayerViewState::default()
            };
        });

        let overrides = {
            let mut overrides = self.overrides.lock();
            let merged = queue_overrides
                .merged_with(&overrides.get(&item_id).copied().unwrap_or_default());
            if !merged.is_empty() {
                overrides.insert(item_id, merged);
            }
            merged
        };

        debug!("[Coordinator] Loading {} (generation {})", item_id, generation);
        let result = self
            .negotiator
            .negotiate(
                item_id,
                &self.preferences,
                overrides,
                self.preferences.max_streaming_bitrate_mbps,
            )
            .await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("[Coordinator] Load of {} superseded", item_id);
            return Ok(());
        }

        let negotiated = match result {
            Ok(negotiated) => negotiated,
            Err(err) => {
                error!("[Coordinator] {}", err);
                let message = err.to_string();
                self.view.send_modify(|view| {
                    view.is_loading = false;
                    view.error = Some(message);
                    view.auto_advance = AutoAdvanceState::Idle;
                });
                return Err(err);
            }
        };

        let start_ms = start_position_ms
            .unwrap_or_else(|| negotiated.item.resume_position_ms());
        let session = negotiated.to_session(start_ms);
        self.reporter.begin(Arc::new(session.clone()));
        *self.current.lock() = Some(LoadedItem {
            item_id,
            position_ms: start_ms,
            watched: was_watched,
        });

        info!(
            "[Coordinator] Loaded {} ({}){}",
            negotiated.item.display_title(),
            session.play_method,
            if negotiated.is_degraded() {
                " without a server session"
            } else {
                ""
            }
        );

        self.view.send_modify(move |view| {
            view.item = Some(negotiated.item);
            view.is_loading = false;
            view.error = None;
            view.stream_url = Some(negotiated.stream_url);
            view.audio_streams = negotiated.audio_streams;
            view.subtitle_streams = negotiated.subtitle_streams;
            view.selected_audio_index = negotiated.selected_audio_index;
            view.selected_subtitle_index = negotiated.selected_subtitle_index;
            view.session = Some(session);
            view.is_watched = was_watched;
            view.auto_advance = AutoAdvanceState::Idle;
        });

        self.spawn_segment_load(item_id, generation);
        Ok(())
    }

    /// Segments arrive after playback may already have begun. Results for
    /// an item that is no longer current are dropped.
    fn spawn_segment_load(self: &Arc<Self>, item_id: ItemId, generation: u64) {
        let weak: Weak<Self> = Arc::downgrade(self);
        let server = self.server.clone();
        tokio::spawn(async move {
            let segments = SegmentIndex::load(server.as_ref(), item_id).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.generation.load(Ordering::SeqCst) != generation {
                debug!("[Coordinator] Discarding stale segments for {}", item_id);
                return;
            }

            let position_ms = inner
                .current
                .lock()
                .as_ref()
                .map(|item| item.position_ms)
                .unwrap_or(0);
            let active = {
                let mut index = inner.segments.lock();
                index.replace(segments.clone());
                index.active_at(position_ms).cloned()
            };
            inner.view.send_modify(|view| {
                view.segments = segments;
                view.active_segment = active;
            });
        });
    }

    async fn switch_tracks(
        self: &Arc<Self>,
        change: TrackOverrides,
    ) -> PlaybackResult<()> {
        let (item_id, position_ms) = self
            .current
            .lock()
            .as_ref()
            .map(|item| (item.item_id, item.position_ms))
            .ok_or(PlaybackError::NoActiveItem)?;

        let unchanged = {
            let view = self.view.borrow();
            change
                .audio_stream_index
                .is_none_or(|index| Some(index) == view.selected_audio_index)
                && change.subtitle_stream_index.is_none_or(|index| {
                    (index != SUBTITLES_DISABLED).then_some(index)
                        == view.selected_subtitle_index
                })
        };
        if unchanged {
            return Ok(());
        }

        {
            let mut overrides = self.overrides.lock();
            let entry = overrides.entry(item_id).or_default();
            *entry = entry.merged_with(&change);
        }
        info!(
            "[Coordinator] Switching tracks on {} at {} ms: {:?}",
            item_id, position_ms, change
        );

        self.reporter
            .report_stop(Some(Ticks::from_millis(position_ms)))
            .await;
        self.load(item_id, Some(position_ms), TrackOverrides::default())
            .await
    }

    fn start_countdown_ticker(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let Some(inner) = weak.upgrade() else {
                    return;
                };

                let mut outcome = CountdownTick::Inactive;
                inner.view.send_if_modified(|view| {
                    outcome = view.auto_advance.tick();
                    outcome != CountdownTick::Inactive
                });

                match outcome {
                    CountdownTick::Remaining(seconds) => {
                        debug!("[Coordinator] Next up in {}s", seconds);
                    }
                    CountdownTick::Expired => {
                        inner.countdown_timer.release();
                        let claimed = inner.view.send_if_modified(|view| {
                            view.auto_advance.is_counting_down()
                                && view.auto_advance.begin_advance(None)
                        });
                        if !claimed {
                            return;
                        }
                        if let Err(err) = inner.advance().await {
                            warn!("[Coordinator] Auto-advance failed: {}", err);
                        }
                        return;
                    }
                    CountdownTick::Inactive => return,
                }
            }
        });
        self.countdown_timer.replace(handle);
    }

    /// Move to the next queue entry. The outgoing session is stopped before
    /// the next one is negotiated.
    async fn advance(self: &Arc<Self>) -> PlaybackResult<()> {
        let generation = self.generation.load(Ordering::SeqCst);
        let Some(next) = self.queue.advance_to_next() else {
            warn!("[Coordinator] Queue had nothing to advance to");
            self.view.send_modify(|view| {
                view.auto_advance.finish();
            });
            return Err(PlaybackError::QueueExhausted);
        };
        info!("[Coordinator] Advancing to {}", next.display_title());

        self.reporter.report_stop(None).await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(
                "[Coordinator] Advance to {} abandoned, playback was stopped or replaced",
                next.item_id
            );
            return Ok(());
        }
        self.load(next.item_id, None, next.overrides).await
    }
}

/// A countdown or advance interrupted by stop/finalize returns to `Idle` so
/// the queue stays usable. Returns whether anything changed.
fn settle_auto_advance(state: &mut AutoAdvanceState) -> bool {
    if state.is_counting_down() || state.is_advancing() {
        *state = AutoAdvanceState::Idle;
        true
    } else {
        false
    }
}

impl Drop for CoordinatorInner {
    fn drop(&mut self) {
        if self.reporter.stop_detached() {
            warn!("[Coordinator] Dropped without finalize(), stop report sent from teardown");
        }
    }
}
