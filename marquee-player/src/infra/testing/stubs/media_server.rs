use crate::infra::services::media_server::{
    MediaServerService, PlaybackReport, SessionStream, StreamRequest,
};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use marquee_model::{
    ItemId, ItemMetadata, MediaSegment, MediaSourceId, PlaySessionId,
};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::sync::Notify;

/// A call the coordinator made against the server
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ServerCall {
    GetItem(ItemId),
    Negotiate(StreamRequest),
    StaticUrl(ItemId),
    Start(PlaybackReport),
    Progress(PlaybackReport),
    Stopped(PlaybackReport),
    Segments(ItemId),
    SetPlayed(ItemId, bool),
}

impl ServerCall {
    /// Start, progress or stopped
    pub fn is_report(&self) -> bool {
        matches!(
            self,
            ServerCall::Start(_) | ServerCall::Progress(_) | ServerCall::Stopped(_)
        )
    }

    /// The report carried by a report call
    pub fn report(&self) -> Option<&PlaybackReport> {
        match self {
            ServerCall::Start(r)
            | ServerCall::Progress(r)
            | ServerCall::Stopped(r) => Some(r),
            _ => None,
        }
    }
}

/// In-memory media server that records every call.
///
/// Failures and latency can be injected per operation.
#[derive(Debug, Clone, Default)]
pub struct TestMediaServer {
    inner: Arc<Mutex<InnerServerState>>,
    changed: Arc<Notify>,
}

#[derive(Debug, Default)]
struct InnerServerState {
    items: HashMap<ItemId, ItemMetadata>,
    segments: HashMap<ItemId, Vec<MediaSegment>>,
    segment_delay: HashMap<ItemId, Duration>,
    negotiation_delay: Option<Duration>,
    progress_delay: Option<Duration>,
    fail_negotiation: bool,
    fail_segments: bool,
    fail_reports: bool,
    fail_set_played: bool,
    sessions_issued: u32,
    calls: Vec<ServerCall>,
}

impl TestMediaServer {
    /// Server with no items
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `item` from `get_item`
    pub fn with_item(self, item: ItemMetadata) -> Self {
        self.inner.lock().items.insert(item.id, item);
        self
    }

    /// Serve `segments` for `item_id`
    pub fn with_segments(
        self,
        item_id: ItemId,
        segments: Vec<MediaSegment>,
    ) -> Self {
        self.inner.lock().segments.insert(item_id, segments);
        self
    }

    /// Hold the segment response for this item
    pub fn delay_segments(&self, item_id: ItemId, delay: Duration) {
        self.inner.lock().segment_delay.insert(item_id, delay);
    }

    /// Hold every negotiation, `None` to answer at once
    pub fn delay_negotiation(&self, delay: Option<Duration>) {
        self.inner.lock().negotiation_delay = delay;
    }

    /// Hold every progress report before it is recorded as answered
    pub fn delay_progress(&self, delay: Option<Duration>) {
        self.inner.lock().progress_delay = delay;
    }

    /// Reject negotiation so loads take the static URL
    pub fn fail_negotiation(&self, fail: bool) {
        self.inner.lock().fail_negotiation = fail;
    }

    /// Reject segment queries
    pub fn fail_segments(&self, fail: bool) {
        self.inner.lock().fail_segments = fail;
    }

    /// Reject start, progress and stopped reports
    pub fn fail_reports(&self, fail: bool) {
        self.inner.lock().fail_reports = fail;
    }

    /// Reject mark-played
    pub fn fail_set_played(&self, fail: bool) {
        self.inner.lock().fail_set_played = fail;
    }

    /// Every call so far, in order
    pub fn calls(&self) -> Vec<ServerCall> {
        self.inner.lock().calls.clone()
    }

    /// Only start/progress/stopped, in order
    pub fn reports(&self) -> Vec<ServerCall> {
        self.calls().into_iter().filter(ServerCall::is_report).collect()
    }

    /// Number of recorded calls matching `predicate`
    pub fn count(&self, predicate: impl Fn(&ServerCall) -> bool) -> usize {
        self.inner.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    /// Wait until a recorded call satisfies `predicate`. Gives up after
    /// `timeout` of (possibly paused) tokio time.
    pub async fn wait_for(
        &self,
        predicate: impl Fn(&ServerCall) -> bool,
        timeout: Duration,
    ) -> bool {
        let wait = async {
            loop {
                let notified = self.changed.notified();
                if self.inner.lock().calls.iter().any(&predicate) {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }

    fn record(&self, call: ServerCall) {
        self.inner.lock().calls.push(call);
        self.changed.notify_waiters();
    }

    fn report_result(&self) -> Result<()> {
        if self.inner.lock().fail_reports {
            return Err(anyhow!("report rejected"));
        }
        Ok(())
    }
}

#[async_trait]
impl MediaServerService for TestMediaServer {
    async fn get_item(&self, item_id: ItemId) -> Result<ItemMetadata> {
        self.record(ServerCall::GetItem(item_id));
        self.inner
            .lock()
            .items
            .get(&item_id)
            .cloned()
            .ok_or_else(|| anyhow!("Request failed with status 404 Not Found"))
    }

    async fn get_stream_url_with_session(
        &self,
        request: &StreamRequest,
    ) -> Result<SessionStream> {
        self.record(ServerCall::Negotiate(request.clone()));
        let delay = self.inner.lock().negotiation_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.lock();
        if inner.fail_negotiation {
            return Err(anyhow!("PlaybackInfo failed"));
        }
        inner.sessions_issued += 1;
        let session = format!("ps-{}", inner.sessions_issued);
        Ok(SessionStream {
            url: format!(
                "test://{}/stream?session={}",
                request.item_id.as_str(),
                session
            ),
            play_session_id: Some(PlaySessionId::new(session)),
            media_source_id: request
                .media_source_id
                .clone()
                .or_else(|| Some(MediaSourceId::from(request.item_id))),
        })
    }

    fn get_stream_url(
        &self,
        item_id: ItemId,
        audio_stream_index: Option<i32>,
        subtitle_stream_index: Option<i32>,
    ) -> String {
        self.record(ServerCall::StaticUrl(item_id));
        format!(
            "test://{}/static?audio={:?}&subtitle={:?}",
            item_id.as_str(),
            audio_stream_index,
            subtitle_stream_index
        )
    }

    async fn report_playback_start(
        &self,
        report: &PlaybackReport,
    ) -> Result<()> {
        self.record(ServerCall::Start(report.clone()));
        self.report_result()
    }

    async fn report_playback_progress(
        &self,
        report: &PlaybackReport,
    ) -> Result<()> {
        self.record(ServerCall::Progress(report.clone()));
        let delay = self.inner.lock().progress_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.report_result()
    }

    async fn report_playback_stopped(
        &self,
        report: &PlaybackReport,
    ) -> Result<()> {
        self.record(ServerCall::Stopped(report.clone()));
        self.report_result()
    }

    async fn get_media_segments(
        &self,
        item_id: ItemId,
    ) -> Result<Vec<MediaSegment>> {
        self.record(ServerCall::Segments(item_id));
        let delay = self.inner.lock().segment_delay.get(&item_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let inner = self.inner.lock();
        if inner.fail_segments {
            return Err(anyhow!("segments endpoint unavailable"));
        }
        Ok(inner.segments.get(&item_id).cloned().unwrap_or_default())
    }

    async fn set_played(&self, item_id: ItemId, played: bool) -> Result<()> {
        self.record(ServerCall::SetPlayed(item_id, played));
        if self.inner.lock().fail_set_played {
            return Err(anyhow!("mark played rejected"));
        }
        Ok(())
    }
}
