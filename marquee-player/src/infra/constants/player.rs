/// Auto-advance defaults
pub mod auto_advance {
    /// Seconds shown before the next queue item starts on its own
    pub const COUNTDOWN_SECONDS: u32 = 5;
    /// Whether queue items advance on their own
    pub const ENABLED: bool = true;
}

/// Controls overlay defaults
pub mod controls {
    use std::time::Duration;

    /// Idle time before on-screen controls hide while playing
    pub const HIDE_DELAY: Duration = Duration::from_secs(3);
}

/// Progress reporting defaults
pub mod reporting {
    use std::time::Duration;

    /// Cadence hosts are expected to call `report_progress` at
    pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

    /// Fraction of the runtime after which an item counts as watched
    pub const WATCHED_THRESHOLD: f64 = 0.95;
}
