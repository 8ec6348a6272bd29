/// Crash-recovery checkpoints
pub mod checkpoint;
/// Media server access
pub mod media_server;
/// Play queue access
pub mod queue;

pub use checkpoint::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
pub use media_server::{
    HttpMediaServer, MediaServerService, PlaybackReport, SessionStream,
    StreamRequest,
};
pub use queue::{InMemoryQueue, QueueManager};
