use marquee_model::ItemId;
use thiserror::Error;

/// Failures surfaced to the host.
///
/// Only a failed item lookup is fatal to a load. Reporting, segment and
/// checkpoint failures are logged where they happen and never reach here.
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The item could not be fetched from the server
    #[error("Failed to load item {item_id}: {source:#}")]
    ItemFetch {
        item_id: ItemId,
        #[source]
        source: anyhow::Error,
    },

    /// An operation needed a loaded item
    #[error("No item is loaded")]
    NoActiveItem,

    /// The queue has no next entry
    #[error("Nothing is queued after the current item")]
    QueueExhausted,

    /// The checkpoint store failed
    #[error("Checkpoint store error: {0:#}")]
    Checkpoint(#[source] anyhow::Error),
}

/// Result alias for coordinator operations
pub type PlaybackResult<T> = Result<T, PlaybackError>;
