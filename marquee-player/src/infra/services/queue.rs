use log::debug;
use parking_lot::Mutex;

use marquee_model::QueueItem;

/// Play queue owned outside the coordinator.
///
/// The coordinator only reads the next entry, advances, and clears. Queue
/// editing belongs to whoever owns the implementation.
pub trait QueueManager: Send + Sync + std::fmt::Debug {
    /// Entry after the current one, without moving
    fn peek_next(&self) -> Option<QueueItem>;

    /// Move to the next entry and return it
    fn advance_to_next(&self) -> Option<QueueItem>;

    /// Entry currently playing
    fn current_item(&self) -> Option<QueueItem>;

    /// Drop every entry and leave queue mode
    fn clear(&self);

    /// Whether playback is running through a queue at all
    fn is_queue_mode(&self) -> bool;
}

#[derive(Debug, Default)]
struct QueueState {
    items: Vec<QueueItem>,
    current: Option<usize>,
}

/// Vec-backed queue. The first entry is current once the queue is set.
#[derive(Debug, Default)]
pub struct InMemoryQueue {
    state: Mutex<QueueState>,
}

impl InMemoryQueue {
    /// Queue positioned on the first of `items`
    pub fn new(items: Vec<QueueItem>) -> Self {
        let queue = Self::default();
        queue.replace(items);
        queue
    }

    /// Replace the queue contents and rewind
    pub fn replace(&self, items: Vec<QueueItem>) {
        let mut state = self.state.lock();
        state.current = if items.is_empty() { None } else { Some(0) };
        state.items = items;
        debug!("[Queue] Replaced queue with {} items", state.items.len());
    }
}

impl QueueManager for InMemoryQueue {
    fn peek_next(&self) -> Option<QueueItem> {
        let state = self.state.lock();
        let next = state.current? + 1;
        state.items.get(next).cloned()
    }

    fn advance_to_next(&self) -> Option<QueueItem> {
        let mut state = self.state.lock();
        let next = state.current? + 1;
        let item = state.items.get(next).cloned()?;
        state.current = Some(next);
        Some(item)
    }

    fn current_item(&self) -> Option<QueueItem> {
        let state = self.state.lock();
        state.items.get(state.current?).cloned()
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.items.clear();
        state.current = None;
    }

    fn is_queue_mode(&self) -> bool {
        !self.state.lock().items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_model::ItemId;

    fn entries(n: usize) -> Vec<QueueItem> {
        (0..n)
            .map(|i| QueueItem::new(ItemId::new(), format!("Episode {}", i + 1)))
            .collect()
    }

    #[test]
    fn advancing_walks_the_queue_once() {
        let items = entries(2);
        let queue = InMemoryQueue::new(items.clone());

        assert!(queue.is_queue_mode());
        assert_eq!(queue.current_item(), Some(items[0].clone()));
        assert_eq!(queue.peek_next(), Some(items[1].clone()));

        assert_eq!(queue.advance_to_next(), Some(items[1].clone()));
        assert_eq!(queue.current_item(), Some(items[1].clone()));
        assert_eq!(queue.peek_next(), None);
        assert_eq!(queue.advance_to_next(), None);
        assert_eq!(queue.current_item(), Some(items[1].clone()));
    }

    #[test]
    fn clear_leaves_queue_mode() {
        let queue = InMemoryQueue::new(entries(3));
        queue.clear();
        assert!(!queue.is_queue_mode());
        assert_eq!(queue.peek_next(), None);
        assert_eq!(queue.advance_to_next(), None);
    }
}
