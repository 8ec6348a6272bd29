use log::trace;
use parking_lot::Mutex;
use tokio::task::JoinHandle;

/// Holder for at most one live timer task of a kind.
///
/// Arming a new task aborts the previous one. Dropping the slot aborts
/// whatever is still running.
#[derive(Debug)]
pub struct TimerSlot {
    name: &'static str,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TimerSlot {
    /// Empty slot. `name` only appears in trace logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handle: Mutex::new(None),
        }
    }

    /// Arm the slot with `handle`, aborting whatever it held
    pub fn replace(&self, handle: JoinHandle<()>) {
        if let Some(previous) = self.handle.lock().replace(handle) {
            trace!("[Timer] Replacing {} timer", self.name);
            previous.abort();
        }
    }

    /// Abort the running task, if any
    pub fn cancel(&self) -> bool {
        match self.handle.lock().take() {
            Some(handle) => {
                trace!("[Timer] Cancelled {} timer", self.name);
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Forget the handle without aborting. Called by the task itself right
    /// before it acts, so a later `cancel` cannot abort it mid-action.
    pub fn release(&self) {
        self.handle.lock().take();
    }

    /// True while a task is held and has not finished
    pub fn is_armed(&self) -> bool {
        self.handle
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_task(counter: Arc<AtomicUsize>) -> JoinHandle<()> {
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_aborts_the_previous_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let slot = TimerSlot::new("test");
        slot.replace(counting_task(counter.clone()));
        slot.replace(counting_task(counter.clone()));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_and_drop_abort() {
        let counter = Arc::new(AtomicUsize::new(0));
        let slot = TimerSlot::new("test");
        slot.replace(counting_task(counter.clone()));
        assert!(slot.is_armed());
        assert!(slot.cancel());
        assert!(!slot.cancel());

        let dropped = TimerSlot::new("dropped");
        dropped.replace(counting_task(counter.clone()));
        drop(dropped);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
