//! On-screen controls visibility and the auto-hide timer.
//!
//! Showing the controls (or any user activity while they are shown) arms a
//! single hide timer. The timer never runs while paused.

use log::trace;
use std::sync::Arc;

use super::coordinator::CoordinatorInner;

impl CoordinatorInner {
    pub(super) fn show_controls(self: &Arc<Self>) {
        self.view.send_if_modified(|view| {
            !std::mem::replace(&mut view.controls_visible, true)
        });
        self.arm_hide_timer();
    }

    pub(super) fn hide_controls(&self) {
        self.controls_timer.cancel();
        self.view.send_if_modified(|view| {
            std::mem::replace(&mut view.controls_visible, false)
        });
    }

    pub(super) fn toggle_controls(self: &Arc<Self>) {
        let visible = self.view.borrow().controls_visible;
        if visible {
            self.hide_controls();
        } else {
            self.show_controls();
        }
    }

    pub(super) fn reset_controls_hide_timer(self: &Arc<Self>) {
        let visible = self.view.borrow().controls_visible;
        if visible {
            self.arm_hide_timer();
        }
    }

    pub(super) fn arm_hide_timer(self: &Arc<Self>) {
        let paused = self.view.borrow().is_paused;
        if paused {
            self.controls_timer.cancel();
            return;
        }

        let delay = self.config.controls_hide_delay();
        let weak = Arc::downgrade(self);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let hidden = inner.view.send_if_modified(|view| {
                if view.is_paused || !view.controls_visible {
                    return false;
                }
                view.controls_visible = false;
                true
            });
            if hidden {
                trace!("[Coordinator] Controls hidden after {:?}", delay);
            }
        });
        self.controls_timer.replace(handle);
    }
}
