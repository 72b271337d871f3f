//! Active-video register
//!
//! Tracks which video may currently play with sound. The register is an injected handle,
//! not a process global: screens share one [`ActiveVideoCoordinator`] by cloning it, and
//! tests build a fresh one per case.
//!
//! Changes are published over a `tokio::sync::watch` channel. Subscribers always read the
//! latest snapshot, so a player never acts on a stale active id once it has been notified.
//! Writes are last-write-wins; gesture handlers that both leave one video and enter another
//! should use [`ActiveVideoCoordinator::handoff`].

use std::sync::Arc;

use clipfeed_core::VideoId;
use tokio::sync::watch;

use crate::authorization::may_play_with_sound;

/// Point-in-time view of the register.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterSnapshot {
    pub active_id: Option<VideoId>,
    /// Last non-none active id before the most recent change.
    pub previous_id: Option<VideoId>,
    pub fullscreen: bool,
}

impl RegisterSnapshot {
    /// Returns true when the active id actually changed.
    fn activate(&mut self, id: Option<VideoId>) -> bool {
        if self.active_id == id {
            return false;
        }
        if let Some(current) = self.active_id.take() {
            self.previous_id = Some(current);
        }
        self.active_id = id;
        true
    }

    fn release(&mut self, id: &VideoId) -> bool {
        if self.active_id.as_ref() == Some(id) {
            self.activate(None)
        } else {
            false
        }
    }

    pub fn authorizes(&self, my_id: &VideoId, held_paused: bool) -> bool {
        may_play_with_sound(my_id, self.active_id.as_ref(), self.fullscreen, held_paused)
    }
}

/// Cloneable handle to one active-video register.
#[derive(Clone, Debug)]
pub struct ActiveVideoCoordinator {
    tx: Arc<watch::Sender<RegisterSnapshot>>,
}

impl Default for ActiveVideoCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveVideoCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RegisterSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> RegisterSnapshot {
        self.tx.borrow().clone()
    }

    pub fn active_id(&self) -> Option<VideoId> {
        self.tx.borrow().active_id.clone()
    }

    pub fn previous_id(&self) -> Option<VideoId> {
        self.tx.borrow().previous_id.clone()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.tx.borrow().fullscreen
    }

    /// Receiver notified on every change of the register.
    pub fn subscribe(&self) -> watch::Receiver<RegisterSnapshot> {
        self.tx.subscribe()
    }

    pub fn is_authorized(&self, my_id: &VideoId, held_paused: bool) -> bool {
        self.tx.borrow().authorizes(my_id, held_paused)
    }

    pub fn set_active(&self, id: VideoId) {
        let changed = self.tx.send_if_modified(|s| s.activate(Some(id.clone())));
        if changed {
            tracing::debug!(active_id = %id, "Active video changed");
        }
    }

    pub fn clear_active(&self) {
        if self.tx.send_if_modified(|s| s.activate(None)) {
            tracing::debug!("Active video cleared");
        }
    }

    /// Clear the register only if `id` is the active video.
    pub fn release(&self, id: &VideoId) -> bool {
        let released = self.tx.send_if_modified(|s| s.release(id));
        if released {
            tracing::debug!(video_id = %id, "Active video released");
        }
        released
    }

    /// Make the previous id active again. Returns the restored id, or `None` when there is
    /// nothing to restore.
    pub fn restore_previous(&self) -> Option<VideoId> {
        let mut restored = None;
        self.tx.send_if_modified(|s| {
            let Some(previous) = s.previous_id.clone() else {
                return false;
            };
            restored = Some(previous.clone());
            s.activate(Some(previous))
        });
        if let Some(id) = &restored {
            tracing::debug!(active_id = %id, "Previous video restored");
        }
        restored
    }

    pub fn set_fullscreen(&self, fullscreen: bool) {
        let changed = self.tx.send_if_modified(|s| {
            if s.fullscreen == fullscreen {
                return false;
            }
            s.fullscreen = fullscreen;
            true
        });
        if changed {
            tracing::debug!(fullscreen, "Fullscreen toggled");
        }
    }

    /// Leave `from` and activate `to` as a single update.
    pub fn handoff(&self, from: &VideoId, to: VideoId) {
        self.tx.send_if_modified(|s| {
            let released = s.release(from);
            let activated = s.activate(Some(to.clone()));
            released || activated
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> VideoId {
        VideoId::from(s)
    }

    #[test]
    fn set_active_tracks_previous() {
        let coordinator = ActiveVideoCoordinator::new();
        coordinator.set_active(id("a"));
        assert_eq!(coordinator.previous_id(), None);
        coordinator.set_active(id("b"));
        assert_eq!(coordinator.active_id(), Some(id("b")));
        assert_eq!(coordinator.previous_id(), Some(id("a")));
    }

    #[test]
    fn setting_same_id_keeps_previous() {
        let coordinator = ActiveVideoCoordinator::new();
        coordinator.set_active(id("a"));
        coordinator.set_active(id("b"));
        coordinator.set_active(id("b"));
        assert_eq!(coordinator.previous_id(), Some(id("a")));
    }

    #[test]
    fn restore_without_previous_is_noop() {
        let coordinator = ActiveVideoCoordinator::new();
        assert_eq!(coordinator.restore_previous(), None);
        assert_eq!(coordinator.active_id(), None);

        coordinator.set_active(id("a"));
        assert_eq!(coordinator.restore_previous(), None);
        assert_eq!(coordinator.active_id(), Some(id("a")));
    }

    #[test]
    fn release_only_clears_own_id() {
        let coordinator = ActiveVideoCoordinator::new();
        coordinator.set_active(id("b"));
        assert!(!coordinator.release(&id("a")));
        assert_eq!(coordinator.active_id(), Some(id("b")));
        assert!(coordinator.release(&id("b")));
        assert_eq!(coordinator.active_id(), None);
        assert_eq!(coordinator.previous_id(), Some(id("b")));
    }

    #[test]
    fn handoff_after_stale_release_keeps_new_video() {
        let coordinator = ActiveVideoCoordinator::new();
        coordinator.set_active(id("a"));
        coordinator.handoff(&id("a"), id("b"));
        // The scrolled-away player reporting late must not clear b.
        coordinator.release(&id("a"));
        assert_eq!(coordinator.active_id(), Some(id("b")));
        assert_eq!(coordinator.previous_id(), Some(id("a")));
    }

    #[test]
    fn fullscreen_revokes_everyone() {
        let coordinator = ActiveVideoCoordinator::new();
        coordinator.set_active(id("a"));
        assert!(coordinator.is_authorized(&id("a"), false));
        coordinator.set_fullscreen(true);
        assert!(!coordinator.is_authorized(&id("a"), false));
        coordinator.set_fullscreen(false);
        assert!(coordinator.is_authorized(&id("a"), false));
    }

    #[tokio::test]
    async fn subscribers_see_latest_value() {
        let coordinator = ActiveVideoCoordinator::new();
        let mut rx = coordinator.subscribe();

        coordinator.set_active(id("a"));
        coordinator.set_active(id("b"));

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().active_id, Some(id("b")));
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn redundant_writes_do_not_notify() {
        let coordinator = ActiveVideoCoordinator::new();
        let rx = coordinator.subscribe();

        coordinator.clear_active();
        coordinator.set_fullscreen(false);
        assert!(!rx.has_changed().unwrap());
    }
}
