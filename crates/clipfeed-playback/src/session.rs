//! Per-player playback state machine
//!
//! A [`PlayerSession`] is created when a player mounts and dropped when it unmounts. It owns
//! the seek state of one video and drives the underlying media player through the
//! [`PlaybackDriver`] seam. Authorization always comes from the shared
//! [`ActiveVideoCoordinator`]; the session never caches the active id.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clipfeed_core::constants::{LONG_PRESS_MILLIS, PAUSE_ICON_MILLIS};
use clipfeed_core::{PlaybackStatus, VideoId};
use tokio::time::Instant;

use crate::coordinator::ActiveVideoCoordinator;
use crate::seek::{fraction_to_millis, scrub_fraction, PlayerSeekState};

/// Underlying media player. Implemented by the embedding client.
#[async_trait]
pub trait PlaybackDriver: Send + Sync {
    async fn play(&self) -> anyhow::Result<()>;
    async fn pause(&self) -> anyhow::Result<()>;
    async fn seek_to(&self, position_millis: u64) -> anyhow::Result<()>;
    /// Restart from the beginning.
    async fn replay(&self) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
    Paused,
    Scrubbing,
}

/// What put a session into [`PlayerState::Paused`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseOrigin {
    User,
    Hold,
    Revoked,
    Scrub,
}

/// Behavior when the video reaches its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopPolicy {
    #[default]
    Replay,
    Stop,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub loop_policy: LoopPolicy,
    /// Start playing on mount when the register authorizes this player.
    pub autoplay: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            loop_policy: LoopPolicy::Replay,
            autoplay: true,
        }
    }
}

/// Notifications for the owning screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    Replayed,
    Ended,
    Error { video_id: VideoId, message: String },
}

pub struct PlayerSession {
    id: VideoId,
    driver: Arc<dyn PlaybackDriver>,
    coordinator: ActiveVideoCoordinator,
    options: SessionOptions,
    state: PlayerState,
    seek: PlayerSeekState,
    pause_origin: Option<PauseOrigin>,
    /// Register-only authorization seen at the last sync.
    was_authorized: bool,
    resume_after_scrub: bool,
    pause_icon_shown_at: Option<Instant>,
}

impl std::fmt::Debug for PlayerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("seek", &self.seek)
            .field("pause_origin", &self.pause_origin)
            .finish()
    }
}

impl PlayerSession {
    pub async fn mount(
        id: VideoId,
        driver: Arc<dyn PlaybackDriver>,
        coordinator: ActiveVideoCoordinator,
        options: SessionOptions,
    ) -> Self {
        let was_authorized = coordinator.is_authorized(&id, false);
        let mut session = Self {
            id,
            driver,
            coordinator,
            options,
            state: PlayerState::Idle,
            seek: PlayerSeekState::default(),
            pause_origin: None,
            was_authorized,
            resume_after_scrub: false,
            pause_icon_shown_at: None,
        };

        if options.autoplay && was_authorized {
            session.start().await;
        }
        tracing::debug!(video_id = %session.id, state = ?session.state, "Player mounted");
        session
    }

    pub fn id(&self) -> &VideoId {
        &self.id
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn seek_state(&self) -> PlayerSeekState {
        self.seek
    }

    pub fn pause_origin(&self) -> Option<PauseOrigin> {
        self.pause_origin
    }

    /// Whether this player may currently play with sound.
    pub fn is_authorized(&self) -> bool {
        self.coordinator.is_authorized(&self.id, self.seek.is_held_paused)
    }

    /// Re-evaluate authorization after a register change.
    ///
    /// Returns true when the session changed state.
    pub async fn sync_authorization(&mut self) -> bool {
        let authorized = self.coordinator.is_authorized(&self.id, false);
        let newly_authorized = authorized && !self.was_authorized;
        self.was_authorized = authorized;

        match self.state {
            PlayerState::Playing if !authorized => {
                self.stop(PauseOrigin::Revoked).await;
                true
            }
            PlayerState::Idle | PlayerState::Paused
                if newly_authorized && self.resumes_on_authorization() =>
            {
                self.start().await;
                true
            }
            PlayerState::Scrubbing if !authorized => {
                self.resume_after_scrub = false;
                false
            }
            _ => false,
        }
    }

    /// Single tap on the video surface.
    pub async fn tap(&mut self, now: Instant) -> PlayerState {
        match self.state {
            PlayerState::Playing => {
                self.stop(PauseOrigin::User).await;
                self.pause_icon_shown_at = Some(now);
            }
            PlayerState::Paused | PlayerState::Idle => {
                self.coordinator.set_active(self.id.clone());
                self.seek.is_held_paused = false;
                self.was_authorized = self.coordinator.is_authorized(&self.id, false);
                if self.was_authorized {
                    self.start().await;
                }
            }
            PlayerState::Scrubbing => {}
        }
        self.state
    }

    /// Long-press gesture held for `held_for`. Returns true when it paused playback.
    pub async fn long_press(&mut self, held_for: Duration) -> bool {
        if self.state != PlayerState::Playing
            || held_for <= Duration::from_millis(LONG_PRESS_MILLIS)
        {
            return false;
        }
        self.seek.is_held_paused = true;
        self.stop(PauseOrigin::Hold).await;
        true
    }

    /// End of a long-press. Resumes only a hold-induced pause.
    pub async fn release(&mut self) -> bool {
        if !self.seek.is_held_paused {
            return false;
        }
        self.seek.is_held_paused = false;
        if self.state == PlayerState::Paused
            && self.pause_origin == Some(PauseOrigin::Hold)
            && self.is_authorized()
        {
            self.start().await;
            return true;
        }
        false
    }

    pub async fn begin_scrub(&mut self) {
        if self.state == PlayerState::Scrubbing {
            return;
        }
        self.resume_after_scrub = self.state == PlayerState::Playing;
        if self.resume_after_scrub {
            self.pause_driver().await;
        }
        self.state = PlayerState::Scrubbing;
        self.seek.is_scrubbing = true;
        self.pause_icon_shown_at = None;
    }

    /// Move the scrub position to `x` on a bar `bar_width` wide. Returns the new position.
    pub fn scrub_to(&mut self, x: f64, bar_width: f64) -> u64 {
        if self.seek.is_scrubbing {
            self.seek.position_millis =
                fraction_to_millis(scrub_fraction(x, bar_width), self.seek.duration_millis);
        }
        self.seek.position_millis
    }

    /// Finish the drag: seek, then resume, then hand the clock back to status updates.
    pub async fn end_scrub(&mut self) {
        if self.state != PlayerState::Scrubbing {
            return;
        }

        let target = self.seek.position_millis;
        if let Err(e) = self.driver.seek_to(target).await {
            tracing::warn!(video_id = %self.id, position_millis = target, error = %e, "Seek failed");
        }

        if self.resume_after_scrub && self.is_authorized() {
            self.start().await;
        } else {
            self.state = PlayerState::Paused;
            self.pause_origin = Some(PauseOrigin::Scrub);
        }
        self.resume_after_scrub = false;
        self.seek.is_scrubbing = false;
    }

    pub async fn on_status(&mut self, status: PlaybackStatus) -> Option<PlayerEvent> {
        let PlaybackStatus::Loaded {
            position_millis,
            duration_millis,
            did_just_finish,
        } = status
        else {
            return None;
        };

        self.seek.apply_clock(position_millis, duration_millis);

        if !did_just_finish || self.state != PlayerState::Playing {
            return None;
        }

        match self.options.loop_policy {
            LoopPolicy::Replay => {
                if let Err(e) = self.driver.replay().await {
                    tracing::warn!(video_id = %self.id, error = %e, "Replay failed");
                }
                Some(PlayerEvent::Replayed)
            }
            LoopPolicy::Stop => {
                self.state = PlayerState::Idle;
                self.pause_origin = None;
                Some(PlayerEvent::Ended)
            }
        }
    }

    /// Player-reported failure, forwarded to the owning screen.
    pub fn on_error(&self, message: impl Into<String>) -> PlayerEvent {
        let message = message.into();
        tracing::warn!(video_id = %self.id, error = %message, "Player reported an error");
        PlayerEvent::Error {
            video_id: self.id.clone(),
            message,
        }
    }

    /// Best-effort pause on teardown. The register is left to the owning screen.
    pub async fn unmount(&mut self) {
        self.pause_driver().await;
        self.state = PlayerState::Idle;
        self.pause_origin = None;
        self.seek.is_scrubbing = false;
        self.seek.is_held_paused = false;
        self.pause_icon_shown_at = None;
        tracing::debug!(video_id = %self.id, "Player unmounted");
    }

    pub fn pause_icon_visible(&self, now: Instant) -> bool {
        if self.state != PlayerState::Paused {
            return false;
        }
        self.pause_icon_shown_at.is_some_and(|shown| {
            now.saturating_duration_since(shown) < Duration::from_millis(PAUSE_ICON_MILLIS)
        })
    }

    /// Only a pause the register caused is undone by the register. User, hold and scrub
    /// pauses wait for a gesture.
    fn resumes_on_authorization(&self) -> bool {
        match self.state {
            PlayerState::Idle => !self.seek.is_held_paused,
            PlayerState::Paused => self.pause_origin == Some(PauseOrigin::Revoked),
            _ => false,
        }
    }

    async fn start(&mut self) {
        if let Err(e) = self.driver.play().await {
            tracing::warn!(video_id = %self.id, error = %e, "Play failed");
        }
        self.state = PlayerState::Playing;
        self.pause_origin = None;
        self.pause_icon_shown_at = None;
    }

    async fn stop(&mut self, origin: PauseOrigin) {
        self.pause_driver().await;
        self.state = PlayerState::Paused;
        self.pause_origin = Some(origin);
    }

    async fn pause_driver(&self) {
        if let Err(e) = self.driver.pause().await {
            tracing::warn!(video_id = %self.id, error = %e, "Pause failed");
        }
    }
}
