//! Clipfeed Playback
//!
//! Keeps at most one video in a scrolling feed playing with sound. Screens share one
//! [`ActiveVideoCoordinator`]; every mounted player owns a [`PlayerSession`] that asks the
//! coordinator, through [`may_play_with_sound`], whether it may play.

pub mod authorization;
pub mod coordinator;
pub mod seek;
pub mod session;

pub use authorization::may_play_with_sound;
pub use coordinator::{ActiveVideoCoordinator, RegisterSnapshot};
pub use seek::{fraction_to_millis, scrub_fraction, PlayerSeekState};
pub use session::{
    LoopPolicy, PauseOrigin, PlaybackDriver, PlayerEvent, PlayerSession, PlayerState,
    SessionOptions,
};
