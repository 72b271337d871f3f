//! Feed-level playback tests: several sessions sharing one register.

use std::sync::Arc;

use async_trait::async_trait;
use clipfeed_core::VideoId;
use clipfeed_playback::{
    ActiveVideoCoordinator, PlaybackDriver, PlayerSession, PlayerState, SessionOptions,
};

struct SilentDriver;

#[async_trait]
impl PlaybackDriver for SilentDriver {
    async fn play(&self) -> anyhow::Result<()> {
        Ok(())
    }
    async fn pause(&self) -> anyhow::Result<()> {
        Ok(())
    }
    async fn seek_to(&self, _position_millis: u64) -> anyhow::Result<()> {
        Ok(())
    }
    async fn replay(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

async fn mount_feed(coordinator: &ActiveVideoCoordinator, ids: &[&str]) -> Vec<PlayerSession> {
    let mut sessions = Vec::with_capacity(ids.len());
    for id in ids {
        sessions.push(
            PlayerSession::mount(
                VideoId::from(*id),
                Arc::new(SilentDriver),
                coordinator.clone(),
                SessionOptions::default(),
            )
            .await,
        );
    }
    sessions
}

async fn sync_all(sessions: &mut [PlayerSession]) {
    for session in sessions.iter_mut() {
        session.sync_authorization().await;
    }
}

fn playing(sessions: &[PlayerSession]) -> Vec<String> {
    sessions
        .iter()
        .filter(|s| s.state() == PlayerState::Playing)
        .map(|s| s.id().to_string())
        .collect()
}

fn authorized(sessions: &[PlayerSession]) -> usize {
    sessions.iter().filter(|s| s.is_authorized()).count()
}

#[tokio::test]
async fn test_at_most_one_player_authorized_after_any_sequence() {
    let coordinator = ActiveVideoCoordinator::new();
    let mut feed = mount_feed(&coordinator, &["p1", "p2", "p3", "p4"]).await;

    let steps: Vec<fn(&ActiveVideoCoordinator)> = vec![
        |c| c.set_active(VideoId::from("p1")),
        |c| c.set_active(VideoId::from("p3")),
        |c| c.set_fullscreen(true),
        |c| c.set_active(VideoId::from("p2")),
        |c| c.set_fullscreen(false),
        |c| {
            c.restore_previous();
        },
        |c| c.clear_active(),
        |c| c.handoff(&VideoId::from("p1"), VideoId::from("p4")),
        |c| {
            c.release(&VideoId::from("p2"));
        },
    ];

    for step in steps {
        step(&coordinator);
        sync_all(&mut feed).await;
        assert!(authorized(&feed) <= 1);
        assert!(playing(&feed).len() <= 1);
    }

    assert_eq!(playing(&feed), vec!["p4".to_string()]);
}

#[tokio::test]
async fn test_restore_previous_after_fullscreen_story() {
    let coordinator = ActiveVideoCoordinator::new();
    coordinator.set_active(VideoId::from("a"));
    let mut feed = mount_feed(&coordinator, &["a", "b"]).await;

    coordinator.set_active(VideoId::from("b"));
    sync_all(&mut feed).await;
    assert_eq!(playing(&feed), vec!["b".to_string()]);

    // Opening a story overlays everything.
    coordinator.set_fullscreen(true);
    coordinator.clear_active();
    sync_all(&mut feed).await;
    assert!(playing(&feed).is_empty());

    coordinator.set_fullscreen(false);
    assert_eq!(coordinator.restore_previous(), Some(VideoId::from("b")));
    sync_all(&mut feed).await;
    assert_eq!(playing(&feed), vec!["b".to_string()]);
}

#[tokio::test]
async fn test_scroll_handoff_moves_sound_to_next_post() {
    let coordinator = ActiveVideoCoordinator::new();
    coordinator.set_active(VideoId::from("a"));
    let mut feed = mount_feed(&coordinator, &["a", "b"]).await;
    let mut rx = coordinator.subscribe();

    coordinator.handoff(&VideoId::from("a"), VideoId::from("b"));
    rx.changed().await.unwrap();
    let snapshot = rx.borrow_and_update().clone();
    assert_eq!(snapshot.active_id, Some(VideoId::from("b")));
    assert_eq!(snapshot.previous_id, Some(VideoId::from("a")));

    sync_all(&mut feed).await;
    assert_eq!(playing(&feed), vec!["b".to_string()]);
}

#[tokio::test]
async fn test_unmount_leaves_register_to_screen() {
    let coordinator = ActiveVideoCoordinator::new();
    coordinator.set_active(VideoId::from("a"));
    let mut feed = mount_feed(&coordinator, &["a"]).await;

    feed[0].unmount().await;
    assert_eq!(feed[0].state(), PlayerState::Idle);
    assert_eq!(coordinator.active_id(), Some(VideoId::from("a")));

    assert!(coordinator.release(feed[0].id()));
    assert_eq!(coordinator.active_id(), None);
}

#[tokio::test]
async fn test_subscriber_task_follows_register() {
    let coordinator = ActiveVideoCoordinator::new();
    let mut rx = coordinator.subscribe();

    let watcher = tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let active = rx.borrow_and_update().active_id.clone();
            seen.push(active.clone());
            if active == Some(VideoId::from("done")) {
                break;
            }
        }
        seen
    });

    coordinator.set_active(VideoId::from("a"));
    tokio::task::yield_now().await;
    coordinator.set_active(VideoId::from("done"));

    let seen = watcher.await.unwrap();
    assert_eq!(seen.last(), Some(&Some(VideoId::from("done"))));
}
