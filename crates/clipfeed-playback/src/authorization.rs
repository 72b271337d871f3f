use clipfeed_core::VideoId;

/// Whether the player `my_id` may play with sound.
///
/// Every player must decide through this function; it is the only place the rule lives.
pub fn may_play_with_sound(
    my_id: &VideoId,
    active_id: Option<&VideoId>,
    fullscreen: bool,
    held_paused: bool,
) -> bool {
    active_id == Some(my_id) && !fullscreen && !held_paused
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_id_is_authorized() {
        let a = VideoId::from("a");
        let b = VideoId::from("b");
        assert!(may_play_with_sound(&a, Some(&a), false, false));
        assert!(!may_play_with_sound(&b, Some(&a), false, false));
        assert!(!may_play_with_sound(&a, None, false, false));
    }

    #[test]
    fn fullscreen_and_hold_revoke() {
        let a = VideoId::from("a");
        assert!(!may_play_with_sound(&a, Some(&a), true, false));
        assert!(!may_play_with_sound(&a, Some(&a), false, true));
    }
}
