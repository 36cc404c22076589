use super::*;

#[test]
fn liking_bumps_count_and_clears_busy() {
    let likes = Likes { count: 4, liked: false, busy: true }.toggled();
    assert_eq!(likes, Likes { count: 5, liked: true, busy: false });
}

#[test]
fn unliking_never_goes_below_zero() {
    let likes = Likes { count: 0, liked: true, busy: true }.toggled();
    assert_eq!(likes.count, 0);
    assert!(!likes.liked);
}

#[test]
fn label_and_heart_track_like_state() {
    let idle = Likes::default();
    assert_eq!((idle.label(), idle.heart()), ("Like this brick", "♡"));
    let liked = Likes { liked: true, ..Likes::default() };
    assert_eq!((liked.label(), liked.heart()), ("Liked", "♥"));
}
