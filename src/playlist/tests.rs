use std::path::PathBuf;

use uuid::Uuid;

use crate::library::Track;

use super::{Playlist, RemoveOutcome};

fn t(title: &str) -> Track {
    Track {
        id: Uuid::new_v4(),
        title: title.into(),
        album: String::new(),
        artist: String::new(),
        year: String::new(),
        duration_ms: 180_000,
        duration_display: "03:00".into(),
        path: PathBuf::new(),
        file_size: 0,
        frame_count: 6_890,
        ms_per_frame: 26.122,
    }
}

fn playlist_of(titles: &[&str]) -> Playlist {
    let mut pl = Playlist::new();
    for title in titles {
        pl.add(t(title));
    }
    pl
}

fn titles(pl: &Playlist) -> Vec<String> {
    pl.display_rows().into_iter().map(|r| r.title).collect()
}

fn ids(pl: &Playlist) -> Vec<Uuid> {
    pl.display_rows().into_iter().map(|r| r.id).collect()
}

#[test]
fn empty_playlist_has_neither_next_nor_previous() {
    let mut pl = Playlist::new();
    assert!(!pl.has_next());
    assert!(!pl.has_previous());

    pl.toggle_loop();
    assert!(!pl.has_next());
    assert!(!pl.has_previous());
}

#[test]
fn next_index_at_end_stays_without_loop_and_wraps_with_loop() {
    let mut pl = playlist_of(&["A", "B", "C"]);
    pl.set_current_index(2);

    assert_eq!(pl.next_index(), 2);
    assert!(!pl.has_next());

    pl.toggle_loop();
    assert_eq!(pl.next_index(), 0);
    assert!(pl.has_next());
}

#[test]
fn previous_index_at_start_stays_without_loop_and_wraps_with_loop() {
    let mut pl = playlist_of(&["A", "B", "C"]);

    assert_eq!(pl.previous_index(), 0);
    assert!(!pl.has_previous());

    pl.toggle_loop();
    assert_eq!(pl.previous_index(), 2);
    assert!(pl.has_previous());
}

#[test]
fn middle_of_playlist_navigates_both_ways() {
    let mut pl = playlist_of(&["A", "B", "C"]);
    pl.set_current_index(1);

    assert_eq!(pl.next_index(), 2);
    assert_eq!(pl.previous_index(), 0);
    assert!(pl.has_next());
    assert!(pl.has_previous());
}

#[test]
fn set_current_index_ignores_out_of_bounds() {
    let mut pl = playlist_of(&["A", "B"]);
    pl.set_current_index(1);
    pl.set_current_index(5);
    assert_eq!(pl.current_index(), 1);
}

#[test]
fn remove_current_reports_current_removed() {
    let mut pl = playlist_of(&["A", "B", "C"]);
    pl.set_current_index(1);
    assert_eq!(pl.remove(1), RemoveOutcome::CurrentRemoved);
    assert_eq!(titles(&pl), vec!["A", "C"]);
}

#[test]
fn remove_other_reports_removed() {
    let mut pl = playlist_of(&["A", "B", "C"]);
    pl.set_current_index(0);
    assert_eq!(pl.remove(2), RemoveOutcome::Removed);
    assert_eq!(titles(&pl), vec!["A", "B"]);
}

#[test]
fn remove_out_of_range_is_not_found_and_leaves_list_unchanged() {
    let mut pl = playlist_of(&["A", "B"]);
    assert_eq!(pl.remove(2), RemoveOutcome::NotFound);
    assert_eq!(pl.remove(usize::MAX), RemoveOutcome::NotFound);
    assert_eq!(titles(&pl), vec!["A", "B"]);
}

#[test]
fn remove_below_cursor_does_not_shift_it() {
    // Historical behavior, preserved deliberately: the cursor now points at
    // a different track.
    let mut pl = playlist_of(&["A", "B", "C"]);
    pl.set_current_index(2);
    let before = pl.get(2).unwrap().id;

    assert_eq!(pl.remove(0), RemoveOutcome::Removed);
    assert_eq!(pl.current_index(), 2);
    assert_ne!(pl.get(pl.current_index()).map(|t| t.id), Some(before));
}

#[test]
fn get_returns_copy_and_none_out_of_range() {
    let pl = playlist_of(&["A"]);
    assert_eq!(pl.get(0).unwrap().title, "A");
    assert!(pl.get(1).is_none());
}

#[test]
fn find_index_locates_by_id() {
    let pl = playlist_of(&["A", "B", "C"]);
    let id = pl.get(1).unwrap().id;
    assert_eq!(pl.find_index(id), Some(1));
    assert_eq!(pl.find_index(Uuid::new_v4()), None);
}

#[test]
fn shuffle_round_trip_restores_order_and_cursor_identity() {
    let mut pl = playlist_of(&["A", "B", "C", "D", "E"]);
    let original = ids(&pl);
    pl.set_current_index(3);
    let current_id = pl.get(3).unwrap().id;

    pl.toggle_shuffle(true);
    assert!(pl.is_shuffled());

    pl.toggle_shuffle(false);
    assert!(!pl.is_shuffled());
    assert_eq!(ids(&pl), original);
    assert_eq!(pl.get(pl.current_index()).unwrap().id, current_id);
}

#[test]
fn shuffle_keep_current_pins_current_track_at_top() {
    let mut pl = playlist_of(&["A", "B", "C"]);
    pl.set_current_index(1);
    let current_id = pl.get(1).unwrap().id;

    pl.toggle_shuffle(true);
    assert_eq!(pl.current_index(), 0);
    assert_eq!(pl.get(0).unwrap().id, current_id);
    assert_eq!(pl.len(), 3);
}

#[test]
fn shuffle_without_keep_current_resets_cursor_to_top() {
    let mut pl = playlist_of(&["A", "B", "C"]);
    pl.set_current_index(2);
    pl.toggle_shuffle(false);
    assert_eq!(pl.current_index(), 0);
    assert_eq!(pl.len(), 3);
}

#[test]
fn unshuffle_relocates_cursor_even_after_shuffled_navigation() {
    let mut pl = playlist_of(&["A", "B", "C", "D"]);
    pl.set_current_index(1);
    pl.toggle_shuffle(true);

    // Navigate somewhere else inside the shuffled order.
    pl.set_current_index(2);
    let current_id = pl.get(2).unwrap().id;

    pl.toggle_shuffle(false);
    assert_eq!(pl.get(pl.current_index()).unwrap().id, current_id);
}

#[test]
fn add_while_shuffled_joins_shadow_order_for_restore() {
    let mut pl = playlist_of(&["A", "B"]);
    pl.toggle_shuffle(false);

    pl.add(t("C"));
    assert_eq!(pl.len(), 3);

    pl.toggle_shuffle(false);
    // Restored order is the pre-shuffle order plus the appended track.
    assert_eq!(titles(&pl), vec!["A", "B", "C"]);
}

#[test]
fn remove_while_shuffled_also_drops_from_shadow_order() {
    let mut pl = playlist_of(&["A", "B", "C"]);
    pl.toggle_shuffle(false);

    let gone = pl.get(1).unwrap().id;
    assert_ne!(pl.remove(1), RemoveOutcome::NotFound);

    pl.toggle_shuffle(false);
    assert_eq!(pl.len(), 2);
    assert!(pl.find_index(gone).is_none());
}

#[test]
fn next_command_scenario_ends_without_wrapping() {
    // Playlist [A,B,C], current=B, loop off: next moves to C, then no next.
    let mut pl = playlist_of(&["A", "B", "C"]);
    pl.set_current_index(1);

    assert_eq!(pl.next_index(), 2);
    pl.set_current_index(2);
    assert_eq!(titles(&pl)[pl.current_index()], "C");
    assert!(!pl.has_next());
}

#[test]
fn toggle_loop_flips_flag() {
    let mut pl = Playlist::new();
    assert!(!pl.is_looping());
    pl.toggle_loop();
    assert!(pl.is_looping());
    pl.toggle_loop();
    assert!(!pl.is_looping());
}
