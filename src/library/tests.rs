use std::path::Path;

use tempfile::tempdir;

use crate::config::LibrarySettings;
use crate::error::PlayerError;
use crate::testutil::write_silent_wav;

use super::display::format_mmss;
use super::probe::probe_track;
use super::scan::scan;

#[test]
fn format_mmss_rounds_down_and_pads() {
    assert_eq!(format_mmss(0), "00:00");
    assert_eq!(format_mmss(999), "00:00");
    assert_eq!(format_mmss(61_000), "01:01");
    assert_eq!(format_mmss(600_000), "10:00");
    // minutes are not capped at 59
    assert_eq!(format_mmss(3_600_000), "60:00");
}

#[test]
fn probe_track_missing_file_is_file_not_found() {
    let err = probe_track(Path::new("/nonexistent/track.mp3")).unwrap_err();
    assert!(matches!(err, PlayerError::FileNotFound(_)));
}

#[test]
fn probe_track_junk_bytes_is_no_audio_track() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("junk.mp3");
    std::fs::write(&path, b"definitely not an mp3").unwrap();

    let err = probe_track(&path).unwrap_err();
    assert!(matches!(err, PlayerError::NoAudioTrack(_)));
}

#[test]
fn probe_track_reads_timing_constants_from_wav() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tone.wav");
    write_silent_wav(&path, 2);

    let track = probe_track(&path).unwrap();
    assert_eq!(track.title, "tone");
    assert!(track.file_size > 44);
    assert!(track.ms_per_frame > 0.0);
    assert!(track.frame_count > 0);
    // two seconds of audio, within one frame of tolerance
    let total = track.frame_count as f64 * track.ms_per_frame;
    assert!((total - 2000.0).abs() < track.ms_per_frame + 1.0, "total {total}");
    assert_eq!(track.duration_display, "00:02");
}

#[test]
fn probe_assigns_unique_ids() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a.wav");
    write_silent_wav(&path, 1);

    let first = probe_track(&path).unwrap();
    let second = probe_track(&path).unwrap();
    assert_ne!(first.id, second.id);
}

#[test]
fn scan_skips_undecodable_files_and_sorts_by_title() {
    let dir = tempdir().unwrap();
    write_silent_wav(&dir.path().join("b.wav"), 1);
    write_silent_wav(&dir.path().join("A.wav"), 1);
    std::fs::write(dir.path().join("broken.wav"), b"junk").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"ignore me").unwrap();

    let settings = LibrarySettings {
        extensions: vec!["wav".into()],
        ..LibrarySettings::default()
    };
    let tracks = scan(dir.path(), &settings);
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].title, "A");
    assert_eq!(tracks[1].title, "b");
}

#[test]
fn scan_respects_include_hidden_false() {
    let dir = tempdir().unwrap();
    write_silent_wav(&dir.path().join(".hidden.wav"), 1);
    write_silent_wav(&dir.path().join("visible.wav"), 1);

    let settings = LibrarySettings {
        extensions: vec!["wav".into()],
        include_hidden: false,
        ..LibrarySettings::default()
    };
    let tracks = scan(dir.path(), &settings);

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].title, "visible");
}

#[test]
fn scan_respects_recursive_false() {
    let dir = tempdir().unwrap();
    write_silent_wav(&dir.path().join("root.wav"), 1);
    let sub = dir.path().join("sub");
    std::fs::create_dir_all(&sub).unwrap();
    write_silent_wav(&sub.join("child.wav"), 1);

    let settings = LibrarySettings {
        extensions: vec!["wav".into()],
        recursive: false,
        ..LibrarySettings::default()
    };
    let tracks = scan(dir.path(), &settings);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].title, "root");
}

#[test]
fn scan_respects_max_depth() {
    let dir = tempdir().unwrap();
    let d1 = dir.path().join("d1");
    let d2 = d1.join("d2");
    std::fs::create_dir_all(&d2).unwrap();
    write_silent_wav(&dir.path().join("root.wav"), 1);
    write_silent_wav(&d1.join("one.wav"), 1);
    write_silent_wav(&d2.join("two.wav"), 1);

    // WalkDir depth counts root as 0, children as 1, grandchildren as 2...
    // With max_depth=2 we should see root + d1/*, but not d1/d2/*.
    let settings = LibrarySettings {
        extensions: vec!["wav".into()],
        max_depth: Some(2),
        ..LibrarySettings::default()
    };
    let tracks = scan(dir.path(), &settings);

    let names: Vec<String> = tracks.iter().map(|t| t.title.clone()).collect();
    assert!(names.contains(&"root".to_string()));
    assert!(names.contains(&"one".to_string()));
    assert!(!names.contains(&"two".to_string()));
}
