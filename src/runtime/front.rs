//! Line-oriented front end.
//!
//! Reads commands from stdin, prints events and listings to stdout. This is
//! the reference consumer of the player's boundary: it only ever touches the
//! command channel, the snapshot handle and the event stream.

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::thread;

use crate::library::probe_track;
use crate::player::{Player, PlayerCmd, TransportState};
use crate::ui::UiEvent;

pub fn run(player: &Player, ui_rx: Receiver<UiEvent>) -> Result<(), Box<dyn std::error::Error>> {
    thread::spawn(move || {
        while let Ok(event) = ui_rx.recv() {
            print_event(&event);
        }
    });

    println!("vivace ready; type 'help' for commands");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match parse(&line) {
            Some(Command::Quit) => break,
            Some(cmd) => execute(player, cmd),
            None => {
                if !line.trim().is_empty() {
                    println!("unrecognized command; type 'help'");
                }
            }
        }
    }
    Ok(())
}

#[derive(Debug, PartialEq)]
enum Command {
    Help,
    List,
    Status,
    Play(usize),
    Add(PathBuf),
    Remove(usize),
    Next,
    Previous,
    Shuffle,
    Loop,
    Pause,
    Stop,
    /// Seek target in milliseconds.
    Seek(u64),
    Quit,
}

/// Rows are one-based on the way in and out of the front end.
fn parse(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let cmd = match (words.next()?, words.next()) {
        ("help", None) => Command::Help,
        ("list" | "ls", None) => Command::List,
        ("status", None) => Command::Status,
        ("play", Some(n)) => Command::Play(parse_row(n)?),
        ("add", Some(path)) => Command::Add(PathBuf::from(path)),
        ("remove" | "rm", Some(n)) => Command::Remove(parse_row(n)?),
        ("next" | "n", None) => Command::Next,
        ("prev" | "previous", None) => Command::Previous,
        ("shuffle", None) => Command::Shuffle,
        ("loop", None) => Command::Loop,
        ("pause" | "p", None) => Command::Pause,
        ("stop", None) => Command::Stop,
        ("seek", Some(secs)) => Command::Seek(secs.parse::<u64>().ok()? * 1000),
        ("quit" | "q" | "exit", None) => Command::Quit,
        _ => return None,
    };
    words.next().is_none().then_some(cmd)
}

fn parse_row(word: &str) -> Option<usize> {
    word.parse::<usize>().ok().filter(|n| *n >= 1).map(|n| n - 1)
}

fn execute(player: &Player, cmd: Command) {
    match cmd {
        Command::Help => print_help(),
        Command::List => print_listing(player),
        Command::Status => print_status(player),
        Command::Play(index) => player.send(PlayerCmd::PlayNow(index)),
        Command::Add(path) => match probe_track(&path) {
            Ok(track) => player.send(PlayerCmd::Add(track)),
            Err(e) => println!("cannot add: {e}"),
        },
        Command::Remove(index) => player.send(PlayerCmd::Remove(index)),
        Command::Next => player.send(PlayerCmd::Next),
        Command::Previous => player.send(PlayerCmd::Previous),
        Command::Shuffle => player.send(PlayerCmd::ToggleShuffle),
        Command::Loop => player.send(PlayerCmd::ToggleLoop),
        Command::Pause => player.send(PlayerCmd::TogglePause),
        Command::Stop => player.send(PlayerCmd::Stop),
        Command::Seek(ms) => player.send(PlayerCmd::Seek(ms)),
        Command::Quit => {}
    }
}

fn print_help() {
    println!("commands:");
    println!("  list              show the playlist");
    println!("  play <row>        play the given row");
    println!("  add <path>        append a file to the playlist");
    println!("  remove <row>      remove the given row");
    println!("  next / prev       move through the playlist");
    println!("  shuffle / loop    toggle ordering modes");
    println!("  pause / stop      control the current track");
    println!("  seek <seconds>    jump within the current track");
    println!("  status            show transport state");
    println!("  quit              exit");
}

fn print_listing(player: &Player) {
    let playlist = player.playlist();
    let Ok(pl) = playlist.lock() else { return };
    if pl.is_empty() {
        println!("playlist is empty");
        return;
    }
    let current = pl.current_index();
    for (i, row) in pl.display_rows().iter().enumerate() {
        let marker = if i == current { '>' } else { ' ' };
        println!(
            "{marker} {:>3}  {}  {} - {}",
            i + 1,
            row.duration_display,
            row.artist,
            row.title
        );
    }
}

fn print_status(player: &Player) {
    let snapshot = player.snapshot();
    let Ok(snap) = snapshot.lock() else { return };
    let state = match snap.state {
        TransportState::Idle => "idle",
        TransportState::Loading => "loading",
        TransportState::Playing => "playing",
        TransportState::Paused => "paused",
    };
    println!(
        "{state}  {} / {}  [loop {}] [shuffle {}]",
        crate::library::format_mmss(snap.position_ms),
        crate::library::format_mmss(snap.total_ms),
        on_off(snap.loop_active),
        on_off(snap.shuffle_active),
    );
}

fn on_off(v: bool) -> &'static str {
    if v { "on" } else { "off" }
}

fn print_event(event: &UiEvent) {
    match event {
        UiEvent::PlaylistChanged(rows) => println!("playlist updated ({} tracks)", rows.len()),
        UiEvent::NowPlaying {
            title,
            album,
            artist,
        } => {
            if album.is_empty() {
                println!("now playing: {artist} - {title}");
            } else {
                println!("now playing: {artist} - {title} ({album})");
            }
        }
        UiEvent::TransportReset => println!("playback stopped"),
        UiEvent::PlaybackError(msg) => println!("playback error: {msg}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, Command};
    use std::path::PathBuf;

    #[test]
    fn parse_accepts_known_commands() {
        assert_eq!(parse("list"), Some(Command::List));
        assert_eq!(parse("  ls "), Some(Command::List));
        assert_eq!(parse("play 3"), Some(Command::Play(2)));
        assert_eq!(parse("rm 1"), Some(Command::Remove(0)));
        assert_eq!(parse("seek 90"), Some(Command::Seek(90_000)));
        assert_eq!(
            parse("add /music/a.mp3"),
            Some(Command::Add(PathBuf::from("/music/a.mp3")))
        );
        assert_eq!(parse("q"), Some(Command::Quit));
    }

    #[test]
    fn parse_rejects_bad_rows_and_trailing_words() {
        assert_eq!(parse("play 0"), None);
        assert_eq!(parse("play x"), None);
        assert_eq!(parse("play"), None);
        assert_eq!(parse("list everything"), None);
        assert_eq!(parse(""), None);
    }
}
