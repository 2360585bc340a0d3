//! Process wiring: logging, settings, the library scan, the transport
//! controller, and a minimal line-oriented front end.

use std::env;
use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::library::scan;
use crate::player::{Player, PlayerCmd};

mod front;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let settings = settings::load_settings();

    let dir = env::args().nth(1).unwrap_or_else(|| {
        env::current_dir()
            .ok()
            .and_then(|p| p.to_str().map(|s| s.to_string()))
            .unwrap_or_else(|| "Music".to_string())
    });

    let tracks = scan(Path::new(&dir), &settings.library);
    info!(count = tracks.len(), dir, "library scanned");

    let (player, ui_rx) = Player::new(settings.audio.buffer_ms);
    startup::apply_playback_defaults(&player, &settings);
    for track in tracks {
        player.send(PlayerCmd::Add(track));
    }

    front::run(&player, ui_rx)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
