use crate::config::Settings;
use crate::player::{Player, PlayerCmd};

/// Seed the controller with the configured playback defaults. Runs before
/// any track is queued, so shuffle starts from an empty list and simply
/// marks the ordering mode.
pub fn apply_playback_defaults(player: &Player, settings: &Settings) {
    if settings.playback.shuffle {
        player.send(PlayerCmd::ToggleShuffle);
    }
    if settings.playback.looping {
        player.send(PlayerCmd::ToggleLoop);
    }
}
