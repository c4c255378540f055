use std::path::PathBuf;

use cast_player_types::FeatureMode;
use clap::Parser;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CAST_PLAYER_GIT_SHA"),
    ", ",
    env!("CAST_PLAYER_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "cast-player", version = VERSION)]
pub struct Args {
    /// Path to the player TOML config
    #[arg(long)]
    pub config: PathBuf,

    /// Override the configured feature mode (none, ads, live)
    #[arg(long)]
    pub mode: Option<FeatureMode>,

    /// Name reported by the simulated receiver
    #[arg(long, default_value = "Living Room TV")]
    pub receiver_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_override() {
        let args = Args::try_parse_from([
            "cast-player",
            "--config",
            "player.toml",
            "--mode",
            "live",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("player.toml"));
        assert_eq!(args.mode, Some(FeatureMode::Live));
        assert_eq!(args.receiver_name, "Living Room TV");
    }

    #[test]
    fn config_is_required() {
        assert!(Args::try_parse_from(["cast-player"]).is_err());
    }
}
