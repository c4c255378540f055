//! Line-oriented stdin commands.

use anyhow::{Context, Result, anyhow, bail};
use cast_player::InputCommand;
use cast_player_types::FeatureMode;

pub const HELP: &str = "commands: list | select N | play | pause | stop | seek SECS | seekpx PX \
| vol LEVEL | volpx PX | mute | unmute | fs on|off | skip | mode none|ads|live \
| connect | disconnect | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum LineCommand {
    /// Print the catalog.
    List,
    Help,
    Input(InputCommand),
}

pub fn parse_line(line: &str) -> Result<Option<LineCommand>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    let input = match verb.to_ascii_lowercase().as_str() {
        "list" | "ls" => return Ok(Some(LineCommand::List)),
        "help" | "?" => return Ok(Some(LineCommand::Help)),
        "select" => InputCommand::SelectMedia {
            index: number(verb, arg)?,
        },
        "play" => InputCommand::Play,
        "pause" => InputCommand::Pause,
        "stop" => InputCommand::Stop,
        "seek" => InputCommand::Seek {
            seconds: number(verb, arg)?,
        },
        "seekpx" => InputCommand::SeekToPosition {
            pixel: number(verb, arg)?,
        },
        "vol" => InputCommand::SetVolume {
            level: number(verb, arg)?,
        },
        "volpx" => InputCommand::SetVolumeFromSlider {
            pixel: number(verb, arg)?,
        },
        "mute" => InputCommand::Mute,
        "unmute" => InputCommand::UnMute,
        "fs" => match arg {
            Some("on") => InputCommand::Fullscreen { enabled: true },
            Some("off") => InputCommand::Fullscreen { enabled: false },
            _ => bail!("usage: fs on|off"),
        },
        "skip" => InputCommand::SkipAd,
        "mode" => {
            let raw = arg.ok_or_else(|| anyhow!("usage: mode none|ads|live"))?;
            let mode = raw.parse::<FeatureMode>().map_err(|err| anyhow!(err))?;
            InputCommand::SetFeatureMode { mode }
        }
        "connect" => InputCommand::Connect,
        "disconnect" => InputCommand::Disconnect,
        "quit" | "exit" | "q" => InputCommand::Quit,
        other => bail!("unknown command: {other} (try `help`)"),
    };
    Ok(Some(LineCommand::Input(input)))
}

fn number<T>(verb: &str, arg: Option<&str>) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = arg.ok_or_else(|| anyhow!("`{verb}` needs a number"))?;
    raw.parse::<T>()
        .with_context(|| format!("invalid number for `{verb}`: {raw}"))
}
