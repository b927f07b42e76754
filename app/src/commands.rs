//! Console commands.

use autoclick_core::{ClickKind, HotkeyBinding, HotkeyParseError, Point};
use std::str::FromStr;
use thiserror::Error;

pub const HELP: &str = "\
commands:
  start | stop | toggle      control the clicker
  status                     show settings and click count
  interval <ms>              delay between clicks (minimum 1)
  button left|right          mouse button to click
  position <x> <y>           click at a fixed position
  position current           click wherever the pointer is
  position here              fix the position to the pointer's location now
  hotkey <combo>|none        e.g. `hotkey ctrl+shift+f6`
  theme                      cycle the theme
  help                       this text
  quit                       stop, save settings and exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionArg {
    Fixed(Point),
    Current,
    Here,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Toggle,
    Status,
    Interval(i64),
    Button(ClickKind),
    Position(PositionArg),
    Hotkey(Option<HotkeyBinding>),
    Theme,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
    #[error("not a number: {0}")]
    InvalidNumber(String),
    #[error("button must be left or right, got {0}")]
    InvalidButton(String),
    #[error(transparent)]
    Hotkey(#[from] HotkeyParseError),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        let cmd = match name.as_str() {
            "start" => Command::Start,
            "stop" => Command::Stop,
            "toggle" | "t" => Command::Toggle,
            "status" | "s" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "theme" => Command::Theme,
            "interval" => Command::Interval(parse_number(arg(&args, 0, "milliseconds")?)?),
            "button" => Command::Button(parse_button(arg(&args, 0, "left|right")?)?),
            "position" | "pos" => Command::Position(parse_position(&args)?),
            "hotkey" => {
                let combo = args.join("");
                if combo.is_empty() {
                    return Err(CommandError::MissingArgument("key combination"));
                }
                if combo.eq_ignore_ascii_case("none") {
                    Command::Hotkey(None)
                } else {
                    Command::Hotkey(Some(combo.parse()?))
                }
            }
            _ => return Err(CommandError::Unknown(name.clone())),
        };

        let expected = match cmd {
            Command::Interval(_) | Command::Button(_) => 1,
            Command::Position(PositionArg::Fixed(_)) => 2,
            Command::Position(_) => 1,
            Command::Hotkey(_) => args.len(),
            _ => 0,
        };
        if let Some(extra) = args.get(expected) {
            return Err(CommandError::UnexpectedArgument(extra.to_string()));
        }

        Ok(cmd)
    }
}

fn arg<'a>(args: &[&'a str], index: usize, what: &'static str) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or(CommandError::MissingArgument(what))
}

fn parse_number<T: FromStr>(s: &str) -> Result<T, CommandError> {
    s.parse()
        .map_err(|_| CommandError::InvalidNumber(s.to_string()))
}

fn parse_button(s: &str) -> Result<ClickKind, CommandError> {
    match s.to_ascii_lowercase().as_str() {
        "left" | "l" => Ok(ClickKind::Left),
        "right" | "r" => Ok(ClickKind::Right),
        _ => Err(CommandError::InvalidButton(s.to_string())),
    }
}

fn parse_position(args: &[&str]) -> Result<PositionArg, CommandError> {
    let first = arg(args, 0, "x y | current | here")?;
    match first.to_ascii_lowercase().as_str() {
        "current" => Ok(PositionArg::Current),
        "here" => Ok(PositionArg::Here),
        _ => {
            let x = parse_number(first)?;
            let y = parse_number(arg(args, 1, "y")?)?;
            Ok(PositionArg::Fixed(Point::new(x, y)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!("start".parse(), Ok(Command::Start));
        assert_eq!("  STOP ".parse(), Ok(Command::Stop));
        assert_eq!("t".parse(), Ok(Command::Toggle));
        assert_eq!("quit".parse(), Ok(Command::Quit));
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "jump".parse::<Command>(),
            Err(CommandError::Unknown("jump".into()))
        );
    }

    #[test]
    fn test_parse_settings_commands() {
        assert_eq!("interval 0".parse(), Ok(Command::Interval(0)));
        assert_eq!("interval -5".parse(), Ok(Command::Interval(-5)));
        assert_eq!("button Right".parse(), Ok(Command::Button(ClickKind::Right)));
        assert_eq!(
            "position 100 -20".parse(),
            Ok(Command::Position(PositionArg::Fixed(Point::new(100, -20))))
        );
        assert_eq!("pos here".parse(), Ok(Command::Position(PositionArg::Here)));
        assert_eq!(
            "position current".parse(),
            Ok(Command::Position(PositionArg::Current))
        );
    }

    #[test]
    fn test_parse_argument_errors() {
        assert_eq!(
            "interval".parse::<Command>(),
            Err(CommandError::MissingArgument("milliseconds"))
        );
        assert_eq!(
            "interval fast".parse::<Command>(),
            Err(CommandError::InvalidNumber("fast".into()))
        );
        assert_eq!(
            "button middle".parse::<Command>(),
            Err(CommandError::InvalidButton("middle".into()))
        );
        assert_eq!(
            "position 10".parse::<Command>(),
            Err(CommandError::MissingArgument("y"))
        );
        assert_eq!(
            "start now".parse::<Command>(),
            Err(CommandError::UnexpectedArgument("now".into()))
        );
        assert_eq!(
            "position 1 2 3".parse::<Command>(),
            Err(CommandError::UnexpectedArgument("3".into()))
        );
    }

    #[test]
    fn test_parse_hotkey() {
        let cmd: Command = "hotkey ctrl + f6".parse().unwrap();
        let Command::Hotkey(Some(binding)) = cmd else {
            panic!("expected a binding, got {:?}", cmd);
        };
        assert_eq!(binding.to_string(), "Ctrl + F6");

        assert_eq!("hotkey none".parse(), Ok(Command::Hotkey(None)));
        assert_eq!(
            "hotkey".parse::<Command>(),
            Err(CommandError::MissingArgument("key combination"))
        );
        assert!(matches!(
            "hotkey ctrl+nope".parse::<Command>(),
            Err(CommandError::Hotkey(HotkeyParseError::UnknownKey(_)))
        ));
    }
}
