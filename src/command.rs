use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use ulid::Ulid;

use crate::engine::{DraftEdit, Intent};
use crate::model::Ms;

/// Parsed console input.
#[derive(Debug, PartialEq)]
pub enum Command {
    Intent(Intent),
    /// Print the booking snapshot.
    List,
    /// Print the edit session.
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  list                      show all bookings
  refresh                   re-fetch bookings
  new <time>                propose a one-hour booking starting at <time>
  open <id>                 edit an existing booking
  name <text>               set the name
  start <time>|none         set the start
  end <time>|none           set the end
  blocked on|off            mark as blocked (new bookings only)
  save                      create or update
  remove                    cancel, or delete if blocked
  close                     discard the edit session
  show                      print the edit session
  quit
<time> is RFC 3339 (2024-06-01T09:00:00Z) or local YYYY-MM-DDTHH:MM";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let intent = match word.to_lowercase().as_str() {
        "" => return Err(CommandError::Empty),
        "list" | "ls" => return Ok(Command::List),
        "show" => return Ok(Command::Show),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        "refresh" => Intent::Refresh,
        "new" => Intent::SelectRange {
            start: parse_time(required(rest, "time")?)?,
        },
        "open" => Intent::SelectEvent {
            id: parse_id(required(rest, "id")?)?,
        },
        "name" => Intent::Edit(DraftEdit::Name(rest.to_string())),
        "start" => Intent::Edit(DraftEdit::Start(parse_optional_time(required(rest, "time")?)?)),
        "end" => Intent::Edit(DraftEdit::End(parse_optional_time(required(rest, "time")?)?)),
        "blocked" => Intent::Edit(DraftEdit::Blocked(parse_bool(required(rest, "on|off")?)?)),
        "save" | "submit" => Intent::Submit,
        "remove" | "cancel" | "delete" => Intent::Remove,
        "close" => Intent::Close,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Command::Intent(intent))
}

fn required<'a>(rest: &'a str, what: &'static str) -> Result<&'a str, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArg(what));
    }
    Ok(rest)
}

/// RFC 3339 with offset, or a naive `YYYY-MM-DDTHH:MM` in local time.
pub fn parse_time(s: &str) -> Result<Ms, CommandError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.timestamp_millis());
    }
    let naive = ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| CommandError::BadTime(s.to_string()))?;
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| CommandError::BadTime(format!("{s} (ambiguous or skipped local time)")))
}

fn parse_optional_time(s: &str) -> Result<Option<Ms>, CommandError> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_time(s).map(Some)
}

fn parse_id(s: &str) -> Result<Ulid, CommandError> {
    Ulid::from_string(s).map_err(|e| CommandError::BadId(format!("{s}: {e}")))
}

fn parse_bool(s: &str) -> Result<bool, CommandError> {
    match s.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(CommandError::BadBool(s.to_string())),
    }
}

// ── Errors ────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArg(&'static str),
    BadTime(String),
    BadId(String),
    BadBool(String),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Empty => write!(f, "empty command"),
            CommandError::Unknown(c) => write!(f, "unknown command: {c} (try help)"),
            CommandError::MissingArg(what) => write!(f, "missing argument: {what}"),
            CommandError::BadTime(s) => write!(f, "bad time: {s}"),
            CommandError::BadId(s) => write!(f, "bad id: {s}"),
            CommandError::BadBool(s) => write!(f, "expected on/off, got {s}"),
        }
    }
}

impl std::error::Error for CommandError {}

#[cfg(test)]
mod tests {
    use super::*;

    const NINE: Ms = 1_717_232_400_000; // 2024-06-01T09:00:00Z

    #[test]
    fn parse_new_with_rfc3339() {
        let cmd = parse_command("new 2024-06-01T09:00:00Z").unwrap();
        assert_eq!(cmd, Command::Intent(Intent::SelectRange { start: NINE }));
    }

    #[test]
    fn parse_offset_time() {
        assert_eq!(parse_time("2024-06-01T11:00:00+02:00").unwrap(), NINE);
    }

    #[test]
    fn parse_naive_local_time() {
        let expected = Local
            .with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
            .single()
            .map(|dt| dt.timestamp_millis());
        assert_eq!(parse_time("2024-06-01T09:00").ok(), expected);
        assert_eq!(parse_time("2024-06-01 09:00").ok(), expected);
    }

    #[test]
    fn parse_open() {
        let id = Ulid::new();
        let cmd = parse_command(&format!("open {id}")).unwrap();
        assert_eq!(cmd, Command::Intent(Intent::SelectEvent { id }));
    }

    #[test]
    fn parse_name_keeps_spaces() {
        let cmd = parse_command("name  Team sync ").unwrap();
        assert_eq!(
            cmd,
            Command::Intent(Intent::Edit(DraftEdit::Name("Team sync".into())))
        );
        // Bare `name` clears it
        assert_eq!(
            parse_command("name").unwrap(),
            Command::Intent(Intent::Edit(DraftEdit::Name(String::new())))
        );
    }

    #[test]
    fn parse_start_end_and_none() {
        assert_eq!(
            parse_command("start 2024-06-01T09:00:00Z").unwrap(),
            Command::Intent(Intent::Edit(DraftEdit::Start(Some(NINE))))
        );
        assert_eq!(
            parse_command("end none").unwrap(),
            Command::Intent(Intent::Edit(DraftEdit::End(None)))
        );
    }

    #[test]
    fn parse_blocked() {
        assert_eq!(
            parse_command("blocked on").unwrap(),
            Command::Intent(Intent::Edit(DraftEdit::Blocked(true)))
        );
        assert_eq!(
            parse_command("BLOCKED off").unwrap(),
            Command::Intent(Intent::Edit(DraftEdit::Blocked(false)))
        );
        assert!(matches!(
            parse_command("blocked maybe"),
            Err(CommandError::BadBool(_))
        ));
    }

    #[test]
    fn parse_simple_words() {
        assert_eq!(parse_command("save").unwrap(), Command::Intent(Intent::Submit));
        assert_eq!(parse_command("remove").unwrap(), Command::Intent(Intent::Remove));
        assert_eq!(parse_command("close").unwrap(), Command::Intent(Intent::Close));
        assert_eq!(parse_command("refresh").unwrap(), Command::Intent(Intent::Refresh));
        assert_eq!(parse_command("list").unwrap(), Command::List);
        assert_eq!(parse_command("show").unwrap(), Command::Show);
        assert_eq!(parse_command("quit").unwrap(), Command::Quit);
        assert_eq!(parse_command("help").unwrap(), Command::Help);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(parse_command("new"), Err(CommandError::MissingArg("time")));
        assert!(matches!(parse_command("fly"), Err(CommandError::Unknown(_))));
        assert!(matches!(parse_command("open nope"), Err(CommandError::BadId(_))));
        assert!(matches!(parse_command("new tomorrow"), Err(CommandError::BadTime(_))));
    }
}
