// Operator console commands and their line syntax.

use thiserror::Error;

/// One operator command, parsed from a console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// List the configured scene's recent tournaments.
    Tournaments,
    /// Load a tournament's roster and start a draft session for it.
    Load { tournament: String },
    /// Choose captains by player name or id.
    Captains { selections: Vec<String> },
    /// Draw the draft order.
    Order,
    /// Hand the turn to the next captain.
    Next,
    Pick { player: String },
    Assign { captain: String, team: String },
    Reassign { captain: String, team: String },
    TeamAdd { name: String },
    TeamRemove { team: String },
    Teams,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command `{0}` (try `help`)")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

pub const HELP: &str = "\
commands:
  tournaments                      list recent tournaments
  load <tournament-id>             load players and teams
  captains <name or id>, ...       choose captains
  order                            draw the draft order
  next                             move to the next captain
  pick <player name>               draft a player for the current captain
  assign <captain-id> <team-id>    put a captain on a team
  reassign <captain-id> <team-id>  move a captain to another team
  team add <name>                  create a team
  team rm <team-id>                delete a team
  teams                            show teams and rosters
  status                           show the draft
  help                             show this list
  quit                             exit";

/// Parse one console line. Blank lines parse to `None`.
///
/// The first word selects the command (case-insensitive); the rest of the
/// line is its argument, with surrounding whitespace removed. Player names
/// keep their inner spacing and case.
pub fn parse_command(line: &str) -> Result<Option<UserCommand>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = split_word(line);
    let command = match word.to_ascii_lowercase().as_str() {
        "tournaments" | "list" => UserCommand::Tournaments,
        "load" => UserCommand::Load {
            tournament: single_arg(rest, "load <tournament-id>")?,
        },
        "captains" => {
            let selections: Vec<String> = rest
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if selections.is_empty() {
                return Err(ParseError::Usage("captains <name or id>, ..."));
            }
            UserCommand::Captains { selections }
        }
        "order" => UserCommand::Order,
        "next" => UserCommand::Next,
        "pick" => {
            if rest.is_empty() {
                return Err(ParseError::Usage("pick <player name>"));
            }
            UserCommand::Pick {
                player: rest.to_string(),
            }
        }
        "assign" => {
            let (captain, team) = two_args(rest, "assign <captain-id> <team-id>")?;
            UserCommand::Assign { captain, team }
        }
        "reassign" => {
            let (captain, team) = two_args(rest, "reassign <captain-id> <team-id>")?;
            UserCommand::Reassign { captain, team }
        }
        "team" => parse_team_command(rest)?,
        "teams" => UserCommand::Teams,
        "status" => UserCommand::Status,
        "help" | "?" => UserCommand::Help,
        "quit" | "exit" | "q" => UserCommand::Quit,
        _ => return Err(ParseError::UnknownCommand(word.to_string())),
    };
    Ok(Some(command))
}

fn parse_team_command(rest: &str) -> Result<UserCommand, ParseError> {
    const USAGE: &str = "team add <name> | team rm <team-id>";
    let (sub, arg) = split_word(rest);
    match sub.to_ascii_lowercase().as_str() {
        "add" if !arg.is_empty() => Ok(UserCommand::TeamAdd {
            name: arg.to_string(),
        }),
        "rm" | "remove" | "delete" => Ok(UserCommand::TeamRemove {
            team: single_arg(arg, USAGE)?,
        }),
        _ => Err(ParseError::Usage(USAGE)),
    }
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn single_arg(rest: &str, usage: &'static str) -> Result<String, ParseError> {
    let mut words = rest.split_whitespace();
    match (words.next(), words.next()) {
        (Some(arg), None) => Ok(arg.to_string()),
        _ => Err(ParseError::Usage(usage)),
    }
}

fn two_args(rest: &str, usage: &'static str) -> Result<(String, String), ParseError> {
    let mut words = rest.split_whitespace();
    match (words.next(), words.next(), words.next()) {
        (Some(a), Some(b), None) => Ok((a.to_string(), b.to_string())),
        _ => Err(ParseError::Usage(usage)),
    }
}
