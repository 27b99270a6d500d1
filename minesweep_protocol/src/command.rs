// Client→server commands.
//
// Wire grammar: `VERB[ ARGS]` — the verb runs to the first space, the rest
// is a comma-separated argument list with decimal integer fields. The
// vocabulary:
//
//   NEW                  start a fresh game (and the session's timer)
//   UPDATE b,y,x         b=0 reveal, b=1 flag-cycle, at row y column x
//   GETLOAD              list save-slot captions for loading
//   LOADFROM n           replace the board from slot n
//   GETSAVE              list save-slot captions for saving
//   SAVETO n             save the board into slot n
//   SCORE                fetch the leaderboard
//   NAME name,score      submit a leaderboard entry (reply to GETNAME)
//   EXIT                 end the session
//
// Parsing is strict: unknown verbs, missing or surplus arguments,
// non-numeric fields, and out-of-range slots are all typed errors. The
// session treats any of them as a corrupt stream and closes.

use thiserror::Error;

use crate::types::{InvalidSlot, Slot};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("unknown command verb {0:?}")]
    UnknownVerb(String),
    #[error("{0} takes no arguments")]
    UnexpectedArgs(&'static str),
    #[error("{0} requires arguments")]
    MissingArgs(&'static str),
    #[error("malformed arguments for {verb}: {args:?}")]
    BadArgs { verb: &'static str, args: String },
    #[error(transparent)]
    BadSlot(#[from] InvalidSlot),
}

/// Which board operation an `UPDATE` requests. `0` on the wire is a
/// reveal, `1` a flag-cycle advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateAction {
    Reveal,
    Flag,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    New,
    Update {
        action: UpdateAction,
        y: usize,
        x: usize,
    },
    GetLoad,
    LoadFrom(Slot),
    GetSave,
    SaveTo(Slot),
    Score,
    Name { name: String, score: u32 },
    Exit,
}

impl Command {
    /// Parse one wire line into a command.
    pub fn parse(line: &str) -> Result<Self, ParseCommandError> {
        let (verb, args) = match line.split_once(' ') {
            Some((verb, args)) => (verb, Some(args)),
            None => (line, None),
        };

        match verb {
            "NEW" => no_args("NEW", args).map(|()| Command::New),
            "UPDATE" => parse_update(require_args("UPDATE", args)?),
            "GETLOAD" => no_args("GETLOAD", args).map(|()| Command::GetLoad),
            "LOADFROM" => {
                parse_slot("LOADFROM", require_args("LOADFROM", args)?).map(Command::LoadFrom)
            }
            "GETSAVE" => no_args("GETSAVE", args).map(|()| Command::GetSave),
            "SAVETO" => parse_slot("SAVETO", require_args("SAVETO", args)?).map(Command::SaveTo),
            "SCORE" => no_args("SCORE", args).map(|()| Command::Score),
            "NAME" => parse_name(require_args("NAME", args)?),
            "EXIT" => no_args("EXIT", args).map(|()| Command::Exit),
            other => Err(ParseCommandError::UnknownVerb(other.to_string())),
        }
    }

    /// Render the command in wire form. Inverse of [`Command::parse`].
    pub fn encode(&self) -> String {
        match self {
            Command::New => "NEW".to_string(),
            Command::Update { action, y, x } => {
                let button = match action {
                    UpdateAction::Reveal => 0,
                    UpdateAction::Flag => 1,
                };
                format!("UPDATE {button},{y},{x}")
            }
            Command::GetLoad => "GETLOAD".to_string(),
            Command::LoadFrom(slot) => format!("LOADFROM {slot}"),
            Command::GetSave => "GETSAVE".to_string(),
            Command::SaveTo(slot) => format!("SAVETO {slot}"),
            Command::Score => "SCORE".to_string(),
            Command::Name { name, score } => format!("NAME {name},{score}"),
            Command::Exit => "EXIT".to_string(),
        }
    }
}

fn no_args(verb: &'static str, args: Option<&str>) -> Result<(), ParseCommandError> {
    match args {
        None => Ok(()),
        Some(_) => Err(ParseCommandError::UnexpectedArgs(verb)),
    }
}

fn require_args<'a>(verb: &'static str, args: Option<&'a str>) -> Result<&'a str, ParseCommandError> {
    args.ok_or(ParseCommandError::MissingArgs(verb))
}

fn parse_update(args: &str) -> Result<Command, ParseCommandError> {
    let bad = || ParseCommandError::BadArgs {
        verb: "UPDATE",
        args: args.to_string(),
    };
    let fields: Vec<&str> = args.split(',').collect();
    let [button, y, x] = fields[..] else {
        return Err(bad());
    };
    let action = match button {
        "0" => UpdateAction::Reveal,
        "1" => UpdateAction::Flag,
        _ => return Err(bad()),
    };
    let y: usize = y.parse().map_err(|_| bad())?;
    let x: usize = x.parse().map_err(|_| bad())?;
    Ok(Command::Update { action, y, x })
}

fn parse_slot(verb: &'static str, args: &str) -> Result<Slot, ParseCommandError> {
    let n: u64 = args.parse().map_err(|_| ParseCommandError::BadArgs {
        verb,
        args: args.to_string(),
    })?;
    Ok(Slot::new(n)?)
}

fn parse_name(args: &str) -> Result<Command, ParseCommandError> {
    let bad = || ParseCommandError::BadArgs {
        verb: "NAME",
        args: args.to_string(),
    };
    let (name, score) = args.split_once(',').ok_or_else(bad)?;
    let score: u32 = score.parse().map_err(|_| bad())?;
    Ok(Command::Name {
        name: name.to_string(),
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_verbs() {
        assert_eq!(Command::parse("NEW").unwrap(), Command::New);
        assert_eq!(Command::parse("GETLOAD").unwrap(), Command::GetLoad);
        assert_eq!(Command::parse("GETSAVE").unwrap(), Command::GetSave);
        assert_eq!(Command::parse("SCORE").unwrap(), Command::Score);
        assert_eq!(Command::parse("EXIT").unwrap(), Command::Exit);
    }

    #[test]
    fn parses_update() {
        assert_eq!(
            Command::parse("UPDATE 0,3,12").unwrap(),
            Command::Update {
                action: UpdateAction::Reveal,
                y: 3,
                x: 12
            }
        );
        assert_eq!(
            Command::parse("UPDATE 1,0,0").unwrap(),
            Command::Update {
                action: UpdateAction::Flag,
                y: 0,
                x: 0
            }
        );
    }

    #[test]
    fn parses_slot_commands() {
        assert_eq!(
            Command::parse("LOADFROM 1").unwrap(),
            Command::LoadFrom(Slot::new(1).unwrap())
        );
        assert_eq!(
            Command::parse("SAVETO 5").unwrap(),
            Command::SaveTo(Slot::new(5).unwrap())
        );
    }

    #[test]
    fn parses_name() {
        assert_eq!(
            Command::parse("NAME ada lovelace,950").unwrap(),
            Command::Name {
                name: "ada lovelace".to_string(),
                score: 950
            }
        );
    }

    #[test]
    fn rejects_unknown_verb() {
        assert_eq!(
            Command::parse("HELLO"),
            Err(ParseCommandError::UnknownVerb("HELLO".to_string()))
        );
        assert_eq!(
            Command::parse(""),
            Err(ParseCommandError::UnknownVerb(String::new()))
        );
    }

    #[test]
    fn rejects_malformed_update() {
        assert!(Command::parse("UPDATE").is_err());
        assert!(Command::parse("UPDATE 0,1").is_err());
        assert!(Command::parse("UPDATE 0,1,2,3").is_err());
        assert!(Command::parse("UPDATE 2,1,2").is_err());
        assert!(Command::parse("UPDATE 0,a,2").is_err());
        assert!(Command::parse("UPDATE 0,-1,2").is_err());
    }

    #[test]
    fn rejects_out_of_range_slot() {
        assert_eq!(
            Command::parse("LOADFROM 0"),
            Err(ParseCommandError::BadSlot(InvalidSlot(0)))
        );
        assert_eq!(
            Command::parse("SAVETO 6"),
            Err(ParseCommandError::BadSlot(InvalidSlot(6)))
        );
        assert!(Command::parse("SAVETO five").is_err());
    }

    #[test]
    fn rejects_malformed_name() {
        assert!(Command::parse("NAME").is_err());
        assert!(Command::parse("NAME ada").is_err());
        assert!(Command::parse("NAME ada,lovelace").is_err());
    }

    #[test]
    fn rejects_surplus_arguments() {
        assert_eq!(
            Command::parse("NEW 1"),
            Err(ParseCommandError::UnexpectedArgs("NEW"))
        );
        assert_eq!(
            Command::parse("EXIT now"),
            Err(ParseCommandError::UnexpectedArgs("EXIT"))
        );
    }

    #[test]
    fn encode_parse_round_trip() {
        let commands = [
            Command::New,
            Command::Update {
                action: UpdateAction::Flag,
                y: 7,
                x: 9,
            },
            Command::GetLoad,
            Command::LoadFrom(Slot::new(2).unwrap()),
            Command::GetSave,
            Command::SaveTo(Slot::new(4).unwrap()),
            Command::Score,
            Command::Name {
                name: "grace".to_string(),
                score: 31,
            },
            Command::Exit,
        ];
        for command in commands {
            assert_eq!(Command::parse(&command.encode()).unwrap(), command);
        }
    }
}
