// Server→client responses.
//
// Wire grammar: `TAG\tPAYLOAD`, or a bare `TAG` for the two payload-free
// messages (GETNAME, EXIT). The vocabulary:
//
//   BOARD\t<record>        full board state (the codec's text record)
//   TIME\t<n>              countdown tick, n units remaining
//   LOADINFO\t<captions>   five save-slot captions, comma-joined
//   SAVEINFO\t<captions>   same listing, answering GETSAVE
//   SCORES\t<entries>      leaderboard, comma-joined fixed-width entries
//   GETNAME                the client's win made the top five; send NAME
//   EXIT                   acknowledges EXIT; the stream closes after
//
// List payloads carry a trailing comma. A leaderboard entry is the name,
// space padding out to a 20-character column (at least one space), then
// the decimal score; empty slots list as empty captions.

use thiserror::Error;

use crate::types::{ScoreEntry, SLOT_COUNT};

/// Total width of a formatted leaderboard entry: name + padding + score.
const SCORE_ENTRY_WIDTH: usize = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseResponseError {
    #[error("unknown response tag {0:?}")]
    UnknownTag(String),
    #[error("{0} requires a payload")]
    MissingPayload(&'static str),
    #[error("{0} takes no payload")]
    UnexpectedPayload(&'static str),
    #[error("malformed payload for {tag}: {payload:?}")]
    BadPayload { tag: &'static str, payload: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Full board state, as produced by the board codec.
    Board(String),
    /// Countdown tick with the remaining time.
    Time(u32),
    /// Save-slot captions offered for loading.
    LoadInfo([String; SLOT_COUNT]),
    /// Save-slot captions offered for overwriting.
    SaveInfo([String; SLOT_COUNT]),
    /// The leaderboard, best first.
    Scores(Vec<ScoreEntry>),
    /// Prompt for the winner's name.
    GetName,
    /// Session-ending acknowledgement.
    Exit,
}

impl Response {
    /// Render the response in wire form. Inverse of [`Response::parse`].
    pub fn encode(&self) -> String {
        match self {
            Response::Board(record) => format!("BOARD\t{record}"),
            Response::Time(n) => format!("TIME\t{n}"),
            Response::LoadInfo(captions) => format!("LOADINFO\t{}", join_list(captions.iter())),
            Response::SaveInfo(captions) => format!("SAVEINFO\t{}", join_list(captions.iter())),
            Response::Scores(entries) => {
                let formatted = entries.iter().map(format_entry).collect::<Vec<_>>();
                format!("SCORES\t{}", join_list(formatted.iter()))
            }
            Response::GetName => "GETNAME".to_string(),
            Response::Exit => "EXIT".to_string(),
        }
    }

    /// Parse one wire line into a response.
    pub fn parse(line: &str) -> Result<Self, ParseResponseError> {
        let (tag, payload) = match line.split_once('\t') {
            Some((tag, payload)) => (tag, Some(payload)),
            None => (line, None),
        };

        match tag {
            "BOARD" => Ok(Response::Board(require_payload("BOARD", payload)?.to_string())),
            "TIME" => {
                let payload = require_payload("TIME", payload)?;
                let n = payload.parse().map_err(|_| ParseResponseError::BadPayload {
                    tag: "TIME",
                    payload: payload.to_string(),
                })?;
                Ok(Response::Time(n))
            }
            "LOADINFO" => parse_captions("LOADINFO", require_payload("LOADINFO", payload)?)
                .map(Response::LoadInfo),
            "SAVEINFO" => parse_captions("SAVEINFO", require_payload("SAVEINFO", payload)?)
                .map(Response::SaveInfo),
            "SCORES" => parse_scores(require_payload("SCORES", payload)?).map(Response::Scores),
            "GETNAME" => no_payload("GETNAME", payload).map(|()| Response::GetName),
            "EXIT" => no_payload("EXIT", payload).map(|()| Response::Exit),
            other => Err(ParseResponseError::UnknownTag(other.to_string())),
        }
    }
}

/// Join list items with a comma after every element, trailing included.
fn join_list<'a, I: Iterator<Item = &'a String>>(items: I) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(item);
        out.push(',');
    }
    out
}

/// Format a leaderboard entry as name + space padding + score, padding the
/// entry out to a 20-character column (never less than one space).
fn format_entry(entry: &ScoreEntry) -> String {
    let score = entry.score.to_string();
    let pad = SCORE_ENTRY_WIDTH
        .saturating_sub(entry.name.len() + score.len())
        .max(1);
    format!("{}{}{}", entry.name, " ".repeat(pad), score)
}

fn require_payload<'a>(
    tag: &'static str,
    payload: Option<&'a str>,
) -> Result<&'a str, ParseResponseError> {
    payload.ok_or(ParseResponseError::MissingPayload(tag))
}

fn no_payload(tag: &'static str, payload: Option<&str>) -> Result<(), ParseResponseError> {
    match payload {
        None => Ok(()),
        Some(_) => Err(ParseResponseError::UnexpectedPayload(tag)),
    }
}

fn parse_captions(
    tag: &'static str,
    payload: &str,
) -> Result<[String; SLOT_COUNT], ParseResponseError> {
    let bad = || ParseResponseError::BadPayload {
        tag,
        payload: payload.to_string(),
    };
    let trimmed = payload.strip_suffix(',').unwrap_or(payload);
    let captions: Vec<String> = trimmed.split(',').map(str::to_string).collect();
    captions.try_into().map_err(|_| bad())
}

fn parse_scores(payload: &str) -> Result<Vec<ScoreEntry>, ParseResponseError> {
    let bad = || ParseResponseError::BadPayload {
        tag: "SCORES",
        payload: payload.to_string(),
    };
    if payload.is_empty() {
        return Ok(Vec::new());
    }
    let trimmed = payload.strip_suffix(',').unwrap_or(payload);
    let mut entries = Vec::new();
    for item in trimmed.split(',') {
        let (name, score) = item.rsplit_once(' ').ok_or_else(bad)?;
        let score = score.parse().map_err(|_| bad())?;
        entries.push(ScoreEntry::new(name.trim_end(), score));
    }
    Ok(entries)
}
