//! Command script parser using nom
//!
//! One command per line. Blank lines and lines starting with `#` are skipped.
//! Command names are case-insensitive:
//! ```text
//! add <id> [value...]
//! get <id>
//! peek <id>
//! remove <id>     (alias: del)
//! head | tail | size | list | clear | stats
//! ```

use anyhow::{anyhow, Result};
use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_till1},
    character::complete::space1,
    combinator::{all_consuming, map, opt, rest, value},
    sequence::{pair, preceded},
    IResult,
};

/// A parsed script command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store a record, overwriting any record with the same id
    Add { id: String, value: String },
    /// Look up a record and promote it
    Get(String),
    /// Look up a record without promoting it
    Peek(String),
    /// Remove a record
    Remove(String),
    /// Most recently used record
    Head,
    /// Least recently used record
    Tail,
    /// Number of records
    Size,
    /// Every record, most recently used first
    List,
    /// Drop every record
    Clear,
    /// Hit/miss statistics
    Stats,
}

fn ident(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(input)
}

fn keyed<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, String> {
    map(preceded(pair(tag_no_case(name), space1), ident), String::from)
}

fn add(input: &str) -> IResult<&str, Command> {
    map(
        pair(keyed("add"), opt(preceded(space1, rest))),
        |(id, value): (String, Option<&str>)| Command::Add {
            id,
            value: value.unwrap_or_default().to_string(),
        },
    )(input)
}

fn command(input: &str) -> IResult<&str, Command> {
    alt((
        add,
        map(keyed("get"), Command::Get),
        map(keyed("peek"), Command::Peek),
        map(alt((keyed("remove"), keyed("del"))), Command::Remove),
        value(Command::Head, tag_no_case("head")),
        value(Command::Tail, tag_no_case("tail")),
        value(Command::Size, tag_no_case("size")),
        value(Command::List, tag_no_case("list")),
        value(Command::Clear, tag_no_case("clear")),
        value(Command::Stats, tag_no_case("stats")),
    ))(input)
}

/// Parse a single line
///
/// Returns `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    all_consuming(command)(line)
        .map(|(_, cmd)| Some(cmd))
        .map_err(|e| anyhow!("invalid command {:?}: {}", line, e))
}

/// Parse a whole script, tagging each command with its 1-based line number
pub fn parse_script(src: &str) -> Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();
    for (n, line) in src.lines().enumerate() {
        let lineno = n + 1;
        if let Some(cmd) = parse_line(line).map_err(|e| e.context(format!("line {}", lineno)))? {
            commands.push((lineno, cmd));
        }
    }
    Ok(commands)
}
