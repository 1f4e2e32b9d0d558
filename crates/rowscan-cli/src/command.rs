use rowscan::prelude::{FilterSpec, IndexName, Timestamp};
use thiserror::Error as ThisError;

///
/// Command
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Search(String),
    Sort(IndexName),
    Unsort,
    Filter(FilterSpec),
    Scroll(u64),
    More,
    Show,
    Status,
    Json,
    Metrics,
    Help,
    Quit,
}

///
/// CommandError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{command}' needs {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("unknown sort column '{0}'")]
    UnknownColumn(String),

    #[error("invalid filter term '{0}'")]
    InvalidFilter(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("invalid date '{0}': {1}")]
    InvalidDate(String, String),
}

pub const HELP: &str = "\
commands:
  search <text>        search name, email and phone (empty text clears)
  sort <column>        click a column header: name, email, phone, score, activity
  unsort               back to insertion order
  filter <terms..>     score>=N score<=N by=<text> after=<date> before=<date>
  filter clear         remove every filter
  scroll <px>          scroll the table body to <px>
  more                 load the next page
  show                 print the rows in view
  status               print the status line
  json                 print the rows in view as JSON
  metrics              print engine counters
  help                 this text
  quit                 leave";

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match head.to_lowercase().as_str() {
            "search" | "/" => Ok(Self::Search(rest.to_string())),
            "sort" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "sort",
                        expected: "a column",
                    });
                }
                IndexName::parse(rest)
                    .map(Self::Sort)
                    .ok_or_else(|| CommandError::UnknownColumn(rest.to_string()))
            }
            "unsort" => Ok(Self::Unsort),
            "filter" => parse_filter(rest).map(Self::Filter),
            "scroll" => rest
                .parse()
                .map(Self::Scroll)
                .map_err(|_| CommandError::InvalidNumber(rest.to_string())),
            "more" => Ok(Self::More),
            "" | "show" => Ok(Self::Show),
            "status" => Ok(Self::Status),
            "json" => Ok(Self::Json),
            "metrics" => Ok(Self::Metrics),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_filter(args: &str) -> Result<FilterSpec, CommandError> {
    let mut filter = FilterSpec::default();
    if args.eq_ignore_ascii_case("clear") {
        return Ok(filter);
    }
    if args.is_empty() {
        return Err(CommandError::MissingArgument {
            command: "filter",
            expected: "at least one term or 'clear'",
        });
    }

    for term in args.split_whitespace() {
        if let Some(value) = term.strip_prefix("score>=") {
            filter.score_min = Some(parse_score(value)?);
        } else if let Some(value) = term.strip_prefix("score<=") {
            filter.score_max = Some(parse_score(value)?);
        } else if let Some(value) = term.strip_prefix("by=") {
            filter.added_by_contains = Some(value.to_string());
        } else if let Some(value) = term.strip_prefix("after=") {
            filter.activity_after = Some(parse_date(value, false)?);
        } else if let Some(value) = term.strip_prefix("before=") {
            filter.activity_before = Some(parse_date(value, true)?);
        } else {
            return Err(CommandError::InvalidFilter(term.to_string()));
        }
    }

    Ok(filter.normalized())
}

fn parse_score(value: &str) -> Result<u8, CommandError> {
    value
        .parse()
        .map_err(|_| CommandError::InvalidNumber(value.to_string()))
}

// A bare `YYYY-MM-DD` covers the whole day.
fn parse_date(value: &str, end_of_day: bool) -> Result<Timestamp, CommandError> {
    let full = if value.len() == 10 {
        let time = if end_of_day { "23:59:59.999" } else { "00:00:00" };
        format!("{value}T{time}Z")
    } else {
        value.to_string()
    };

    Timestamp::parse_rfc3339(&full)
        .map_err(|err| CommandError::InvalidDate(value.to_string(), err.to_string()))
}
