use regex_lite::Regex;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Matches `"  <name>   <description...> (<port>)"` on a single line.
/// The port is the digit run closing a parenthesised group, which may carry a
/// cross reference first (`(rcmd, 514)`). `.+` is greedy, so the last such
/// group on the line wins.
const LINE_PATTERN: &str = r"^\s*(\S+)\s+.+\([^()]*?(\d+)\)";

/// Port number to service/protocol name, ordered by port
pub type PortTable = BTreeMap<u32, String>;

/// A single name/port pair recovered from one line of command output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub port: u32,
}

fn line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(LINE_PATTERN).expect("name/port pattern is valid"))
}

/// regex-lite only knows ASCII whitespace; fold the rest (NBSP and friends) to a space
fn fold_whitespace(line: &str) -> Cow<'_, str> {
    if line.chars().any(|c| c.is_whitespace() && !c.is_ascii()) {
        Cow::Owned(line.chars().map(|c| if c.is_whitespace() { ' ' } else { c }).collect())
    } else {
        Cow::Borrowed(line)
    }
}

/// Parse one line into a record. Lines that do not match are not an error.
fn parse_line(line: &str) -> Option<Record> {
    let line = fold_whitespace(line);
    let caps = line_regex().captures(&line)?;
    let name = caps.get(1)?.as_str();
    let digits = caps.get(2)?.as_str();
    match digits.parse::<u32>() {
        Ok(port) => Some(Record {
            name: name.to_string(),
            port,
        }),
        Err(_) => {
            tracing::debug!("Skipping line with out-of-range port {}: {:?}", digits, line);
            None
        }
    }
}

/// Iterate over every matching line of `text`, in input order
pub fn records(text: &str) -> impl Iterator<Item = Record> + '_ {
    text.lines().filter_map(parse_line)
}

/// Build the port -> name table for a block of command output.
/// Later lines overwrite earlier ones that share a port.
pub fn extract(text: &str) -> PortTable {
    records(text).map(|r| (r.port, r.name)).collect()
}
