use crate::level::Level;
use regex::Regex;
use std::sync::LazyLock;

/// Header lines look like logcat output:
/// `2021-11-10 18:56:46.811 12401-13067/com.example.app I/System.out: message`
///
/// Captures: 1 = process token, 2 = level letter, 3 = tag (up to the first `:`).
/// The match is not anchored, so a continuation line that happens to contain
/// this shape is read as a header.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^/]+/([\w.]+)\s(\w)/([^:]+)").expect("header regex must compile")
});

/// Parsed fields of a header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header<'a> {
    pub process: &'a str,
    pub level: Level,
    pub tag: &'a str,
}

/// Classify a line: `Some` for a header, `None` for a continuation line
pub fn parse_header(line: &str) -> Option<Header<'_>> {
    let caps = HEADER_RE.captures(line)?;

    let mut letter = caps.get(2)?.as_str().chars();
    let level = match (letter.next(), letter.next()) {
        (Some(c), None) => Level::from_letter(c)?,
        _ => return None,
    };

    Some(Header {
        process: caps.get(1)?.as_str(),
        level,
        tag: caps.get(3)?.as_str(),
    })
}
