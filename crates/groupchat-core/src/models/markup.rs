//! Splits message bodies into plain text and mention segments for display.
//!
//! Two mention spellings are recognised: `@**Full Name**` (explicit, may
//! contain spaces) and `@word` optionally followed by one more word.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySegment<'a> {
    Text(&'a str),
    Mention {
        /// The matched text including the leading `@`
        raw: &'a str,
        /// The name without markup
        name: &'a str,
        /// Position among the mentions of this body, for colour cycling
        ordinal: usize,
    },
}

fn mention_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"@\*\*([^*]+)\*\*|@(\w+(?:\s+\w+)?)").expect("mention pattern is valid")
    })
}

pub fn split_mentions(body: &str) -> Vec<BodySegment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for (ordinal, caps) in mention_regex().captures_iter(body).enumerate() {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        if whole.start() > last {
            segments.push(BodySegment::Text(&body[last..whole.start()]));
        }
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        segments.push(BodySegment::Mention {
            raw: whole.as_str(),
            name,
            ordinal,
        });
        last = whole.end();
    }

    if last < body.len() {
        segments.push(BodySegment::Text(&body[last..]));
    }
    segments
}
