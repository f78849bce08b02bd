use schemars::JsonSchema;
use serde::Serialize;

/// Leading marker(s) on the title line, as in a Markdown heading.
pub const TITLE_MARKER: char = '#';

/// Separates title and body in `title&&body` encoded descriptions.
pub const TITLE_DELIMITER: &str = "&&";

/// A proposal description split into its title line and the remaining
/// body. The body is untrusted markup and must go through a sanitizer
/// before it reaches any renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ProposalDescription {
    pub title: String,
    pub body: String,
}

impl ProposalDescription {
    pub fn title_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.title.is_empty() { default } else { &self.title }
    }
}

/// Splits `raw` into title and body.
///
/// A `&&` on the first line delimits the title. Otherwise the first
/// line break does. The title has heading markers and surrounding
/// whitespace removed; the body loses the blank lines that separate it
/// from the title. Text with neither delimiter is all body.
pub fn parse_description(raw: &str) -> ProposalDescription {
    let first_line_len = raw.find('\n').unwrap_or(raw.len());
    let split = match raw.find(TITLE_DELIMITER) {
        Some(at) if at < first_line_len => Some((&raw[..at], &raw[at + TITLE_DELIMITER.len()..])),
        _ => raw.split_once('\n'),
    };
    match split {
        Some((first, rest)) => ProposalDescription {
            title: clean_title(first),
            body: rest.trim_start_matches(['\r', '\n']).to_string(),
        },
        None => ProposalDescription {
            title: String::new(),
            body: raw.to_string(),
        },
    }
}

fn clean_title(line: &str) -> String {
    line.trim()
        .trim_start_matches(TITLE_MARKER)
        .trim()
        .to_string()
}
