//! Here-documents
//!
//! A heredoc body starts on the line after its introducer, while the rest
//! of the introducer's own line is still code to be scanned. We handle this
//! by cutting the body and its terminator line out of the buffer, leaving
//! the cursor just past the introducer.

use super::token::{Class, Token, Value};
use crate::error::ScanError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Introducer<'a> {
    pub text: &'a str,
    pub label: &'a str,
    pub indented: bool,
    pub interpolates: bool,
}

/// Recognize a heredoc introducer at the front of `text`, which must begin
/// with `<<`. Returns None for a left shift or anything else that is not
/// a heredoc.
pub(crate) fn introducer(text: &str) -> Option<Introducer<'_>> {
    let re = crate::pattern!(
        r#"^<<(~)?(?:\s*"([^"\n]*)"|\s*'([^'\n]*)'|\s*`([^`\n]*)`|\\?([A-Za-z_]\w*))"#
    );

    let cap = re.captures(text)?;
    let whole = cap.get(0)?;

    let (label, interpolates) = if let Some(label) = cap.get(2) {
        (label.as_str(), true)
    } else if let Some(label) = cap.get(3) {
        (label.as_str(), false)
    } else if let Some(label) = cap.get(4) {
        (label.as_str(), true)
    } else {
        let label = cap.get(5)?;
        (label.as_str(), !whole.as_str().contains('\\'))
    };

    Some(Introducer {
        text: whole.as_str(),
        label,
        indented: cap
            .get(1)
            .is_some(),
        interpolates,
    })
}

/// The outcome of splicing a heredoc out of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Spliced {
    pub token: Token,
    /// Bytes of introducer to step over.
    pub consumed: usize,
    /// Where the body was cut from, and the text removed there, terminator
    /// line included.
    pub cut_at: usize,
    pub removed: String,
}

/// Match the heredoc whose introducer starts at `pos` in `buffer`. The body
/// and terminator line are removed from the buffer. Returns Ok(None) if
/// there is no heredoc introducer here at all.
pub(crate) fn match_heredoc(buffer: &mut String, pos: usize) -> Result<Option<Spliced>, ScanError> {
    let (introducer, label, indented) = match introducer(&buffer[pos..]) {
        Some(found) => (found.text.to_string(), found.label.to_string(), found.indented),
        None => return Ok(None),
    };

    let after = pos + introducer.len();

    // the body begins on the line after the introducer
    let start = match buffer[after..].find('\n') {
        Some(i) => after + i + 1,
        None => return Err(ScanError::UnterminatedHeredoc(pos, label)),
    };

    let mut cursor = start;
    let mut found = None;

    while cursor <= buffer.len() {
        let rest = &buffer[cursor..];
        let (line, width) = match rest.find('\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };

        let matched = if indented {
            line.trim_start() == label
        } else {
            line == label
        };

        if matched {
            let indent = line.len() - line.trim_start().len();
            found = Some((cursor, cursor + width, indent));
            break;
        }

        if width == 0 || cursor + width > buffer.len() {
            break;
        }
        cursor += width;
    }

    let (end, stop, indent) = match found {
        Some(found) => found,
        None => return Err(ScanError::UnterminatedHeredoc(pos, label)),
    };

    let raw = &buffer[start..end];
    let body = if indented && indent > 0 {
        outdent(raw, indent)
    } else {
        raw.to_string()
    };

    let removed: String = buffer
        .drain(start..stop)
        .collect();

    Ok(Some(Spliced {
        token: Token {
            value: Value::Heredoc {
                body,
                introducer: introducer.clone(),
                terminator: label,
            },
            descriptor: "HEREDOC",
            class: Class::String,
        },
        consumed: introducer.len(),
        cut_at: start,
        removed,
    }))
}

/// Remove up to `width` leading whitespace characters from every line, as
/// the `<<~` form does.
fn outdent(body: &str, width: usize) -> String {
    body.split_inclusive('\n')
        .map(|line| {
            let indent = line.len() - line.trim_start_matches([' ', '\t']).len();
            &line[indent.min(width)..]
        })
        .collect()
}
