//! Delimiter pairing for quote-like and pattern literals

/// Bracket-like delimiters close with their mirror image; every other
/// character closes itself.
pub fn closing(open: char) -> char {
    match open {
        '(' => ')',
        '{' => '}',
        '[' => ']',
        '<' => '>',
        c => c,
    }
}

pub fn is_paired(open: char) -> bool {
    closing(open) != open
}

/// Length in bytes of the maximal run at the front of `text` containing
/// neither delimiter nor a backslash. For symmetric delimiters `open` and
/// `close` are the same character.
pub fn skip_run(text: &str, open: char, close: char) -> usize {
    text.char_indices()
        .find(|&(_, c)| c == open || c == close || c == '\\')
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Length in bytes of a quoted string body at the front of `text`, up to
/// but not including the first unescaped `close`. Backslash-escaped pairs
/// are consumed whole. Returns None if the closing delimiter never shows.
pub fn quoted_body(text: &str, close: char) -> Option<usize> {
    let mut i = 0;

    while i < text.len() {
        i += skip_run(&text[i..], close, close);

        let mut chars = text[i..].chars();
        match chars.next() {
            Some('\\') => {
                i += 1;
                if let Some(c) = chars.next() {
                    i += c.len_utf8();
                }
            }
            Some(_) => return Some(i),
            None => break,
        }
    }

    None
}

/// Length in bytes of a body at the front of `text` delimited by a
/// bracket-like pair, honouring nested occurrences of the opening
/// delimiter. The leading `open` must already have been consumed.
pub fn nested_body(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 1usize;
    let mut i = 0;

    while i < text.len() {
        i += skip_run(&text[i..], open, close);

        let mut chars = text[i..].chars();
        match chars.next() {
            Some('\\') => {
                i += 1;
                if let Some(c) = chars.next() {
                    i += c.len_utf8();
                }
            }
            Some(c) if c == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
                i += c.len_utf8();
            }
            Some(c) => {
                depth += 1;
                i += c.len_utf8();
            }
            None => break,
        }
    }

    None
}
