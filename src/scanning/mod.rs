//! Scanning Perl source for the statements that load other code

use std::path::Path;

use tracing::debug;

use crate::context::Prerequisites;
use crate::dispatch::Registry;
use crate::error::{Diagnostic, LoadingError, ScanError};

mod delimiter;
mod heredoc;
pub mod keywords;
mod quotelike;
mod regexp;
mod scanner;
pub mod scope;
pub mod token;

pub use quotelike::match_quotelike;
pub use scanner::Scanner;
pub use token::{Class, Token, Value};

/// Read a source file from disk, or from standard input if the filename
/// is "-".
pub fn load(filename: &Path) -> Result<Vec<u8>, LoadingError<'_>> {
    if filename.to_str() == Some("-") {
        let mut buffer = Vec::new();
        return match std::io::Read::read_to_end(&mut std::io::stdin(), &mut buffer) {
            Ok(_) => Ok(buffer),
            Err(error) => Err(LoadingError {
                problem: "Failed reading standard input".to_string(),
                details: error.to_string(),
                filename,
            }),
        };
    }

    match std::fs::read(filename) {
        Ok(content) => Ok(content),
        Err(error) => {
            debug!(?error);
            Err(LoadingError {
                problem: "Failed to read source".to_string(),
                details: error.to_string(),
                filename,
            })
        }
    }
}

/// Everything learned from scanning one file.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub prerequisites: Prerequisites,
    pub diagnostics: Vec<Diagnostic>,
    /// The fatal error that cut the scan short, if any. What was found up
    /// to that point is still reported.
    pub error: Option<ScanError>,
    /// The decoded source, which diagnostic offsets refer to.
    pub source: String,
}

/// Scan raw file content for its prerequisites.
pub fn scan(registry: &Registry, content: &[u8]) -> Outcome {
    let (source, utf8) = decode(content);

    let mut scanner = Scanner::new(registry);
    scanner.initialize(&source, utf8);
    let mut result = scanner.run();

    if scanner.needs_rescan() {
        debug!("non-ASCII source before 'use utf8'; scanning again");
        scanner.initialize(&source, true);
        result = scanner.run();
    }

    if let Err(error) = &result {
        debug!(%error, open = scanner.depth(), "scan cut short");
    }

    let (context, diagnostics) = scanner.into_parts();

    Outcome {
        prerequisites: context.finish(),
        diagnostics,
        error: result.err(),
        source,
    }
}

/// Tokenize source, returning every token the scanner produced. Useful
/// for seeing how a piece of Perl is being understood.
pub fn tokenize(registry: &Registry, source: &str) -> Result<Vec<Token>, ScanError> {
    let source = normalize(source);

    let mut scanner = Scanner::new(registry);
    scanner.initialize(&source, false);
    scanner.keep_tokens(true);
    scanner.run()
}

/// Turn raw bytes into text. A byte order mark selects the encoding (and
/// for UTF-8 means the source is to be treated as such from the start);
/// otherwise the bytes are taken as UTF-8, replacing anything invalid.
/// Line endings are normalized to `\n`.
pub fn decode(content: &[u8]) -> (String, bool) {
    let (text, utf8) = if let Some(rest) = content.strip_prefix(b"\xEF\xBB\xBF") {
        (String::from_utf8_lossy(rest).into_owned(), true)
    } else if let Some(rest) = content.strip_prefix(b"\xFF\xFE\x00\x00") {
        (decode_utf32(rest, u32::from_le_bytes), true)
    } else if let Some(rest) = content.strip_prefix(b"\x00\x00\xFE\xFF") {
        (decode_utf32(rest, u32::from_be_bytes), true)
    } else if let Some(rest) = content.strip_prefix(b"\xFF\xFE") {
        (decode_utf16(rest, u16::from_le_bytes), true)
    } else if let Some(rest) = content.strip_prefix(b"\xFE\xFF") {
        (decode_utf16(rest, u16::from_be_bytes), true)
    } else {
        (String::from_utf8_lossy(content).into_owned(), false)
    };

    (normalize(&text), utf8)
}

fn decode_utf16(content: &[u8], unit: fn([u8; 2]) -> u16) -> String {
    let units = content
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]));

    char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn decode_utf32(content: &[u8], unit: fn([u8; 4]) -> u32) -> String {
    content
        .chunks_exact(4)
        .map(|quad| {
            char::from_u32(unit([quad[0], quad[1], quad[2], quad[3]]))
                .unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect()
}

fn normalize(text: &str) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n")
            .replace('\r', "\n")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod check {
    use super::*;

    #[test]
    fn decoding_with_byte_order_marks() {
        assert_eq!(decode(b"use Foo;\r\n"), ("use Foo;\n".to_string(), false));
        assert_eq!(decode(b"\xEF\xBB\xBFuse Foo;"), ("use Foo;".to_string(), true));
        assert_eq!(
            decode(b"\xFF\xFEu\x00s\x00e\x00"),
            ("use".to_string(), true)
        );
        assert_eq!(
            decode(b"\xFE\xFF\x00u\x00s\x00e"),
            ("use".to_string(), true)
        );
        assert_eq!(
            decode(b"\xFF\xFE\x00\x00u\x00\x00\x00"),
            ("u".to_string(), true)
        );
    }

    #[test]
    fn old_mac_line_endings() {
        assert_eq!(normalize("a\rb\r\nc"), "a\nb\nc");
    }

    #[test]
    fn rescanning_after_use_utf8() {
        let registry = Registry::new();
        let outcome = scan(&registry, "print 1 × 2;\nuse utf8;\nuse Foo;\n".as_bytes());

        assert!(outcome
            .prerequisites
            .requires
            .contains("Foo"));
        assert!(outcome
            .diagnostics
            .iter()
            .all(|d| !d
                .message
                .contains("non-ASCII")));
    }
}
