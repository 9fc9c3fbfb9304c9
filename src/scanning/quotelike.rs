//! Matching the bodies of q, qq, qw, and qx literals

use super::delimiter::{closing, is_paired, nested_body, quoted_body};
use super::token::Token;
use crate::error::MatchError;

/// Skip whitespace and comments between a quote-like operator and its
/// delimiter. A '#' immediately after the operator is the delimiter itself;
/// only after intervening whitespace does it start a comment.
pub(crate) fn skip_to_delimiter(text: &str) -> usize {
    let mut i = 0;
    let mut spaced = false;

    loop {
        let rest = &text[i..];
        match rest
            .chars()
            .next()
        {
            Some(c) if c.is_whitespace() => {
                spaced = true;
                i += c.len_utf8();
            }
            Some('#') if spaced => {
                i += rest
                    .find('\n')
                    .unwrap_or(rest.len());
            }
            _ => return i,
        }
    }
}

/// Given the text immediately following one of the q-family operators,
/// extract the literal's raw interior. On success returns the token along
/// with the number of bytes consumed, including both delimiters.
pub fn match_quotelike(text: &str, operator: &str) -> Result<(Token, usize), MatchError> {
    let start = skip_to_delimiter(text);
    let rest = &text[start..];

    let open = match rest
        .chars()
        .next()
    {
        Some(c) => c,
        None => return Err(MatchError::new("expected a delimiter", rest)),
    };

    let close = closing(open);
    let inner = &rest[open.len_utf8()..];

    let width = if is_paired(open) {
        nested_body(inner, open, close)
    } else {
        quoted_body(inner, close)
    };

    match width {
        Some(width) => {
            let body = &inner[..width];
            let consumed = start + open.len_utf8() + width + close.len_utf8();
            Ok((Token::quoted(body, operator), consumed))
        }
        None => Err(MatchError::new("unterminated quote-like literal", rest)),
    }
}

#[cfg(test)]
mod check {
    use super::*;
    use crate::scanning::token::Value;

    fn body(token: &Token) -> &str {
        match &token.value {
            Value::Quoted { body, .. } => body,
            _ => panic!("not a quoted literal"),
        }
    }

    #[test]
    fn nested_braces() {
        let (token, consumed) = match_quotelike("{a{nested}b} rest", "q").unwrap();
        assert_eq!(body(&token), "a{nested}b");
        assert_eq!(consumed, 12);

        let (token, _) = match_quotelike("(a(b)c)", "q").unwrap();
        assert_eq!(body(&token), "a(b)c");
    }

    #[test]
    fn symmetric_delimiters() {
        let (token, consumed) = match_quotelike("!a\\!b! x", "qq").unwrap();
        assert_eq!(body(&token), "a\\!b");
        assert_eq!(consumed, 6);

        let (token, _) = match_quotelike("#hash#", "q").unwrap();
        assert_eq!(body(&token), "hash");
    }

    #[test]
    fn leading_whitespace_and_comments() {
        let (token, consumed) = match_quotelike("  # comment\n  /Foo Bar/;", "qw").unwrap();
        assert_eq!(body(&token), "Foo Bar");
        assert_eq!(&"  # comment\n  /Foo Bar/;"[consumed..], ";");
        assert_eq!(token.strings(), vec!["Foo", "Bar"]);
    }

    #[test]
    fn failures() {
        assert!(match_quotelike("", "q").is_err());
        assert!(match_quotelike("   ", "q").is_err());
        assert!(match_quotelike("{unbalanced{}", "q").is_err());
        assert!(match_quotelike("/no end", "qq").is_err());
    }
}
