//! Tokens produced by the scanner

use std::fmt;

/// The small closed set of classes the scanner makes parse decisions on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Class {
    None,
    Operator,
    Term,
    Variable,
    Word,
    Keyword,
    Method,
    Arrow,
    String,
    Regexp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    /// Body of a quoted literal along with the operator or quote character
    /// that introduced it (`q`, `qq`, `qw`, `qx`, `'`, `"`, or `` ` ``).
    Quoted {
        body: String,
        operator: String,
    },
    Heredoc {
        body: String,
        introducer: String,
        terminator: String,
    },
    Pattern {
        operator: String,
        pattern: String,
        replacement: Option<String>,
        modifiers: String,
    },
    /// A bracketed scope. The inner tokens are only present if the
    /// statement enclosing the group was being collected.
    Group {
        open: char,
        tokens: Vec<Token>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: Value,
    pub descriptor: &'static str,
    pub class: Class,
}

impl Token {
    pub fn text(value: &str, descriptor: &'static str, class: Class) -> Token {
        Token {
            value: Value::Text(value.to_string()),
            descriptor,
            class,
        }
    }

    pub fn quoted(body: &str, operator: &str) -> Token {
        Token {
            value: Value::Quoted {
                body: body.to_string(),
                operator: operator.to_string(),
            },
            descriptor: "QUOTED",
            class: Class::String,
        }
    }

    pub fn group(open: char, tokens: Vec<Token>) -> Token {
        let descriptor = match open {
            '(' => "()",
            '[' => "[]",
            _ => "{}",
        };
        Token {
            value: Value::Group { open, tokens },
            descriptor,
            class: Class::Term,
        }
    }

    /// The textual content of this token: the raw text for plain tokens,
    /// the body for literals, and the pattern for regular expressions.
    /// Groups have no text of their own.
    pub fn as_str(&self) -> &str {
        match &self.value {
            Value::Text(text) => text,
            Value::Quoted { body, .. } => body,
            Value::Heredoc { body, .. } => body,
            Value::Pattern { pattern, .. } => pattern,
            Value::Group { .. } => "",
        }
    }

    pub fn is(&self, text: &str) -> bool {
        matches!(&self.value, Value::Text(value) if value == text)
    }

    pub fn is_number(&self) -> bool {
        self.descriptor == "NUMBER" || self.descriptor == "VERSION_STRING"
    }

    pub fn is_comma(&self) -> bool {
        self.class == Class::Operator && (self.is(",") || self.is("=>"))
    }

    pub fn inner(&self) -> &[Token] {
        match &self.value {
            Value::Group { tokens, .. } => tokens,
            _ => &[],
        }
    }

    /// The string values this token contributes to an argument list: the
    /// body of a quoted literal, every word of a `qw` list, or the values
    /// found recursively within a parenthesized group.
    pub fn strings(&self) -> Vec<String> {
        match &self.value {
            Value::Quoted { body, operator } if operator == "qw" => body
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            Value::Quoted { body, .. } => vec![body.clone()],
            Value::Heredoc { body, .. } => vec![body.clone()],
            Value::Group { tokens, .. } => tokens
                .iter()
                .flat_map(Token::strings)
                .collect(),
            Value::Text(text) if self.class == Class::Word => vec![text.clone()],
            _ => vec![],
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Text(text) => write!(f, "{}", text),
            Value::Quoted { body, operator } => match operator.as_str() {
                "'" | "\"" | "`" => write!(f, "{}{}{}", operator, body, operator),
                _ => write!(f, "{}{{{}}}", operator, body),
            },
            Value::Heredoc { introducer, .. } => write!(f, "{}", introducer),
            Value::Pattern {
                operator,
                pattern,
                replacement,
                modifiers,
            } => match replacement {
                Some(replacement) => write!(
                    f,
                    "{}{{{}}}{{{}}}{}",
                    operator, pattern, replacement, modifiers
                ),
                None => write!(f, "{}/{}/{}", operator, pattern, modifiers),
            },
            Value::Group { open, tokens } => {
                let close = super::delimiter::closing(*open);
                write!(f, "{}", open)?;
                for (i, token) in tokens
                    .iter()
                    .enumerate()
                {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", token)?;
                }
                write!(f, "{}", close)
            }
        }
    }
}
