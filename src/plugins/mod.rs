//! Built-in parser plugins
//!
//! Each plugin teaches the registry about one family of modules whose
//! arguments, keywords, or methods load further modules.

mod class_load;
mod dbix_class;
mod moose;
mod pragmas;
mod test_more;

use crate::dispatch::Plugin;
use crate::scanning::{Token, Value};

pub use class_load::ClassLoad;
pub use dbix_class::DbixClass;
pub use moose::Moose;
pub use pragmas::Pragmas;
pub use test_more::TestMore;

/// Every built-in plugin, in registration order.
pub fn default_set() -> Vec<Box<dyn Plugin>> {
    vec![
        Box::new(Pragmas),
        Box::new(TestMore),
        Box::new(Moose),
        Box::new(ClassLoad),
        Box::new(DbixClass),
    ]
}

/// The literal strings in an argument list, in order. Anonymous hashes
/// hold options rather than names and are skipped.
fn strings(tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .filter(|token| !matches!(token.value, Value::Group { open: '{', .. }))
        .flat_map(Token::strings)
        .collect()
}

/// The arguments of a keyword statement: the inside of a parenthesized
/// list if that is what follows the keyword, otherwise everything after
/// it.
fn arguments(tokens: &[Token]) -> &[Token] {
    let rest = tokens
        .get(1..)
        .unwrap_or(&[]);
    match rest.first() {
        Some(first) if matches!(first.value, Value::Group { open: '(', .. }) => first.inner(),
        _ => rest,
    }
}
