//! DBIx::Class component loading

use super::strings;
use crate::context::{is_module_name, Context};
use crate::dispatch::{Plugin, Registry};
use crate::error::PluginError;
use crate::scanning::{Class, Token};

pub struct DbixClass;

impl Plugin for DbixClass {
    fn name(&self) -> &'static str {
        "dbix_class"
    }

    fn register(&self, registry: &mut Registry) {
        registry.register_method("load_components", load_components);
    }
}

/// Components are named relative to `DBIx::Class::` unless prefixed with
/// a `+`.
fn load_components(context: &mut Context, tokens: &[Token]) -> Result<(), PluginError> {
    let method = tokens
        .iter()
        .position(|token| token.class == Class::Method && token.is("load_components"))
        .ok_or_else(|| PluginError::new("dbix_class", "no load_components call"))?;

    for component in strings(&tokens[method + 1..]) {
        let name = match component.strip_prefix('+') {
            Some(name) => name.to_string(),
            None => format!("DBIx::Class::{}", component),
        };
        if is_module_name(&name) {
            context.add_runtime(&name, None);
        }
    }
    Ok(())
}

#[cfg(test)]
mod check {
    use super::*;

    #[test]
    fn components() {
        let mut context = Context::new();
        let tokens = vec![
            Token::text("__PACKAGE__", "KEYWORD", Class::Keyword),
            Token::text("->", "ARROW", Class::Arrow),
            Token::text("load_components", "METHOD", Class::Method),
            Token::group('(', vec![Token::quoted("InflateColumn::DateTime +My::Component", "qw")]),
        ];

        load_components(&mut context, &tokens).unwrap();
        assert!(context.uses("DBIx::Class::InflateColumn::DateTime"));
        assert!(context.uses("My::Component"));
        assert!(!context.uses("__PACKAGE__"));
    }
}
