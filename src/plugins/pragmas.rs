//! Pragmas whose arguments name further modules: `if`, `base`, `parent`,
//! and `aliased`.

use tracing::debug;

use super::strings;
use crate::context::{is_module_name, Context};
use crate::dispatch::{Plugin, Registry};
use crate::error::PluginError;
use crate::scanning::{Class, Token};

pub struct Pragmas;

impl Plugin for Pragmas {
    fn name(&self) -> &'static str {
        "pragmas"
    }

    fn register(&self, registry: &mut Registry) {
        registry.register_module("if", use_if);
        registry.register_module("base", use_base);
        registry.register_module("parent", use_base);
        registry.register_module("aliased", use_aliased);
    }
}

/// `use if CONDITION, MODULE => ARGUMENTS;` loads MODULE only when the
/// condition holds.
fn use_if(context: &mut Context, tokens: &[Token]) -> Result<(), PluginError> {
    let comma = tokens
        .iter()
        .position(Token::is_comma)
        .ok_or_else(|| PluginError::new("if", "no comma after the condition"))?;

    let module = tokens
        .get(comma + 1)
        .ok_or_else(|| PluginError::new("if", "no module after the condition"))?;

    let name = match module.class {
        Class::String | Class::Word => module.as_str(),
        _ => return Err(PluginError::new("if", "module is not a literal name")),
    };

    if !is_module_name(name) {
        return Err(PluginError::new("if", format!("'{}' is not a module name", name)));
    }

    let version = tokens
        .get(comma + 3)
        .filter(|token| token.is_number() && tokens[comma + 2].is_comma())
        .map(Token::as_str);

    context.add_conditional(name, version);
    Ok(())
}

/// `use parent` and `use base` load each class they are given, unless told
/// `-norequire`.
fn use_base(context: &mut Context, tokens: &[Token]) -> Result<(), PluginError> {
    if tokens
        .iter()
        .any(|token| token.is("-norequire"))
    {
        debug!("-norequire; nothing loaded");
        return Ok(());
    }

    for name in strings(tokens) {
        if is_module_name(&name) {
            context.add(&name, None);
        }
    }
    Ok(())
}

fn use_aliased(context: &mut Context, tokens: &[Token]) -> Result<(), PluginError> {
    let names = strings(tokens);
    let name = names
        .first()
        .ok_or_else(|| PluginError::new("aliased", "no package to alias"))?;

    if is_module_name(name) {
        context.add(name, None);
    }
    Ok(())
}
