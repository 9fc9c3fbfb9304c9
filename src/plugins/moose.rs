//! `extends` and `with` in Moose and its relatives

use super::{arguments, strings};
use crate::context::{is_module_name, Context};
use crate::dispatch::{Plugin, Registry};
use crate::error::PluginError;
use crate::scanning::Token;

/// Modules which export `extends` or `with`.
const EXPORTERS: &[&str] = &[
    "Moose",
    "Moose::Role",
    "Moo",
    "Moo::Role",
    "Mouse",
    "Mouse::Role",
    "Role::Tiny",
    "Role::Tiny::With",
    "Mo",
];

pub struct Moose;

impl Plugin for Moose {
    fn name(&self) -> &'static str {
        "moose"
    }

    fn register(&self, registry: &mut Registry) {
        registry.register_keyword("extends", extends);
        registry.register_keyword("with", extends);
    }
}

/// Both keywords take a list of class or role names, possibly interleaved
/// with option hashes.
fn extends(context: &mut Context, tokens: &[Token]) -> Result<(), PluginError> {
    if !EXPORTERS
        .iter()
        .any(|name| context.uses(name))
    {
        return Ok(());
    }

    let names = strings(arguments(tokens));
    if names.is_empty() {
        return Err(PluginError::new("moose", "no literal class names"));
    }

    for name in names {
        if is_module_name(&name) {
            context.add_runtime(&name, None);
        }
    }
    Ok(())
}
