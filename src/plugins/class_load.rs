//! Runtime class loading through Class::Load and Module::Runtime

use super::arguments;
use crate::context::{is_module_name, Context};
use crate::dispatch::{Plugin, Registry};
use crate::error::PluginError;
use crate::scanning::{Class, Token};

pub struct ClassLoad;

impl Plugin for ClassLoad {
    fn name(&self) -> &'static str {
        "class_load"
    }

    fn register(&self, registry: &mut Registry) {
        for name in ["load_class", "Class::Load::load_class"] {
            registry.register_keyword(name, load_class);
        }
        for name in [
            "try_load_class",
            "load_optional_class",
            "Class::Load::try_load_class",
            "Class::Load::load_optional_class",
        ] {
            registry.register_keyword(name, try_load_class);
        }
        for name in ["use_module", "require_module", "Module::Runtime::use_module"] {
            registry.register_keyword(name, use_module);
        }
        for name in ["use_package_optimistically", "Module::Runtime::use_package_optimistically"] {
            registry.register_keyword(name, use_package_optimistically);
        }
    }
}

/// The literal class name a loader was called with, and the version if
/// one follows it directly.
fn target(tokens: &[Token]) -> Option<(&str, Option<&str>)> {
    let arguments = arguments(tokens);
    let first = arguments.first()?;

    if first.class != Class::String || !is_module_name(first.as_str()) {
        return None;
    }

    let version = match (arguments.get(1), arguments.get(2)) {
        (Some(comma), Some(version)) if comma.is_comma() && version.is_number() => {
            Some(version.as_str())
        }
        _ => None,
    };

    Some((first.as_str(), version))
}

fn load_class(context: &mut Context, tokens: &[Token]) -> Result<(), PluginError> {
    if !context.uses("Class::Load") {
        return Ok(());
    }
    if let Some((name, version)) = target(tokens) {
        context.add_conditional(name, version);
    }
    Ok(())
}

fn try_load_class(context: &mut Context, tokens: &[Token]) -> Result<(), PluginError> {
    if !context.uses("Class::Load") {
        return Ok(());
    }
    if let Some((name, version)) = target(tokens) {
        context.add_suggestion(name, version);
    }
    Ok(())
}

fn use_module(context: &mut Context, tokens: &[Token]) -> Result<(), PluginError> {
    if !context.uses("Module::Runtime") {
        return Ok(());
    }
    if let Some((name, version)) = target(tokens) {
        context.add_conditional(name, version);
    }
    Ok(())
}

fn use_package_optimistically(context: &mut Context, tokens: &[Token]) -> Result<(), PluginError> {
    if !context.uses("Module::Runtime") {
        return Ok(());
    }
    if let Some((name, version)) = target(tokens) {
        context.add_suggestion(name, version);
    }
    Ok(())
}
