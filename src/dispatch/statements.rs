use tracing::{debug, info};

use super::{Kind, Registry};
use crate::context::{is_module_name, is_version, module_from_path, Context};
use crate::scanning::token::{Class, Token, Value};

/// Modules that rewrite the grammar of whatever follows them. Once one of
/// these is loaded there's no point tokenizing further.
pub const UNSUPPORTED: &[&str] = &[
    "Filter::Simple",
    "MooseX::Declare",
    "Perl6::Attributes",
    "Regexp::Grammars",
    "Spiffy",
    "Text::RewriteRules",
    "syntax",
    "tt",
];

fn is_perl_version(token: &Token) -> bool {
    let text = token.as_str();
    token.is_number()
        && (text.starts_with(|c: char| c.is_ascii_digit()) || text.starts_with("v5"))
}

/// A version following a module name, as in `use Foo 1.23 qw(bar)`. A
/// number followed by a comma, or one that isn't a version literal like
/// `0x10`, is an ordinary argument instead.
fn version_argument(tokens: &[Token]) -> Option<&str> {
    let first = tokens.first()?;
    if !first.is_number() || !is_version(first.as_str()) {
        return None;
    }
    match tokens.get(1) {
        Some(next) if next.is_comma() => None,
        _ => Some(first.as_str()),
    }
}

fn module_name(token: &Token) -> Option<&str> {
    match token.class {
        Class::Word | Class::Keyword => {
            let name = token.as_str();
            Some(name.trim_end_matches("::"))
        }
        _ => None,
    }
}

pub(super) fn handle_use(registry: &Registry, context: &mut Context, tokens: &[Token]) {
    let first = match tokens.first() {
        Some(first) => first,
        None => return,
    };

    if is_perl_version(first) {
        context.add("perl", Some(first.as_str()));
        return;
    }

    let name = match module_name(first) {
        Some(name) => name,
        None => return,
    };

    if UNSUPPORTED.contains(&name) {
        info!("{} changes the syntax of what follows; stopping", name);
        context.stop();
        return;
    }

    if !is_module_name(name) {
        debug!(name, "not a module name");
        return;
    }

    let rest = &tokens[1..];
    let version = version_argument(rest);
    context.add(name, version);

    if name == "utf8" {
        context.set_utf8(true);
    }

    let arguments = match version {
        Some(_) => &rest[1..],
        None => rest,
    };
    registry.run_callback_for(Kind::Use, name, context, arguments);
}

pub(super) fn handle_no(registry: &Registry, context: &mut Context, tokens: &[Token]) {
    let first = match tokens.first() {
        Some(first) => first,
        None => return,
    };

    if is_perl_version(first) {
        return;
    }

    let name = match module_name(first) {
        Some(name) => name,
        None => return,
    };

    if !is_module_name(name) {
        return;
    }

    let rest = &tokens[1..];
    let version = version_argument(rest);
    context.add_no(name, version);

    if name == "utf8" {
        context.set_utf8(false);
    }

    let arguments = match version {
        Some(_) => &rest[1..],
        None => rest,
    };
    registry.run_callback_for(Kind::No, name, context, arguments);
}

/// `require` happens at runtime, so whatever it names is only ever a
/// conditional requirement.
pub(super) fn handle_require(context: &mut Context, tokens: &[Token]) {
    let first = match tokens.first() {
        Some(first) => first,
        None => return,
    };

    if is_perl_version(first) {
        context.add_conditional("perl", Some(first.as_str()));
        return;
    }

    match &first.value {
        Value::Quoted { body, operator } if operator == "'" || operator == "\"" || operator == "q" => {
            if let Some(name) = module_from_path(body) {
                context.add_conditional(&name, None);
            }
        }
        Value::Text(_) => {
            if let Some(name) = module_name(first) {
                if is_module_name(name) {
                    context.add_conditional(name, None);
                }
            }
        }
        _ => {}
    }
}
