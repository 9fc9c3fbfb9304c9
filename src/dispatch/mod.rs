//! Handing finished statements to the handlers registered for them
//!
//! The `use`, `no`, and `require` statements are handled here directly.
//! Everything else is a lookup by name in the registry, which plugins
//! populate when it is constructed.

mod statements;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::context::Context;
use crate::error::PluginError;
use crate::scanning::token::{Class, Token};

pub use statements::UNSUPPORTED;

pub type Handler = fn(&mut Context, &[Token]) -> Result<(), PluginError>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Called with the arguments following `use NAME [VERSION]`.
    Use,
    /// Called with the arguments following `no NAME [VERSION]`.
    No,
    /// Called with a whole statement that begins with the keyword.
    Keyword,
    /// Called with a whole statement containing `->method`.
    Method,
}

/// A parser plugin teaches the registry about the keywords, methods, and
/// module arguments of some particular package.
pub trait Plugin {
    fn name(&self) -> &'static str;
    fn register(&self, registry: &mut Registry);
}

#[derive(Default)]
pub struct Registry {
    handlers: HashMap<(Kind, String), Vec<Handler>>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry {
            handlers: HashMap::new(),
        }
    }

    /// Build a registry from an ordered list of plugins. Where two plugins
    /// claim the same name both handlers run, in plugin order.
    pub fn with_plugins(plugins: &[Box<dyn Plugin>]) -> Registry {
        let mut registry = Registry::new();
        for plugin in plugins {
            debug!(plugin = plugin.name(), "registering");
            plugin.register(&mut registry);
        }
        registry
    }

    pub fn register(&mut self, kind: Kind, name: &str, handler: Handler) {
        self.handlers
            .entry((kind, name.to_string()))
            .or_default()
            .push(handler);
    }

    pub fn register_module(&mut self, name: &str, handler: Handler) {
        self.register(Kind::Use, name, handler);
    }

    pub fn register_no(&mut self, name: &str, handler: Handler) {
        self.register(Kind::No, name, handler);
    }

    pub fn register_keyword(&mut self, name: &str, handler: Handler) {
        self.register(Kind::Keyword, name, handler);
    }

    pub fn register_method(&mut self, name: &str, handler: Handler) {
        self.register(Kind::Method, name, handler);
    }

    pub fn has_callback_for(&self, kind: Kind, name: &str) -> bool {
        self.handlers
            .contains_key(&(kind, name.to_string()))
    }

    /// Run every handler registered under this name. A handler failing is
    /// logged and does not stop the others. Returns how many ran.
    pub fn run_callback_for(
        &self,
        kind: Kind,
        name: &str,
        context: &mut Context,
        tokens: &[Token],
    ) -> usize {
        let handlers = match self
            .handlers
            .get(&(kind, name.to_string()))
        {
            Some(handlers) => handlers,
            None => return 0,
        };

        for handler in handlers {
            if let Err(error) = handler(context, tokens) {
                warn!("{:?} handler for {} failed: {}", kind, name, error);
            }
        }

        handlers.len()
    }

    /// Whether a statement led by this word should have its tokens
    /// collected for dispatch.
    pub fn wants(&self, word: &str) -> bool {
        matches!(word, "use" | "no" | "require") || self.has_callback_for(Kind::Keyword, word)
    }

    /// Dispatch one complete statement. Returns which kind of handler, if
    /// any, the statement went to.
    pub fn dispatch(&self, context: &mut Context, tokens: &[Token]) -> Option<Kind> {
        let mut tokens = tokens;

        // an arrow can't begin a statement we care about; step over it and
        // the method name following
        if let Some(first) = tokens.first() {
            if first.class == Class::Arrow {
                tokens = tokens
                    .get(2..)
                    .unwrap_or(&[]);
            }
        }

        let lead = tokens.first()?;

        if matches!(lead.class, Class::Keyword | Class::Word) {
            let word = lead.as_str();
            match word {
                "use" => {
                    statements::handle_use(self, context, &tokens[1..]);
                    return Some(Kind::Use);
                }
                "no" => {
                    statements::handle_no(self, context, &tokens[1..]);
                    return Some(Kind::No);
                }
                "require" => {
                    statements::handle_require(context, &tokens[1..]);
                    return Some(Kind::Keyword);
                }
                _ => {}
            }

            if self.has_callback_for(Kind::Keyword, word) {
                self.run_callback_for(Kind::Keyword, word, context, tokens);
                return Some(Kind::Keyword);
            }
        }

        let method = tokens
            .windows(2)
            .find(|pair| {
                pair[0].class == Class::Arrow
                    && pair[1].class == Class::Method
                    && self.has_callback_for(Kind::Method, pair[1].as_str())
            })
            .map(|pair| pair[1].as_str());

        match method {
            Some(name) => {
                self.run_callback_for(Kind::Method, name, context, tokens);
                Some(Kind::Method)
            }
            None => None,
        }
    }
}
