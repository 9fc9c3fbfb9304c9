//! Test::More functions that only exist from some version on

use crate::context::{Context, Tier};
use crate::dispatch::{Plugin, Registry};
use crate::error::PluginError;
use crate::scanning::Token;

pub struct TestMore;

impl Plugin for TestMore {
    fn name(&self) -> &'static str {
        "test_more"
    }

    fn register(&self, registry: &mut Registry) {
        registry.register_keyword("done_testing", done_testing);
        registry.register_keyword("subtest", subtest);
    }
}

fn done_testing(context: &mut Context, _: &[Token]) -> Result<(), PluginError> {
    raise(context, "0.88");
    Ok(())
}

fn subtest(context: &mut Context, _: &[Token]) -> Result<(), PluginError> {
    raise(context, "0.94");
    Ok(())
}

/// Raise the Test::More requirement, at whatever tier it was loaded.
fn raise(context: &mut Context, version: &str) {
    match context.tier_of("Test::More") {
        Some(Tier::Required) => {
            context.add("Test::More", Some(version));
        }
        Some(Tier::Conditional) => {
            context.add_conditional("Test::More", Some(version));
        }
        Some(Tier::Suggested) => {
            context.add_suggestion("Test::More", Some(version));
        }
        None => {}
    }
}
