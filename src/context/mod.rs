//! Accumulating the requirements discovered during a scan

mod names;
mod version;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

pub use names::*;
pub use version::*;

/// How firmly a module is needed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Required,
    Conditional,
    Suggested,
}

/// A set of module names each with the highest minimum version seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Requirements {
    modules: BTreeMap<String, Version>,
}

impl Requirements {
    pub fn new() -> Requirements {
        Requirements {
            modules: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, name: &str, version: Version) {
        match self
            .modules
            .get_mut(name)
        {
            Some(existing) => {
                if version > *existing {
                    *existing = version;
                }
            }
            None => {
                self.modules
                    .insert(name.to_string(), version);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Version> {
        self.modules
            .get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules
            .contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Version> {
        self.modules
            .remove(name)
    }

    pub fn len(&self) -> usize {
        self.modules
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules
            .is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Version)> {
        self.modules
            .iter()
            .map(|(name, version)| (name.as_str(), version))
    }

    pub fn names(&self) -> Vec<&str> {
        self.modules
            .keys()
            .map(String::as_str)
            .collect()
    }

    /// Drop every entry already satisfied by `stronger`.
    fn prune(&mut self, stronger: &Requirements) {
        self.modules
            .retain(|name, version| match stronger.get(name) {
                Some(existing) => *version > *existing,
                None => true,
            });
    }
}

/// The final result of a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Prerequisites {
    pub requires: Requirements,
    pub recommends: Requirements,
    pub suggests: Requirements,
    pub noes: Requirements,
}

/// Where statement handlers record what they find. The scanner flips the
/// eval switch around statements found inside eval blocks and evaluated
/// strings, demoting whatever is recorded there to a suggestion.
#[derive(Debug, Clone, Default)]
pub struct Context {
    requires: Requirements,
    recommends: Requirements,
    suggests: Requirements,
    noes: Requirements,
    in_eval: bool,
    conditional: bool,
    utf8: bool,
    stopped: bool,
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    /// Record a requirement needed at load time.
    pub fn add(&mut self, name: &str, version: Option<&str>) -> Tier {
        let tier = if self.in_eval {
            Tier::Suggested
        } else {
            Tier::Required
        };
        self.record(tier, name, version);
        tier
    }

    /// Record a requirement only reached at runtime, or under some
    /// condition.
    pub fn add_conditional(&mut self, name: &str, version: Option<&str>) -> Tier {
        let tier = if self.in_eval {
            Tier::Suggested
        } else {
            Tier::Conditional
        };
        self.record(tier, name, version);
        tier
    }

    /// Record a requirement from a statement that runs when the program
    /// does, such as a plugin keyword. Inside a conditional block this is
    /// only a recommendation.
    pub fn add_runtime(&mut self, name: &str, version: Option<&str>) -> Tier {
        if self.conditional {
            self.add_conditional(name, version)
        } else {
            self.add(name, version)
        }
    }

    pub fn add_suggestion(&mut self, name: &str, version: Option<&str>) -> Tier {
        self.record(Tier::Suggested, name, version);
        Tier::Suggested
    }

    pub fn add_no(&mut self, name: &str, version: Option<&str>) {
        debug!(name, ?version, "no");
        self.noes
            .add(name, to_version(version));
    }

    fn record(&mut self, tier: Tier, name: &str, version: Option<&str>) {
        debug!(name, ?version, ?tier, "requirement");
        let version = to_version(version);
        match tier {
            Tier::Required => self
                .requires
                .add(name, version),
            Tier::Conditional => self
                .recommends
                .add(name, version),
            Tier::Suggested => self
                .suggests
                .add(name, version),
        }
    }

    /// Whether a module has been recorded at any tier so far.
    pub fn uses(&self, name: &str) -> bool {
        self.requires
            .contains(name)
            || self
                .recommends
                .contains(name)
            || self
                .suggests
                .contains(name)
    }

    /// The tier at which a module has been recorded, strongest first.
    pub fn tier_of(&self, name: &str) -> Option<Tier> {
        if self
            .requires
            .contains(name)
        {
            Some(Tier::Required)
        } else if self
            .recommends
            .contains(name)
        {
            Some(Tier::Conditional)
        } else if self
            .suggests
            .contains(name)
        {
            Some(Tier::Suggested)
        } else {
            None
        }
    }

    pub fn requires(&self) -> &Requirements {
        &self.requires
    }

    pub fn recommends(&self) -> &Requirements {
        &self.recommends
    }

    pub fn suggests(&self) -> &Requirements {
        &self.suggests
    }

    pub fn noes(&self) -> &Requirements {
        &self.noes
    }

    pub fn set_eval(&mut self, in_eval: bool) -> bool {
        std::mem::replace(&mut self.in_eval, in_eval)
    }

    pub fn in_eval(&self) -> bool {
        self.in_eval
    }

    pub fn set_conditional(&mut self, conditional: bool) -> bool {
        std::mem::replace(&mut self.conditional, conditional)
    }

    pub fn is_conditional(&self) -> bool {
        self.conditional
    }

    pub fn utf8(&self) -> bool {
        self.utf8
    }

    pub fn set_utf8(&mut self, utf8: bool) {
        self.utf8 = utf8;
    }

    /// Ask the scanner to stop; further input can't be tokenized reliably.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub(crate) fn resume(&mut self) {
        self.stopped = false;
    }

    /// Merge down into the final result. A module listed at a stronger tier
    /// with at least the same version is dropped from the weaker ones.
    pub fn finish(self) -> Prerequisites {
        let Context {
            requires,
            mut recommends,
            mut suggests,
            noes,
            ..
        } = self;

        recommends.prune(&requires);
        suggests.prune(&requires);
        suggests.prune(&recommends);

        Prerequisites {
            requires,
            recommends,
            suggests,
            noes,
        }
    }
}

fn to_version(version: Option<&str>) -> Version {
    match version {
        Some(text) => Version::parse(text),
        None => Version::zero(),
    }
}

#[cfg(test)]
mod check {
    use super::*;

    #[test]
    fn keeps_the_highest_version() {
        let mut requirements = Requirements::new();
        requirements.add("Foo", Version::parse("1.2"));
        requirements.add("Foo", Version::parse("1.10"));
        requirements.add("Foo", Version::zero());

        assert_eq!(requirements.len(), 1);
        assert_eq!(
            requirements
                .get("Foo")
                .map(Version::as_str),
            Some("1.2")
        );
    }

    #[test]
    fn tiers_follow_eval_state() {
        let mut context = Context::new();
        assert_eq!(context.add("Foo", None), Tier::Required);
        assert_eq!(context.add_conditional("Bar", Some("2")), Tier::Conditional);

        let previous = context.set_eval(true);
        assert!(!previous);
        assert_eq!(context.add("Baz", None), Tier::Suggested);
        assert_eq!(context.add_conditional("Qux", None), Tier::Suggested);
        context.set_eval(previous);

        assert_eq!(context.tier_of("Foo"), Some(Tier::Required));
        assert_eq!(context.tier_of("Bar"), Some(Tier::Conditional));
        assert_eq!(context.tier_of("Baz"), Some(Tier::Suggested));
        assert_eq!(context.tier_of("Nope"), None);
    }

    #[test]
    fn runtime_statements_under_a_condition() {
        let mut context = Context::new();
        assert_eq!(context.add_runtime("Foo", None), Tier::Required);

        context.set_conditional(true);
        assert_eq!(context.add_runtime("Bar", None), Tier::Conditional);
        assert_eq!(context.add("Baz", None), Tier::Required);

        context.set_eval(true);
        assert_eq!(context.add_runtime("Qux", None), Tier::Suggested);
    }

    #[test]
    fn finishing_prunes_weaker_tiers() {
        let mut context = Context::new();
        context.add("Foo", Some("1.0"));
        context.add_conditional("Foo", Some("0.5"));
        context.add_conditional("Bar", Some("2.0"));
        context.add_suggestion("Bar", None);
        context.add_suggestion("Foo", Some("3.0"));
        context.add_suggestion("Baz", None);

        let result = context.finish();
        assert_eq!(result.requires.names(), vec!["Foo"]);
        assert_eq!(result.recommends.names(), vec!["Bar"]);
        assert_eq!(result.suggests.names(), vec!["Baz", "Foo"]);
    }
}
