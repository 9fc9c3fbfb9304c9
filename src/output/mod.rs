//! Presenting scan results as text or JSON

use std::collections::BTreeMap;

use owo_colors::OwoColorize;
use serde::Serialize;

use crate::context::{Prerequisites, Requirements};
use crate::scanning::{Class, Token, Value};

/// Kinds of content in the output that can be styled differently
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Syntax {
    Neutral,
    Filename,
    Heading,
    Module,
    Version,
    Descriptor,
    Word,
    Variable,
    String,
    Operator,
    Punctuation,
}

/// Trait for different rendering backends (the no-op one, and ANSI escapes
/// for terminal colouring)
pub trait Render {
    fn render(&self, syntax: Syntax, content: &str) -> String;
}

/// Returns content unchanged, with no markup applied
pub struct Identity;

impl Render for Identity {
    fn render(&self, _syntax: Syntax, content: &str) -> String {
        content.to_string()
    }
}

/// Embellish fragments with ANSI escapes for output to a terminal.
pub struct Terminal;

impl Render for Terminal {
    fn render(&self, syntax: Syntax, content: &str) -> String {
        match syntax {
            Syntax::Neutral => content.to_string(),
            Syntax::Filename => content
                .bright_white()
                .bold()
                .to_string(),
            Syntax::Heading => content // #8f5902 (brown) bold
                .color(owo_colors::Rgb(143, 89, 2))
                .bold()
                .to_string(),
            Syntax::Module => content // #3465a4 (blue) bold
                .color(owo_colors::Rgb(52, 101, 164))
                .bold()
                .to_string(),
            Syntax::Version => content // #ad7fa8 (purple)
                .color(owo_colors::Rgb(173, 127, 168))
                .to_string(),
            Syntax::Descriptor => content // #999999 (grey)
                .color(owo_colors::Rgb(153, 153, 153))
                .to_string(),
            Syntax::Word => content // #3465a4 (blue)
                .color(owo_colors::Rgb(52, 101, 164))
                .to_string(),
            Syntax::Variable => content // #729fcf (light blue) bold
                .color(owo_colors::Rgb(114, 159, 207))
                .bold()
                .to_string(),
            Syntax::String => content // #4e9a06 (green)
                .color(owo_colors::Rgb(78, 154, 6))
                .to_string(),
            Syntax::Operator => content // #cc0000 (red) bold
                .color(owo_colors::Rgb(204, 0, 0))
                .bold()
                .to_string(),
            Syntax::Punctuation => content // #999999 (grey)
                .color(owo_colors::Rgb(153, 153, 153))
                .to_string(),
        }
    }
}

/// Which of the weaker tiers to include alongside the requirements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection {
    pub recommends: bool,
    pub suggests: bool,
}

/// The serialized form of one file's prerequisites.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub requires: &'a Requirements,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommends: Option<&'a Requirements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggests: Option<&'a Requirements>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noes: Option<&'a Requirements>,
}

impl<'a> Report<'a> {
    pub fn new(prerequisites: &'a Prerequisites, selection: Selection) -> Report<'a> {
        Report {
            requires: &prerequisites.requires,
            recommends: selection
                .recommends
                .then_some(&prerequisites.recommends),
            suggests: selection
                .suggests
                .then_some(&prerequisites.suggests),
            noes: (!prerequisites
                .noes
                .is_empty())
            .then_some(&prerequisites.noes),
        }
    }
}

/// Serialize the reports for several files as one JSON object keyed by
/// filename.
pub fn to_json(reports: &BTreeMap<String, Report<'_>>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(reports)
}

/// Render a report as an indented listing, one section per tier.
pub fn render_report(renderer: &dyn Render, report: &Report<'_>) -> String {
    let mut output = String::new();

    section(renderer, &mut output, "requires", Some(report.requires));
    section(renderer, &mut output, "recommends", report.recommends);
    section(renderer, &mut output, "suggests", report.suggests);

    output
}

fn section(renderer: &dyn Render, output: &mut String, heading: &str, modules: Option<&Requirements>) {
    let modules = match modules {
        Some(modules) if !modules.is_empty() => modules,
        _ => return,
    };

    output.push_str(&renderer.render(Syntax::Heading, heading));
    output.push_str(&renderer.render(Syntax::Punctuation, ":"));
    output.push('\n');

    let width = modules
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);

    for (name, version) in modules.iter() {
        output.push_str("    ");
        output.push_str(&renderer.render(Syntax::Module, name));
        if !version.is_zero() {
            let padding = width - name.len() + 2;
            output.push_str(&" ".repeat(padding));
            output.push_str(&renderer.render(Syntax::Version, version.as_str()));
        }
        output.push('\n');
    }
}

pub fn render_filename(renderer: &dyn Render, filename: &str) -> String {
    format!("{}\n", renderer.render(Syntax::Filename, filename))
}

/// Render a token stream, one token per line, with the contents of
/// bracketed groups indented beneath them.
pub fn render_tokens(renderer: &dyn Render, tokens: &[Token]) -> String {
    let mut output = String::new();
    append_tokens(renderer, &mut output, tokens, 0);
    output
}

fn append_tokens(renderer: &dyn Render, output: &mut String, tokens: &[Token], depth: usize) {
    for token in tokens {
        output.push_str(&"  ".repeat(depth));
        output.push_str(&renderer.render(Syntax::Descriptor, &format!("{:<16}", token.descriptor)));

        match &token.value {
            Value::Group { open, tokens } => {
                output.push_str(&renderer.render(Syntax::Punctuation, &open.to_string()));
                output.push('\n');
                append_tokens(renderer, output, tokens, depth + 1);
            }
            _ => {
                let syntax = match token.class {
                    Class::Word | Class::Keyword | Class::Method => Syntax::Word,
                    Class::Variable => Syntax::Variable,
                    Class::String | Class::Regexp => Syntax::String,
                    Class::Operator | Class::Arrow => Syntax::Operator,
                    Class::Term | Class::None => Syntax::Neutral,
                };
                output.push_str(&renderer.render(syntax, &token.to_string()));
                output.push('\n');
            }
        }
    }
}

#[cfg(test)]
mod check {
    use super::*;
    use crate::context::Context;

    fn sample() -> Prerequisites {
        let mut context = Context::new();
        context.add("strict", None);
        context.add("Foo::Bar", Some("1.23"));
        context.add_conditional("JSON::XS", None);
        context.add_suggestion("Cpanel::JSON::XS", Some("4"));
        context.finish()
    }

    #[test]
    fn listing_by_tier() {
        let prerequisites = sample();

        let report = Report::new(&prerequisites, Selection::default());
        assert_eq!(
            render_report(&Identity, &report),
            "requires:\n    Foo::Bar  1.23\n    strict\n"
        );

        let selection = Selection {
            recommends: true,
            suggests: true,
        };
        let report = Report::new(&prerequisites, selection);
        assert_eq!(
            render_report(&Identity, &report),
            "requires:\n    Foo::Bar  1.23\n    strict\nrecommends:\n    JSON::XS\nsuggests:\n    Cpanel::JSON::XS  4\n"
        );
    }

    #[test]
    fn json_keyed_by_filename() {
        let prerequisites = sample();

        let mut reports = BTreeMap::new();
        reports.insert(
            "lib/Foo.pm".to_string(),
            Report::new(&prerequisites, Selection::default()),
        );

        let json = to_json(&reports).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["lib/Foo.pm"]["requires"]["Foo::Bar"], "1.23");
        assert_eq!(value["lib/Foo.pm"]["requires"]["strict"], "0");
        assert!(value["lib/Foo.pm"]
            .get("recommends")
            .is_none());
        assert!(value["lib/Foo.pm"]
            .get("noes")
            .is_none());
    }

    #[test]
    fn token_listing() {
        let tokens = vec![
            Token::text("use", "KEYWORD", Class::Keyword),
            Token::group('(', vec![Token::quoted("x", "'")]),
        ];
        assert_eq!(
            render_tokens(&Identity, &tokens),
            "KEYWORD         use\n()              (\n  QUOTED          'x'\n"
        );
    }
}
