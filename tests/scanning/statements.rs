#[cfg(test)]
mod statements {
    use prereqs::dispatch::Registry;
    use prereqs::scanning::{self, Outcome};
    use prereqs::Prerequisites;

    fn outcome(source: &str) -> Outcome {
        let registry = Registry::new();
        scanning::scan(&registry, source.as_bytes())
    }

    fn scan(source: &str) -> Prerequisites {
        let outcome = outcome(source);
        assert_eq!(outcome.error, None, "fatal error scanning {:?}", source);
        outcome.prerequisites
    }

    fn version<'a>(requirements: &'a prereqs::Requirements, name: &str) -> Option<&'a str> {
        requirements
            .get(name)
            .map(|v| v.as_str())
    }

    #[test]
    fn use_with_and_without_version() {
        let found = scan("use Foo::Bar 1.23;\nuse Baz;\n");

        assert_eq!(version(&found.requires, "Foo::Bar"), Some("1.23"));
        assert_eq!(version(&found.requires, "Baz"), Some("0"));
        assert!(found
            .requires
            .get("Baz")
            .map(|v| v.is_zero())
            .unwrap_or(false));
    }

    #[test]
    fn highest_version_wins() {
        let found = scan("use Foo 1.2;\nuse Foo 1.10;\nuse Bar v1.2.3;\nuse Bar 1.002;\n");

        assert_eq!(version(&found.requires, "Foo"), Some("1.2"));
        assert_eq!(version(&found.requires, "Bar"), Some("v1.2.3"));
    }

    #[test]
    fn perl_version() {
        let found = scan("use 5.010_001;\nuse strict;\n");
        assert_eq!(version(&found.requires, "perl"), Some("5.010_001"));
        assert!(found
            .requires
            .contains("strict"));
    }

    #[test]
    fn eval_string_is_a_suggestion() {
        let found = scan("eval \"use Bar;\";\n");

        assert!(!found
            .requires
            .contains("Bar"));
        assert!(found
            .suggests
            .contains("Bar"));
    }

    #[test]
    fn broken_code_in_an_eval_string_stays_there() {
        let result = outcome("eval \"use Foo; }\";\nuse After;\n");

        assert_eq!(result.error, None);
        assert!(result
            .diagnostics
            .is_empty());
        assert!(result
            .prerequisites
            .suggests
            .contains("Foo"));
        assert!(result
            .prerequisites
            .requires
            .contains("After"));
    }

    #[test]
    fn syntax_changing_module_in_an_eval_string() {
        let found = scan("eval \"use MooseX::Declare;\";\nuse After;\n");

        assert!(found
            .requires
            .contains("After"));
    }

    #[test]
    fn unterminated_quote_is_not_fatal() {
        let result = outcome("my $q = q{abc;\nuse A;\n");

        assert_eq!(result.error, None);
        assert!(!result
            .diagnostics
            .is_empty());
        assert!(result
            .prerequisites
            .requires
            .contains("A"));
    }

    #[test]
    fn eval_reaches_only_its_own_statement() {
        let found = scan("eval $code;\nmy $text = \"use Foo;\";\n");

        assert!(!found
            .suggests
            .contains("Foo"));
        assert!(!found
            .requires
            .contains("Foo"));
    }

    #[test]
    fn eval_block_is_a_suggestion() {
        let found = scan("my $ok = eval { require JSON::XS; 1 };\n");
        assert!(found
            .suggests
            .contains("JSON::XS"));
    }

    #[test]
    fn require_is_conditional() {
        let found = scan("require \"Some/Name.pm\";\nrequire Other::Name;\n");

        assert!(found
            .recommends
            .contains("Some::Name"));
        assert!(found
            .recommends
            .contains("Other::Name"));
        assert!(found
            .requires
            .is_empty());
    }

    #[test]
    fn weaker_tiers_are_pruned() {
        let found = scan("use Foo;\nsub f { require Foo; }\neval { require Foo };\n");

        assert!(found
            .requires
            .contains("Foo"));
        assert!(!found
            .recommends
            .contains("Foo"));
        assert!(!found
            .suggests
            .contains("Foo"));
    }

    #[test]
    fn no_statements() {
        let found = scan("no strict 'refs';\nno warnings;\n");
        assert!(found
            .noes
            .contains("strict"));
        assert!(found
            .noes
            .contains("warnings"));
        assert!(found
            .requires
            .is_empty());
    }

    #[test]
    fn syntax_changing_module_stops_the_scan() {
        let found = scan("use Foo;\nuse Spiffy -Base;\nuse After;\n");
        assert!(found
            .requires
            .contains("Foo"));
        assert!(!found
            .requires
            .contains("After"));
    }

    #[test]
    fn statements_inside_subroutines() {
        let source = r#"
package My::Thing;
use strict;

sub new {
    my ($class, %args) = @_;
    return bless { %args }, $class;
}

sub helper {
    require Data::Dumper;
    my $re = qr{^\s*#};
    return Data::Dumper::Dumper($_[0]) =~ s/$re//gr;
}

1;
"#;
        let found = scan(source);
        assert!(found
            .requires
            .contains("strict"));
        assert!(found
            .recommends
            .contains("Data::Dumper"));
    }

    #[test]
    fn pod_and_data_sections() {
        let found = scan("use A;\n\n=pod\n\nuse B;\n\n=cut\n\nuse C;\n__DATA__\nuse D;\n");
        assert_eq!(found.requires.names(), vec!["A", "C"]);
    }
}
