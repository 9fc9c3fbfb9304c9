#[cfg(test)]
mod plugins {
    use prereqs::dispatch::Registry;
    use prereqs::{plugins, scanning, Prerequisites};

    fn scan(source: &str) -> Prerequisites {
        let registry = Registry::with_plugins(&plugins::default_set());
        let outcome = scanning::scan(&registry, source.as_bytes());
        assert_eq!(outcome.error, None, "fatal error scanning {:?}", source);
        outcome.prerequisites
    }

    #[test]
    fn parent_and_base() {
        let found = scan("use parent 'Foo::Base';\nuse base qw(Bar Baz);\nuse parent -norequire, 'Local::Only';\n");

        assert!(found
            .requires
            .contains("parent"));
        assert!(found
            .requires
            .contains("Foo::Base"));
        assert!(found
            .requires
            .contains("Bar"));
        assert!(found
            .requires
            .contains("Baz"));
        assert!(!found
            .requires
            .contains("Local::Only"));
    }

    #[test]
    fn use_if() {
        let found = scan("use if $] < 5.010, 'MRO::Compat';\n");

        assert!(found
            .requires
            .contains("if"));
        assert!(found
            .recommends
            .contains("MRO::Compat"));
    }

    #[test]
    fn moose_extends_and_with() {
        let source = "package Foo;\nuse Moose;\nextends 'Foo::Base';\nwith 'Foo::Role::A', 'Foo::Role::B';\n1;\n";
        let found = scan(source);

        assert!(found
            .requires
            .contains("Foo::Base"));
        assert!(found
            .requires
            .contains("Foo::Role::A"));
        assert!(found
            .requires
            .contains("Foo::Role::B"));
    }

    #[test]
    fn extends_without_moose_is_ignored() {
        let found = scan("extends 'Foo::Base';\n");
        assert!(!found
            .requires
            .contains("Foo::Base"));
    }

    #[test]
    fn done_testing_needs_newer_test_more() {
        let found = scan("use Test::More;\nok(1);\ndone_testing;\n");
        assert_eq!(
            found
                .requires
                .get("Test::More")
                .map(|v| v.as_str()),
            Some("0.88")
        );
    }

    #[test]
    fn statements_inside_a_dispatched_statement() {
        let source = "use Test::More;\nsubtest inner => sub {\n    use Foo;\n    ok(1);\n    done_testing;\n};\n";
        let found = scan(source);

        assert!(found
            .requires
            .contains("Foo"));
        assert_eq!(
            found
                .requires
                .get("Test::More")
                .map(|v| v.as_str()),
            Some("0.94")
        );
    }

    #[test]
    fn runtime_class_loading() {
        let source = "use Class::Load qw(load_class try_load_class);\nload_class('Foo::Plugin');\ntry_load_class('Foo::Maybe');\n";
        let found = scan(source);

        assert!(found
            .recommends
            .contains("Foo::Plugin"));
        assert!(found
            .suggests
            .contains("Foo::Maybe"));
    }

    #[test]
    fn dbix_class_components() {
        let source = "package My::Schema::Result::User;\nuse base 'DBIx::Class::Core';\n__PACKAGE__->load_components(qw/InflateColumn::DateTime +My::Component/);\n";
        let found = scan(source);

        assert!(found
            .requires
            .contains("DBIx::Class::Core"));
        assert!(found
            .requires
            .contains("DBIx::Class::InflateColumn::DateTime"));
        assert!(found
            .requires
            .contains("My::Component"));
    }
}
