#[cfg(test)]
mod tokens {
    use prereqs::dispatch::Registry;
    use prereqs::scanning::{self, Class, Token, Value};

    fn tokenize(source: &str) -> Vec<Token> {
        let registry = Registry::new();
        scanning::tokenize(&registry, source)
            .unwrap_or_else(|e| panic!("Failed to tokenize {:?}: {}", source, e))
    }

    fn descriptors(tokens: &[Token]) -> Vec<&'static str> {
        tokens
            .iter()
            .map(|token| token.descriptor)
            .collect()
    }

    fn body(token: &Token) -> &str {
        match &token.value {
            Value::Quoted { body, .. } => body,
            Value::Heredoc { body, .. } => body,
            _ => panic!("Expected a literal, got {:?}", token),
        }
    }

    #[test]
    fn slash_after_split_is_a_pattern() {
        let tokens = tokenize("split /,/, $x;");

        assert_eq!(tokens[1].descriptor, "REGEXP");
        match &tokens[1].value {
            Value::Pattern { pattern, .. } => assert_eq!(pattern, ","),
            _ => panic!("Expected a pattern"),
        }
        assert!(tokens[2].is_comma());
    }

    #[test]
    fn slash_between_terms_is_division() {
        let tokens = tokenize("$a / $b / $c;");

        assert!(tokens
            .iter()
            .all(|token| token.class != Class::Regexp));
        assert_eq!(
            tokens
                .iter()
                .filter(|token| token.is("/"))
                .count(),
            2
        );
    }

    #[test]
    fn nested_quote_like_bodies() {
        let tokens = tokenize("my $x = q{a{nested}b};");
        let quoted = tokens
            .iter()
            .find(|token| token.descriptor == "QUOTED")
            .expect("no quoted literal");
        assert_eq!(body(quoted), "a{nested}b");

        let tokens = tokenize("my $y = q(a(b)c);");
        let quoted = tokens
            .iter()
            .find(|token| token.descriptor == "QUOTED")
            .expect("no quoted literal");
        assert_eq!(body(quoted), "a(b)c");
    }

    #[test]
    fn heredoc_is_spliced_out() {
        let tokens = tokenize("print <<END;\nhello\nEND\n1;");

        assert_eq!(
            descriptors(&tokens)[1..],
            ["HEREDOC", "SEMICOLON", "NUMBER", "SEMICOLON"]
        );
        assert_eq!(body(&tokens[1]), "hello\n");
        assert!(tokens[3].is("1"));
    }

    #[test]
    fn substitution_with_extended_comments() {
        let tokens = tokenize("s{foo}{bar}x;");
        match &tokens[0].value {
            Value::Pattern {
                pattern,
                replacement,
                modifiers,
                ..
            } => {
                assert_eq!(pattern, "foo");
                assert_eq!(replacement.as_deref(), Some("bar"));
                assert_eq!(modifiers, "x");
            }
            _ => panic!("Expected a substitution"),
        }

        let source = "$x =~ s{\n    foo   # a } inside a comment\n  }{bar}x;\n1;\n";
        let tokens = tokenize(source);
        let substitution = tokens
            .iter()
            .find(|token| token.descriptor == "SUBSTITUTION")
            .expect("no substitution");
        match &substitution.value {
            Value::Pattern { replacement, .. } => {
                assert_eq!(replacement.as_deref(), Some("bar"))
            }
            _ => panic!("Expected a substitution"),
        }
        assert!(tokens
            .last()
            .map(|token| token.descriptor == "SEMICOLON")
            .unwrap_or(false));
    }

    #[test]
    fn groups_hold_their_contents() {
        let tokens = tokenize("foo(1, [2, 3]);");

        let group = &tokens[1];
        assert_eq!(group.descriptor, "()");
        assert_eq!(
            group
                .inner()
                .len(),
            3
        );
        assert_eq!(group.inner()[2].descriptor, "[]");
    }
}
