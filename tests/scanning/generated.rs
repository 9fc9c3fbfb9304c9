#[cfg(test)]
mod generated {
    use prereqs::dispatch::Registry;
    use prereqs::scanning::{self, Scanner};

    /// A small linear congruential generator, so the inputs are the same
    /// on every run.
    struct Dice(u64);

    impl Dice {
        fn roll(&mut self, sides: u64) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (self.0 >> 33) % sides
        }
    }

    const ATOMS: &[&str] = &[
        "$a", "@b", "%c", "1", "2.5", " ", "\n", ";", ",", "/", "+", "=>", "'s'", "\"d\"", "q{x}",
        "qw(a b)", "foo", "use Foo;", "-x", "#c\n", "<", "?", "=~", "s/a/b/", "m{y}", "sub",
    ];

    const BRACKETS: &[(&str, &str)] = &[("(", ")"), ("[", "]"), ("{", "}")];

    fn balanced(dice: &mut Dice, depth: usize, output: &mut String) {
        let count = dice.roll(6);
        for _ in 0..count {
            if depth > 0 && dice.roll(3) == 0 {
                let (open, close) = BRACKETS[dice.roll(BRACKETS.len() as u64) as usize];
                output.push_str(open);
                balanced(dice, depth - 1, output);
                output.push_str(close);
            } else {
                output.push_str(ATOMS[dice.roll(ATOMS.len() as u64) as usize]);
            }
        }
    }

    fn scrambled(dice: &mut Dice, length: usize) -> String {
        let pieces = ["(", ")", "[", "]", "{", "}", "'", "\"", "/", "<<", "q", "$", " ", "\n", ";"];
        (0..length)
            .map(|_| pieces[dice.roll(pieces.len() as u64) as usize])
            .collect()
    }

    #[test]
    fn balanced_input_leaves_nothing_open() {
        let registry = Registry::new();
        let mut dice = Dice(42);

        for _ in 0..500 {
            let mut source = String::new();
            balanced(&mut dice, 6, &mut source);

            let mut scanner = Scanner::new(&registry);
            scanner.initialize(&source, false);
            if scanner
                .run()
                .is_ok()
            {
                assert_eq!(scanner.depth(), 0, "brackets left open scanning {:?}", source);
            }
        }
    }

    #[test]
    fn scrambled_input_terminates() {
        let registry = Registry::new();
        let mut dice = Dice(7);

        for length in 0..400 {
            let source = scrambled(&mut dice, length % 80);
            let outcome = scanning::scan(&registry, source.as_bytes());
            if outcome
                .error
                .is_none()
            {
                assert!(outcome
                    .prerequisites
                    .requires
                    .iter()
                    .all(|(name, _)| !name.is_empty()));
            }
        }
    }
}
