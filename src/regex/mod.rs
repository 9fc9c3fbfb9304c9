// Regular expressions used by the scanner's lookahead checks. Each call site
// compiles its pattern once, on first use.

/// Expands to a `&'static Regex` for a literal pattern. Patterns are fixed
/// at compile time, so a bad one is a bug and panics.
#[macro_export]
macro_rules! pattern {
    ($pattern:expr) => {{
        use std::sync::OnceLock;
        static PATTERN: OnceLock<::regex::Regex> = OnceLock::new();
        PATTERN.get_or_init(|| {
            ::regex::Regex::new($pattern).unwrap_or_else(|e| panic!("bad pattern {}: {}", $pattern, e))
        })
    }};
}
