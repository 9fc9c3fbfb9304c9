//! The scanning loop
//!
//! One call to `scan()` handles one bracket scope; opening brackets recurse
//! and the matching closer returns. Along the way the scanner classifies
//! just enough of each token to make Perl's context-dependent decisions
//! (division or pattern, block or hash, keyword or bareword), and buffers
//! the tokens of statements somebody has registered an interest in.

use tracing::{debug, trace};

use super::delimiter::{closing, quoted_body};
use super::heredoc::match_heredoc;
use super::keywords;
use super::quotelike::{match_quotelike, skip_to_delimiter};
use super::scope::{Flags, Frame, Stack};
use super::token::{Class, Token, Value};
use crate::context::Context;
use crate::dispatch::{Kind, Registry};
use crate::error::{Diagnostic, MatchError, ScanError};

/// Brackets nested deeper than this abort the scan.
const MAXIMUM_DEPTH: usize = 256;

/// Past this many unrecognized stretches of input the file is probably not
/// Perl, and we give up.
const MAXIMUM_PROBLEMS: usize = 64;

pub struct Scanner<'r> {
    pub(super) registry: &'r Registry,
    pub(super) context: Context,
    original: String,
    pub(super) buffer: String,
    pub(super) pos: usize,
    pub(super) stack: Stack,
    pub(super) diagnostics: Vec<Diagnostic>,
    problems: usize,
    // heredoc bodies cut from the buffer, with the offset they were cut
    // from, in the order they were removed
    cuts: Vec<(usize, String)>,
    depth: usize,
    pub(super) ended: bool,
    keep: bool,
    started_utf8: bool,
    non_ascii: bool,
}

/// Enough of the scanner's state to rewind a speculative match.
pub(super) struct Snapshot {
    pos: usize,
    stack: usize,
    cuts: usize,
    diagnostics: usize,
    problems: usize,
    ended: bool,
}

/// The statement currently being scanned within one scope.
#[derive(Debug, Default)]
struct Statement {
    /// Tokens collected so far. Only filled while collecting.
    tokens: Vec<Token>,
    /// Tokens of finished statements, kept when recording everything or
    /// when this scope is part of a statement being collected.
    scope: Vec<Token>,
    /// Where in `tokens` the part to be dispatched begins.
    start: usize,
    dispatchable: bool,
    /// Whether this whole scope belongs to a statement collected by an
    /// enclosing scope, in which case nothing is dispatched from here.
    nested: bool,
    keywords: Vec<String>,
    lead: Option<String>,
    prev: Option<(String, Class)>,
    /// The last two tokens, for statements recognized only once a method
    /// name shows up.
    recent: Vec<Token>,
    count: usize,
    subscriptable: bool,
}

impl Statement {
    fn new(nested: bool) -> Statement {
        Statement {
            nested,
            ..Statement::default()
        }
    }

    fn prev_class(&self) -> Class {
        self.prev
            .as_ref()
            .map(|(_, class)| *class)
            .unwrap_or(Class::None)
    }

    fn prev_text(&self) -> &str {
        self.prev
            .as_ref()
            .map(|(text, _)| text.as_str())
            .unwrap_or("")
    }

    /// Whether the previous token was something a binary operator could
    /// follow.
    fn term_before(&self) -> bool {
        matches!(
            self.prev_class(),
            Class::Term | Class::Variable | Class::String | Class::Regexp | Class::Method
        )
    }

    /// The innermost pending keyword that takes a block.
    fn block_owner(&self) -> Option<String> {
        self.keywords
            .iter()
            .rev()
            .find(|keyword| keywords::expects_block(keyword))
            .cloned()
    }

    /// Forget everything about the statement except the tokens.
    fn restart(&mut self) {
        self.start = 0;
        self.dispatchable = false;
        self.keywords
            .clear();
        self.lead = None;
        self.prev = None;
        self.recent
            .clear();
        self.count = 0;
        self.subscriptable = false;
    }
}

impl<'r> Scanner<'r> {
    pub fn new(registry: &'r Registry) -> Scanner<'r> {
        Scanner {
            registry,
            context: Context::new(),
            original: String::new(),
            buffer: String::new(),
            pos: 0,
            stack: Stack::new(),
            diagnostics: Vec::new(),
            problems: 0,
            cuts: Vec::new(),
            depth: 0,
            ended: false,
            keep: false,
            started_utf8: false,
            non_ascii: false,
        }
    }

    /// Load source into the scanner, discarding the results of any
    /// previous run.
    pub fn initialize(&mut self, content: &str, utf8: bool) {
        self.original = content.to_string();
        self.buffer = content.to_string();
        self.pos = 0;
        self.stack
            .reset();
        self.diagnostics
            .clear();
        self.problems = 0;
        self.cuts
            .clear();
        self.depth = 0;
        self.ended = false;
        self.started_utf8 = utf8;
        self.non_ascii = false;
        self.context = Context::new();
        self.context
            .set_utf8(utf8);
    }

    /// Record every token rather than only those of statements somebody
    /// is interested in. The tokens are returned from `run()`.
    pub fn keep_tokens(&mut self, keep: bool) {
        self.keep = keep;
    }

    pub fn run(&mut self) -> Result<Vec<Token>, ScanError> {
        let flags = Flags {
            collecting: self.keep,
            ..Flags::default()
        };

        match self.scan(flags, false) {
            Ok(tokens) => {
                debug!(count = tokens.len(), "scan complete");
                Ok(tokens)
            }
            Err(error) => {
                let offset = self.original_offset(error.offset());
                Err(error.relocated(offset))
            }
        }
    }

    /// Whether non-ASCII input was met before a `use utf8` switched
    /// decoding on, meaning the whole buffer should be scanned again.
    pub fn needs_rescan(&self) -> bool {
        !self.started_utf8 && self.non_ascii && self.context.utf8()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// How many brackets are currently open.
    pub fn depth(&self) -> usize {
        self.stack
            .depth()
    }

    pub fn into_parts(self) -> (Context, Vec<Diagnostic>) {
        (self.context, self.diagnostics)
    }

    pub(super) fn rest(&self) -> &str {
        &self.buffer[self.pos..]
    }

    pub(super) fn peek(&self) -> Option<char> {
        self.rest()
            .chars()
            .next()
    }

    fn at_line_start(&self) -> bool {
        self.pos == 0
            || self.buffer[..self.pos]
                .ends_with('\n')
    }

    pub(super) fn snapshot(&self) -> Snapshot {
        Snapshot {
            pos: self.pos,
            stack: self
                .stack
                .depth(),
            cuts: self
                .cuts
                .len(),
            diagnostics: self
                .diagnostics
                .len(),
            problems: self.problems,
            ended: self.ended,
        }
    }

    pub(super) fn restore(&mut self, snapshot: Snapshot) {
        // put back any heredoc spliced out since, most recent first
        for (at, text) in self
            .cuts
            .drain(snapshot.cuts..)
            .rev()
        {
            self.buffer
                .insert_str(at, &text);
        }

        self.pos = snapshot.pos;
        self.stack
            .truncate(snapshot.stack);
        self.diagnostics
            .truncate(snapshot.diagnostics);
        self.problems = snapshot.problems;
        self.ended = snapshot.ended;
    }

    /// Map an offset in the working buffer back to the source as loaded,
    /// putting back any heredoc bodies removed ahead of it.
    fn original_offset(&self, offset: usize) -> usize {
        let mut offset = offset;
        for (at, text) in self
            .cuts
            .iter()
            .rev()
        {
            if offset >= *at {
                offset += text.len();
            }
        }
        offset
    }

    pub(super) fn diagnose(&mut self, offset: usize, message: String) {
        let offset = self.original_offset(offset);
        let end = offset.min(
            self.original
                .len(),
        );
        let line = self.original.as_bytes()[..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1;

        trace!(line, "{}", message);
        self.diagnostics
            .push(Diagnostic {
                offset,
                line,
                message,
            });
    }

    fn problem(&mut self, offset: usize, message: String) {
        self.diagnose(offset, message);
        self.problems += 1;
        if self.problems >= MAXIMUM_PROBLEMS {
            self.diagnose(offset, "too many problems; giving up".to_string());
            self.ended = true;
        }
    }

    /// Scan one scope, returning the tokens recorded there.
    pub(super) fn scan(&mut self, flags: Flags, nested: bool) -> Result<Vec<Token>, ScanError> {
        if self.depth >= MAXIMUM_DEPTH {
            return Err(ScanError::TooDeep(self.pos));
        }
        self.depth += 1;
        let result = self.scan_scope(flags, nested);
        self.depth -= 1;
        result
    }

    fn scan_scope(&mut self, entry: Flags, nested: bool) -> Result<Vec<Token>, ScanError> {
        let mut flags = entry;
        let mut st = Statement::new(nested);

        while !self.ended {
            let c = match self.peek() {
                Some(c) => c,
                None => break,
            };

            if c.is_whitespace() {
                self.pos += c.len_utf8();
                continue;
            }

            if c == '=' && self.at_line_start() && self.skip_documentation() {
                continue;
            }

            match c {
                '#' => self.skip_comment(),
                ';' => {
                    self.pos += 1;
                    if st.nested {
                        st.tokens
                            .push(semicolon());
                    }
                    self.end_statement(&mut st, &mut flags);
                    if self.keep && !st.nested {
                        st.scope
                            .push(semicolon());
                    }
                }
                '{' | '(' | '[' => {
                    let (token, owner) = self.open_scope(c, &st, &flags)?;
                    let ends = c == '{' && block_ends_statement(&st, owner.as_deref());
                    self.emit(&mut st, &mut flags, token);
                    if ends {
                        self.end_statement(&mut st, &mut flags);
                    }
                }
                '}' | ')' | ']' => {
                    return self.close_scope(c, entry, st, &mut flags);
                }
                _ => {
                    if let Some(token) = self.read_token(c, &mut st, &mut flags)? {
                        self.emit(&mut st, &mut flags, token);
                    }
                }
            }
        }

        // end of input, or the scan was stopped
        self.end_statement(&mut st, &mut flags);

        if entry.expects_bracket {
            if let Some(frame) = self
                .stack
                .pop()
            {
                if !self.ended {
                    self.diagnose(frame.offset, format!("'{}' is never closed", frame.opener));
                }
            }
        }

        let mut tokens = st.scope;
        tokens.append(&mut st.tokens);
        Ok(tokens)
    }

    fn close_scope(
        &mut self,
        c: char,
        entry: Flags,
        mut st: Statement,
        flags: &mut Flags,
    ) -> Result<Vec<Token>, ScanError> {
        if !entry.expects_bracket {
            return Err(ScanError::UnexpectedCloser(self.pos, c));
        }

        let frame = match self
            .stack
            .pop()
        {
            Some(frame) => frame,
            None => return Err(ScanError::UnexpectedCloser(self.pos, c)),
        };

        if closing(frame.opener) != c {
            return Err(ScanError::Mismatch(self.pos, frame.opener, c));
        }

        self.pos += 1;
        self.end_statement(&mut st, flags);

        let mut tokens = st.scope;
        tokens.append(&mut st.tokens);
        Ok(tokens)
    }

    /// Handle an opening bracket, recursing into the scope it opens.
    /// Returns the resulting token and, for a block, the keyword that owns
    /// it.
    fn open_scope(
        &mut self,
        c: char,
        st: &Statement,
        flags: &Flags,
    ) -> Result<(Token, Option<String>), ScanError> {
        let owner = if c == '{' && !st.subscriptable {
            st.block_owner()
        } else {
            None
        };

        if owner.is_none() {
            if let Some(token) = self.bracket_shortcut(c, st, flags) {
                return Ok((token, None));
            }
        }

        let mut child = flags.inherit();
        let nested = match &owner {
            Some(owner) => {
                // a real block; its statements stand on their own
                child.collecting = self.keep;
                if owner == "eval" {
                    child.in_eval = true;
                }
                if keywords::is_conditional_block(owner) {
                    child.conditional = true;
                }
                false
            }
            None => {
                if c != '{' {
                    child.eval_active = flags.eval_active;
                }
                flags.collecting
            }
        };

        let tokens = self.enter(c, owner.clone(), child, nested)?;
        Ok((Token::group(c, tokens), owner))
    }

    /// Push a frame for the bracket at the cursor and scan until its
    /// closer.
    fn enter(
        &mut self,
        c: char,
        owner: Option<String>,
        child: Flags,
        nested: bool,
    ) -> Result<Vec<Token>, ScanError> {
        let depth = self
            .stack
            .depth();

        self.stack
            .push(Frame {
                opener: c,
                offset: self.pos,
                owner,
            });
        self.pos += c.len_utf8();

        let tokens = self.scan(child, nested)?;
        debug_assert_eq!(
            self.stack
                .depth(),
            depth
        );

        Ok(tokens)
    }

    /// Brackets whose contents are trivially known: simple hash subscripts
    /// like `{name}` and empty pairs.
    fn bracket_shortcut(&mut self, c: char, st: &Statement, flags: &Flags) -> Option<Token> {
        let rest = self.rest();

        let (width, descriptor) = match c {
            '{' if st.subscriptable => {
                let m = crate::pattern!(r"^\{\s*-?\^?\w+\s*\}").find(rest)?;
                (m.end(), "SUBSCRIPT")
            }
            '{' if !flags.collecting => (crate::pattern!(r"^\{\s*\}").find(rest)?.end(), "{}"),
            '(' if !flags.collecting => (crate::pattern!(r"^\(\s*\)").find(rest)?.end(), "()"),
            '[' if !flags.collecting => (crate::pattern!(r"^\[\s*\]").find(rest)?.end(), "[]"),
            _ => return None,
        };

        Some(self.take(width, descriptor, Class::Term))
    }

    /// Consume `width` bytes as a plain token.
    fn take(&mut self, width: usize, descriptor: &'static str, class: Class) -> Token {
        let token = Token::text(&self.buffer[self.pos..self.pos + width], descriptor, class);
        self.pos += width;
        token
    }

    /// Consume whichever of the candidates matches first, or failing that
    /// the single character at the cursor.
    fn operator(&mut self, candidates: &[&str]) -> Token {
        let rest = self.rest();
        let width = candidates
            .iter()
            .find(|candidate| rest.starts_with(*candidate))
            .map(|candidate| candidate.len())
            .unwrap_or_else(|| {
                rest.chars()
                    .next()
                    .map(char::len_utf8)
                    .unwrap_or(0)
            });

        let descriptor = if rest.starts_with(',') || rest.starts_with("=>") {
            "COMMA"
        } else {
            "OPERATOR"
        };

        self.take(width, descriptor, Class::Operator)
    }

    /// Account for a token: decide whether it starts a statement worth
    /// collecting, buffer it if so, and remember it for the decisions the
    /// next token will need.
    fn emit(&mut self, st: &mut Statement, flags: &mut Flags, token: Token) {
        let class = token.class;
        let word = matches!(class, Class::Keyword | Class::Word);

        if !st.nested && !st.dispatchable {
            let text = token.as_str();
            if word && st.count == 0 && self
                .registry
                .wants(text)
            {
                st.dispatchable = true;
                st.start = st
                    .tokens
                    .len();
                flags.collecting = true;
            } else if class == Class::Keyword && text == "require" {
                st.dispatchable = true;
                st.start = st
                    .tokens
                    .len();
                flags.collecting = true;
            } else if class == Class::Method
                && st.prev_class() == Class::Arrow
                && self
                    .registry
                    .has_callback_for(Kind::Method, text)
            {
                st.dispatchable = true;
                if flags.collecting {
                    st.start = st
                        .tokens
                        .len()
                        .saturating_sub(2);
                } else {
                    st.start = st
                        .tokens
                        .len();
                    let recent = std::mem::take(&mut st.recent);
                    st.tokens
                        .extend(recent);
                    flags.collecting = true;
                }
            }
        }

        if flags.eval_active && class == Class::String {
            if let Some(body) = evaluable(&token) {
                self.rescan(body, flags);
            }
        }

        let chained = st.subscriptable
            && (token.descriptor == "SUBSCRIPT"
                || matches!(token.value, Value::Group { open: '[' | '{', .. }));
        st.subscriptable = chained || matches!(class, Class::Variable | Class::Arrow);

        if matches!(
            class,
            Class::Term | Class::Variable | Class::String | Class::Regexp | Class::Method
        ) {
            flags.in_expression = true;
        }

        let text = match &token.value {
            Value::Text(text) => text.clone(),
            _ => String::new(),
        };

        if st.count == 0 && word {
            st.lead = Some(text.clone());
        }
        st.count += 1;

        if flags.collecting {
            st.tokens
                .push(token);
        } else {
            st.recent
                .push(token);
            if st
                .recent
                .len()
                > 2
            {
                st.recent
                    .remove(0);
            }
        }

        st.prev = Some((text, class));
    }

    /// Finish the current statement, handing it to the registry if it was
    /// being collected for dispatch.
    fn end_statement(&mut self, st: &mut Statement, flags: &mut Flags) {
        if st.nested {
            st.restart();
            flags.in_expression = false;
            flags.eval_active = false;
            return;
        }

        if st.dispatchable {
            let registry = self.registry;
            let eval = self
                .context
                .set_eval(flags.in_eval || flags.string_eval);
            let conditional = self
                .context
                .set_conditional(flags.conditional);

            let kind = registry.dispatch(&mut self.context, &st.tokens[st.start..]);

            self.context
                .set_eval(eval);
            self.context
                .set_conditional(conditional);

            if let Some(kind) = kind {
                trace!(?kind, lead = ?st.lead, "dispatched");
            }

            if self
                .context
                .is_stopped()
            {
                self.ended = true;
            }
        }

        if self.keep {
            let mut tokens = std::mem::take(&mut st.tokens);
            st.scope
                .append(&mut tokens);
        } else {
            st.tokens
                .clear();
        }

        st.restart();
        flags.end_sentence();
        flags.collecting = self.keep;
    }

    /// Scan the body of a string handed to `eval` as code in its own
    /// right. Whatever goes wrong in there stays in there.
    fn rescan(&mut self, body: &str, flags: &Flags) {
        if !crate::pattern!(r"(?:^|[;{\s])(?:use|require|no)\s+(?:[A-Za-z_]|v?\d)").is_match(body) {
            return;
        }

        debug!("scanning evaluated string");

        let buffer = std::mem::replace(&mut self.buffer, body.to_string());
        let pos = std::mem::replace(&mut self.pos, 0);
        let stack = std::mem::take(&mut self.stack);
        let cuts = std::mem::take(&mut self.cuts);
        let keep = std::mem::replace(&mut self.keep, false);
        let diagnostics = self
            .diagnostics
            .len();
        let problems = self.problems;
        let ended = self.ended;
        let non_ascii = self.non_ascii;
        let stopped = self
            .context
            .is_stopped();

        let child = Flags {
            in_eval: true,
            string_eval: true,
            conditional: flags.conditional,
            ..Flags::default()
        };

        if let Err(error) = self.scan(child, false) {
            debug!(%error, "ignoring failure inside evaluated string");
        }

        self.buffer = buffer;
        self.pos = pos;
        self.stack = stack;
        self.cuts = cuts;
        self.keep = keep;
        self.diagnostics
            .truncate(diagnostics);
        self.problems = problems;
        self.ended = ended;
        self.non_ascii = non_ascii;
        if !stopped {
            self.context
                .resume();
        }
    }

    /// POD runs from a line beginning `=word` through the line beginning
    /// `=cut`, or to the end of the file.
    fn skip_documentation(&mut self) -> bool {
        let rest = self.rest();
        if !crate::pattern!(r"^=[A-Za-z]").is_match(rest) {
            return false;
        }

        self.pos += match crate::pattern!(r"(?m)^=cut\b.*$").find(rest) {
            Some(m) => m.end(),
            None => rest.len(),
        };
        true
    }

    fn skip_comment(&mut self) {
        let rest = self.rest();
        self.pos += rest
            .find('\n')
            .unwrap_or(rest.len());
    }

    fn read_token(
        &mut self,
        c: char,
        st: &mut Statement,
        flags: &mut Flags,
    ) -> Result<Option<Token>, ScanError> {
        let token = match c {
            '$' => self.read_scalar(st, flags)?,
            '@' => self.read_array(st, flags)?,
            '%' => self.read_hash(st, flags)?,
            '&' => self.read_ampersand(st, flags)?,
            '*' => self.read_star(st, flags)?,
            '\\' => self.take(1, "REFERENCE", Class::Operator),
            '-' => self.read_minus(st),
            '+' => self.read_plus(st),
            '.' => self.read_dot(st),
            '/' => self.read_slash(st, flags),
            '<' => self.read_angle(st)?,
            '>' => self.operator(&[">>=", ">>", ">="]),
            '=' => self.operator(&["==", "=>", "=~"]),
            '!' => self.operator(&["!~", "!="]),
            '|' => self.operator(&["||=", "||", "|.=", "|=", "|."]),
            '^' => self.operator(&["^^=", "^^", "^.=", "^=", "^."]),
            '~' => self.operator(&["~~", "~."]),
            ':' => self.operator(&["::"]),
            '?' | ',' => self.operator(&[]),
            '\'' | '"' | '`' => match self.read_quoted(c) {
                Some(token) => token,
                None => return Ok(None),
            },
            '0'..='9' => self.read_number(0),
            c if c == '_' || c.is_ascii_alphabetic() => return self.read_word(st, flags),
            c if !c.is_ascii() => return Ok(self.read_non_ascii()),
            c if c.is_control() => {
                self.pos += c.len_utf8();
                // ^D and ^Z are end of file markers
                if c == '\x04' || c == '\x1a' {
                    self.ended = true;
                }
                return Ok(None);
            }
            c => {
                let at = self.pos;
                self.pos += c.len_utf8();
                self.problem(at, format!("unrecognized character '{}'", c));
                return Ok(None);
            }
        };

        Ok(Some(token))
    }

    /// Scan the block of a dereference like `@{ ... }`, with the cursor on
    /// the sigils preceding the brace.
    fn read_dereference(
        &mut self,
        sigils: usize,
        descriptor: &'static str,
        flags: &Flags,
    ) -> Result<Token, ScanError> {
        self.pos += sigils;

        let mut child = flags.inherit();
        child.eval_active = flags.eval_active;
        let tokens = self.enter('{', None, child, flags.collecting)?;

        Ok(Token {
            value: Value::Group {
                open: '{',
                tokens,
            },
            descriptor,
            class: Class::Variable,
        })
    }

    fn read_scalar(&mut self, st: &Statement, flags: &mut Flags) -> Result<Token, ScanError> {
        let rest = self.rest();

        if st.prev_class() == Class::Arrow {
            if let Some(form) = ["$#*", "$*"]
                .iter()
                .find(|form| rest.starts_with(*form))
            {
                return Ok(self.take(form.len(), "POSTFIX_DEREF", Class::Term));
            }
        }

        if let Some(m) = crate::pattern!(r"^\$\{\s*\^?\w+\s*\}").find(rest) {
            return Ok(self.take(m.end(), "VARIABLE", Class::Variable));
        }
        if rest.starts_with("$#{") {
            return self.read_dereference(2, "LAST_INDEX", flags);
        }
        if let Some(m) = crate::pattern!(r"^\$+\{").find(rest) {
            return self.read_dereference(m.end() - 1, "SCALAR_DEREF", flags);
        }
        if let Some(m) = crate::pattern!(r"^\$#\$*(?:[A-Za-z_]\w*(?:::\w+)*|::\w+(?:::\w+)*)").find(rest) {
            return Ok(self.take(m.end(), "LAST_INDEX", Class::Variable));
        }

        let variable = crate::pattern!(r"^\$+(?:[A-Za-z_]\w*(?:::\w+)*(?:::)?|::\w*(?:::\w+)*|\^\w|\d+)");
        let width = if let Some(m) = variable.find(rest) {
            m.end()
        } else if rest.starts_with("$#") {
            2
        } else if let Some(m) = crate::pattern!(r#"^\$[&`'+!@/\\,.<>\]0_~=%^:?|"\-$]"#).find(rest) {
            m.end()
        } else {
            return Ok(self.take(1, "OPERATOR", Class::Operator));
        };

        let class = if st.prev_class() == Class::Arrow {
            // a method called by name held in a variable
            Class::Term
        } else {
            Class::Variable
        };
        Ok(self.take(width, "VARIABLE", class))
    }

    fn read_array(&mut self, st: &Statement, flags: &mut Flags) -> Result<Token, ScanError> {
        let rest = self.rest();

        if st.prev_class() == Class::Arrow {
            if rest.starts_with("@*") {
                return Ok(self.take(2, "POSTFIX_DEREF", Class::Term));
            }
            if rest.starts_with("@[") || rest.starts_with("@{") {
                return Ok(self.take(1, "POSTFIX_SLICE", Class::Variable));
            }
        }

        if let Some(m) = crate::pattern!(r"^@\$*\{").find(rest) {
            return self.read_dereference(m.end() - 1, "ARRAY_DEREF", flags);
        }

        let width = crate::pattern!(r"^@\$*(?:[A-Za-z_]\w*(?:::\w+)*|::\w*(?:::\w+)*|\^\w|[+\-])")
            .find(rest)
            .map(|m| m.end());

        Ok(match width {
            Some(width) => self.take(width, "ARRAY", Class::Variable),
            None => self.take(1, "OPERATOR", Class::Operator),
        })
    }

    fn read_hash(&mut self, st: &Statement, flags: &mut Flags) -> Result<Token, ScanError> {
        let rest = self.rest();

        if st.prev_class() == Class::Arrow {
            if rest.starts_with("%*") {
                return Ok(self.take(2, "POSTFIX_DEREF", Class::Term));
            }
            if rest.starts_with("%[") || rest.starts_with("%{") {
                return Ok(self.take(1, "POSTFIX_SLICE", Class::Variable));
            }
        }

        if st.term_before() {
            return Ok(self.operator(&["%="]));
        }

        if let Some(m) = crate::pattern!(r"^%\$*\{").find(rest) {
            return self.read_dereference(m.end() - 1, "HASH_DEREF", flags);
        }

        let width = crate::pattern!(r"^%\$*(?:[A-Za-z_]\w*(?:::\w+)*|::\w*(?:::\w+)*|\^\w|[+\-!])")
            .find(rest)
            .map(|m| m.end());

        Ok(match width {
            Some(width) => self.take(width, "HASH", Class::Variable),
            None => self.operator(&["%="]),
        })
    }

    fn read_ampersand(&mut self, st: &Statement, flags: &mut Flags) -> Result<Token, ScanError> {
        let rest = self.rest();

        if rest.starts_with("&&") {
            return Ok(self.operator(&["&&=", "&&"]));
        }
        if st.term_before() {
            return Ok(self.operator(&["&.=", "&=", "&."]));
        }
        if st.prev_class() == Class::Arrow && rest.starts_with("&*") {
            return Ok(self.take(2, "POSTFIX_DEREF", Class::Term));
        }

        if let Some(m) = crate::pattern!(r"^&\$*\{").find(rest) {
            return self.read_dereference(m.end() - 1, "CODE_DEREF", flags);
        }

        let width = crate::pattern!(r"^&\$*(?:[A-Za-z_]\w*(?:::\w+)*|::\w+(?:::\w+)*)")
            .find(rest)
            .map(|m| m.end());

        Ok(match width {
            Some(width) => self.take(width, "CODE", Class::Term),
            None => self.operator(&["&="]),
        })
    }

    fn read_star(&mut self, st: &Statement, flags: &mut Flags) -> Result<Token, ScanError> {
        let rest = self.rest();

        if rest.starts_with("**") {
            return Ok(self.operator(&["**=", "**"]));
        }
        if st.term_before() {
            return Ok(self.operator(&["*="]));
        }

        if let Some(m) = crate::pattern!(r"^\*\$*\{").find(rest) {
            return self.read_dereference(m.end() - 1, "GLOB_DEREF", flags);
        }

        let width = crate::pattern!(r"^\*\$*(?:[A-Za-z_]\w*(?:::\w+)*|::\w*(?:::\w+)*)")
            .find(rest)
            .map(|m| m.end());

        Ok(match width {
            Some(width) => self.take(width, "GLOB", Class::Variable),
            None => self.operator(&["*="]),
        })
    }

    fn read_minus(&mut self, st: &Statement) -> Token {
        let rest = self.rest();

        if rest.starts_with("->") {
            return self.take(2, "ARROW", Class::Arrow);
        }
        if rest.starts_with("--") || rest.starts_with("-=") {
            return self.take(2, "OPERATOR", Class::Operator);
        }

        if !st.term_before() {
            if let Some(m) = crate::pattern!(r"^-[A-Za-z_]\w*").find(rest) {
                let after = &rest[m.end()..];
                if m.end() > 2 || is_fat_comma(after) {
                    // -bareword, as in `use parent -norequire, ...`
                    return self.take(m.end(), "WORD", Class::Word);
                }
                if after
                    .chars()
                    .next()
                    .map_or(true, |c| c.is_whitespace() || matches!(c, '$' | '"' | '\'' | '('))
                {
                    return self.take(2, "FILETEST", Class::Operator);
                }
            }

            if starts_number(&rest[1..]) {
                return self.read_number(1);
            }
        }

        self.take(1, "OPERATOR", Class::Operator)
    }

    fn read_plus(&mut self, st: &Statement) -> Token {
        let rest = self.rest();

        if rest.starts_with("++") || rest.starts_with("+=") {
            return self.take(2, "OPERATOR", Class::Operator);
        }
        if !st.term_before() && starts_number(&rest[1..]) {
            return self.read_number(1);
        }

        self.take(1, "OPERATOR", Class::Operator)
    }

    fn read_dot(&mut self, st: &Statement) -> Token {
        let rest = self.rest();

        if !st.term_before() && starts_number(rest) {
            return self.read_number(0);
        }

        self.operator(&["...", "..", ".="])
    }

    /// A number at the cursor, after `sign` bytes of leading `+` or `-`.
    fn read_number(&mut self, sign: usize) -> Token {
        let (width, descriptor) = number_width(&self.buffer[self.pos + sign..]);
        self.take(sign + width, descriptor, Class::Term)
    }

    fn read_slash(&mut self, st: &Statement, flags: &Flags) -> Token {
        if may_be_pattern(st, flags) {
            if let Ok(token) = self.match_pattern("") {
                return token;
            }
        }

        self.operator(&["//=", "//", "/="])
    }

    fn read_angle(&mut self, st: &Statement) -> Result<Token, ScanError> {
        if self
            .rest()
            .starts_with("<<")
        {
            let at = self.pos;
            if let Some(spliced) = match_heredoc(&mut self.buffer, at)? {
                self.cuts
                    .push((spliced.cut_at, spliced.removed));
                self.pos += spliced.consumed;
                return Ok(spliced.token);
            }
        }

        let rest = self.rest();
        if !st.term_before() {
            if rest.starts_with("<<>>") {
                return Ok(self.take(4, "READLINE", Class::Term));
            }
            if let Some(m) = crate::pattern!(r"^<[^\s<>=;()]*>").find(rest) {
                return Ok(self.take(m.end(), "READLINE", Class::Term));
            }
        }

        Ok(self.operator(&["<=>", "<<=", "<<", "<="]))
    }

    fn read_quoted(&mut self, quote: char) -> Option<Token> {
        let at = self.pos;
        let inner = &self.buffer[at + 1..];

        match quoted_body(inner, quote) {
            Some(width) => {
                let token = Token::quoted(&inner[..width], &quote.to_string());
                self.pos += width + 2;
                Some(token)
            }
            None => {
                let problem = MatchError::new("unterminated string", &self.buffer[at..]);
                self.pos += 1;
                self.problem(at, problem.to_string());
                None
            }
        }
    }

    fn read_word(&mut self, st: &mut Statement, flags: &mut Flags) -> Result<Option<Token>, ScanError> {
        let rest = self.rest();

        if let Some(m) = crate::pattern!(r"^v\d+(?:\.\d+)*").find(rest) {
            let after = &rest[m.end()..];
            let joined = after
                .chars()
                .next()
                .map_or(false, |c| c == '_' || c.is_alphanumeric());
            if !joined && !is_fat_comma(after) {
                return Ok(Some(self.take(m.end(), "VERSION_STRING", Class::Term)));
            }
        }

        let width = crate::pattern!(r"^(?:[A-Za-z_]\w*(?:::\w+)*(?:::)?|::\w+(?:::\w+)*)")
            .find(rest)
            .map(|m| m.end())
            .unwrap_or(1);
        let word = rest[..width].to_string();
        let after = &rest[width..];
        let fat = is_fat_comma(after);
        let delimited = acceptable_delimiter(after);
        let colon = label_colon(after);

        if st.prev_class() == Class::Arrow {
            return Ok(Some(self.take(width, "METHOD", Class::Method)));
        }
        if fat {
            return Ok(Some(self.take(width, "WORD", Class::Word)));
        }

        let named = st.prev_class() == Class::Keyword && keywords::expects_word(st.prev_text());

        if !named && (keywords::is_quotelike(&word) || keywords::is_pattern_operator(&word)) {
            if delimited {
                let at = self.pos;
                self.pos += width;

                let result = match word.as_str() {
                    "m" | "qr" => self.match_pattern(&word),
                    "s" => self.match_substitution(),
                    "tr" | "y" => self.match_transliteration(&word),
                    _ => match match_quotelike(self.rest(), &word) {
                        Ok((token, consumed)) => {
                            self.pos += consumed;
                            Ok(token)
                        }
                        Err(problem) => Err(problem),
                    },
                };

                match result {
                    Ok(token) => return Ok(Some(token)),
                    Err(problem) => {
                        self.pos = at;
                        self.problem(at, format!("'{}': {}", word, problem));
                    }
                }
            }
        }

        if st.count == 0 && (word == "__END__" || word == "__DATA__") {
            self.ended = true;
            return Ok(None);
        }

        if st.count == 0 && !keywords::is_builtin(&word) {
            if let Some(colon) = colon {
                trace!(label = %word, "label");
                self.pos += width + colon;
                return Ok(None);
            }
        }

        if st.count == 0 && word == "format" && self.skip_format() {
            return Ok(None);
        }

        let class = if named {
            Class::Word
        } else if keywords::is_named_operator(&word) {
            Class::Operator
        } else if keywords::is_builtin(&word) {
            Class::Keyword
        } else {
            Class::Word
        };

        let descriptor = match class {
            Class::Keyword => "KEYWORD",
            Class::Operator => "OPERATOR",
            _ => "WORD",
        };
        let token = self.take(width, descriptor, class);

        match class {
            Class::Keyword => {
                if word == "eval" {
                    flags.eval_active = true;
                }
                st.keywords
                    .push(word);
            }
            Class::Word => {
                if keywords::expects_block(&word)
                    || self
                        .registry
                        .has_callback_for(Kind::Keyword, &word)
                {
                    st.keywords
                        .push(word);
                }
            }
            _ => {}
        }

        Ok(Some(token))
    }

    /// `format NAME =` declarations run to a line holding a lone dot.
    fn skip_format(&mut self) -> bool {
        let rest = self.rest();
        let header = match crate::pattern!(r"^format\b[ \t]*[\w:]*[ \t]*=[ \t]*\n").find(rest) {
            Some(m) => m.end(),
            None => return false,
        };

        let body = &rest[header..];
        self.pos += header
            + match crate::pattern!(r"(?m)^\.[ \t]*$").find(body) {
                Some(m) => m.end(),
                None => body.len(),
            };
        true
    }

    fn read_non_ascii(&mut self) -> Option<Token> {
        let at = self.pos;
        let rest = self.rest();

        if self
            .context
            .utf8()
        {
            if let Some(m) = crate::pattern!(r"^\w+(?:::\w+)*").find(rest) {
                return Some(self.take(m.end(), "WORD", Class::Word));
            }
            let c = rest
                .chars()
                .next()?;
            self.pos += c.len_utf8();
            self.problem(at, format!("unrecognized character '{}'", c));
            return None;
        }

        let width = rest
            .char_indices()
            .find(|(_, c)| c.is_ascii())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let run = rest[..width].to_string();

        self.pos += width;
        self.non_ascii = true;
        self.problem(at, format!("non-ASCII characters '{}' without 'use utf8'", run));
        None
    }
}

fn semicolon() -> Token {
    Token::text(";", "SEMICOLON", Class::Operator)
}

/// Does closing the block owned by `owner` also finish the statement the
/// block belongs to?
fn block_ends_statement(st: &Statement, owner: Option<&str>) -> bool {
    match owner {
        Some(owner) => {
            keywords::ends_statement(owner)
                && st
                    .lead
                    .as_deref()
                    .map_or(false, keywords::ends_statement)
        }
        // a bare block
        None => st.count == 0,
    }
}

/// Whether a '/' here starts a pattern rather than dividing.
fn may_be_pattern(st: &Statement, flags: &Flags) -> bool {
    match st.prev_class() {
        Class::None | Class::Operator => true,
        Class::Keyword => keywords::pattern_may_follow(st.prev_text()),
        Class::Word => {
            !flags.in_expression
                || st
                    .keywords
                    .last()
                    .map_or(false, |keyword| keyword == st.prev_text())
        }
        _ => false,
    }
}

/// The body of a literal that `eval` would run as code.
fn evaluable(token: &Token) -> Option<&str> {
    match &token.value {
        Value::Quoted { body, operator } => {
            matches!(operator.as_str(), "'" | "\"" | "q" | "qq").then_some(body.as_str())
        }
        Value::Heredoc { body, .. } => Some(body.as_str()),
        _ => None,
    }
}

fn is_fat_comma(text: &str) -> bool {
    text.trim_start()
        .starts_with("=>")
}

/// Width up to and including the colon of a statement label, if `text`
/// (following a bareword) is one.
fn label_colon(text: &str) -> Option<usize> {
    let trimmed = text.trim_start_matches([' ', '\t']);
    if trimmed.starts_with(':') && !trimmed.starts_with("::") {
        Some(text.len() - trimmed.len() + 1)
    } else {
        None
    }
}

/// Whether the text following a quote-like or pattern operator name could
/// be its delimiter, rather than the name being a plain word.
fn acceptable_delimiter(text: &str) -> bool {
    let skip = skip_to_delimiter(text);
    let mut chars = text[skip..].chars();

    match chars.next() {
        None => false,
        Some('=') => skip == 0 && !matches!(chars.next(), Some('=' | '>' | '~')),
        Some(c) if skip > 0 && (c == '_' || c.is_alphanumeric()) => false,
        Some(c) => !matches!(c, ',' | ';' | ')' | ']' | '}' | '>'),
    }
}

fn starts_number(text: &str) -> bool {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_digit() => true,
        Some(b'.') => bytes
            .get(1)
            .map_or(false, u8::is_ascii_digit),
        _ => false,
    }
}

/// Width of the numeric literal at the front of `text`, along with whether
/// it is an ordinary number or a dotted version string like `1.2.3`.
fn number_width(text: &str) -> (usize, &'static str) {
    let bytes = text.as_bytes();
    let digits = |from: usize, accept: fn(&u8) -> bool| {
        let mut i = from;
        while i < bytes.len() && (accept(&bytes[i]) || bytes[i] == b'_') {
            i += 1;
        }
        i
    };

    if text.starts_with("0x") || text.starts_with("0X") {
        return (digits(2, u8::is_ascii_hexdigit), "NUMBER");
    }
    if text.starts_with("0b") || text.starts_with("0B") {
        return (digits(2, |b| *b == b'0' || *b == b'1'), "NUMBER");
    }

    let mut i = digits(0, u8::is_ascii_digit);
    let mut dots = 0;
    while i + 1 < bytes.len() && bytes[i] == b'.' && bytes[i + 1].is_ascii_digit() {
        i = digits(i + 1, u8::is_ascii_digit);
        dots += 1;
    }

    if dots > 1 {
        return (i, "VERSION_STRING");
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        if bytes
            .get(j)
            .map_or(false, u8::is_ascii_digit)
        {
            i = digits(j, u8::is_ascii_digit);
        }
    }

    (i, "NUMBER")
}

#[cfg(test)]
mod check {
    use super::*;
    use crate::context::Tier;

    fn tokens(source: &str) -> Vec<Token> {
        let registry = Registry::new();
        let mut scanner = Scanner::new(&registry);
        scanner.initialize(source, false);
        scanner.keep_tokens(true);
        scanner
            .run()
            .unwrap()
    }

    fn scanned(source: &str) -> Context {
        let registry = Registry::new();
        let mut scanner = Scanner::new(&registry);
        scanner.initialize(source, false);
        scanner
            .run()
            .unwrap();
        assert_eq!(
            scanner
                .stack
                .depth(),
            0
        );
        scanner.context
    }

    fn descriptors(tokens: &[Token]) -> Vec<&'static str> {
        tokens
            .iter()
            .map(|token| token.descriptor)
            .collect()
    }

    #[test]
    fn numbers() {
        assert_eq!(number_width("123;"), (3, "NUMBER"));
        assert_eq!(number_width("1.5e10 "), (6, "NUMBER"));
        assert_eq!(number_width("0x1F,"), (4, "NUMBER"));
        assert_eq!(number_width("0b101)"), (5, "NUMBER"));
        assert_eq!(number_width("1_000_000"), (9, "NUMBER"));
        assert_eq!(number_width("1..10"), (1, "NUMBER"));
        assert_eq!(number_width("5.010_001;"), (9, "NUMBER"));
        assert_eq!(number_width("1.2.3;"), (5, "VERSION_STRING"));
        assert_eq!(number_width(".5"), (2, "NUMBER"));
    }

    #[test]
    fn delimiters_after_operator_names() {
        assert!(acceptable_delimiter("{foo}"));
        assert!(acceptable_delimiter("/a/b/"));
        assert!(acceptable_delimiter(" (a b c)"));
        assert!(acceptable_delimiter("#foo#"));
        assert!(!acceptable_delimiter(" => 1"));
        assert!(!acceptable_delimiter(", 1"));
        assert!(!acceptable_delimiter(";"));
        assert!(!acceptable_delimiter(" = 3"));
        assert!(!acceptable_delimiter(" foo"));
        assert!(!acceptable_delimiter(""));
    }

    #[test]
    fn labels() {
        assert_eq!(label_colon(": for"), Some(1));
        assert_eq!(label_colon("  : while"), Some(3));
        assert_eq!(label_colon("::Foo"), None);
        assert_eq!(label_colon(" = 1"), None);
    }

    #[test]
    fn division_and_patterns() {
        let result = tokens("split /,/, $x;");
        assert_eq!(result[1].class, Class::Regexp);

        let result = tokens("$a / $b / $c;");
        assert_eq!(
            descriptors(&result),
            vec!["VARIABLE", "OPERATOR", "VARIABLE", "OPERATOR", "VARIABLE", "SEMICOLON"]
        );

        let result = tokens("$x =~ /foo/i;");
        assert_eq!(result[2].class, Class::Regexp);
    }

    #[test]
    fn slash_after_a_group_or_a_boundary() {
        let result = tokens("($a + $b) / 2;\n/x/ and print;\n");
        assert_eq!(
            descriptors(&result)[..4].to_vec(),
            vec!["()", "OPERATOR", "NUMBER", "SEMICOLON"]
        );
        assert_eq!(result[4].class, Class::Regexp);

        let result = tokens("if ($x) { 1 }\n/y/ and print;\n");
        assert!(result
            .iter()
            .any(|token| token.class == Class::Regexp));
    }

    #[test]
    fn subscripts_are_not_blocks() {
        let result = tokens("$h{s} = $h{y} + $h{q};");
        assert!(result
            .iter()
            .all(|token| token.class != Class::Regexp && token.class != Class::String));
    }

    #[test]
    fn blocks_end_statements() {
        let context = scanned("if ($x) { 1 }\nuse Foo;\nsub bar { }\nuse Bar;\n");
        assert!(context
            .requires()
            .contains("Foo"));
        assert!(context
            .requires()
            .contains("Bar"));
    }

    #[test]
    fn eval_blocks_and_strings() {
        let context = scanned("eval { require Foo; 1 };\neval \"use Bar; 1\" or warn;\n");
        assert_eq!(context.tier_of("Foo"), Some(Tier::Suggested));
        assert_eq!(context.tier_of("Bar"), Some(Tier::Suggested));
    }

    #[test]
    fn heredocs_in_the_middle_of_a_line() {
        let context = scanned("print <<END . 'x';\nuse Nope;\nEND\nuse Yes;\n");
        assert!(context.uses("Yes"));
        assert!(!context.uses("Nope"));
    }

    #[test]
    fn documentation_and_end_of_code() {
        let context = scanned("=head1 NAME\n\nuse Nope;\n\n=cut\nuse Yes;\n__END__\nuse Also::Nope;\n");
        assert!(context.uses("Yes"));
        assert!(!context.uses("Nope"));
        assert!(!context.uses("Also::Nope"));
    }

    #[test]
    fn mismatched_brackets_are_fatal() {
        let registry = Registry::new();
        let mut scanner = Scanner::new(&registry);

        scanner.initialize("foo(1];\n", false);
        assert_eq!(scanner.run(), Err(ScanError::Mismatch(5, '(', ']')));

        scanner.initialize("1;\n}\n", false);
        assert_eq!(scanner.run(), Err(ScanError::UnexpectedCloser(3, '}')));
    }

    #[test]
    fn error_offsets_point_into_the_original() {
        let registry = Registry::new();
        let mut scanner = Scanner::new(&registry);

        scanner.initialize("print <<A;\nbody\nA\n)\n", false);
        assert_eq!(scanner.run(), Err(ScanError::UnexpectedCloser(18, ')')));
    }

    #[test]
    fn unclosed_brackets_are_reported() {
        let registry = Registry::new();
        let mut scanner = Scanner::new(&registry);

        scanner.initialize("foo(1,\n2;\n", false);
        assert!(scanner
            .run()
            .is_ok());
        assert_eq!(
            scanner
                .stack
                .depth(),
            0
        );
        assert_eq!(scanner.diagnostics()[0].line, 1);
    }

    #[test]
    fn nesting_limit() {
        let registry = Registry::new();
        let mut scanner = Scanner::new(&registry);

        let source = "(".repeat(MAXIMUM_DEPTH + 1);
        scanner.initialize(&source, false);
        assert!(matches!(scanner.run(), Err(ScanError::TooDeep(_))));
    }

    #[test]
    fn non_ascii_before_utf8() {
        let registry = Registry::new();
        let mut scanner = Scanner::new(&registry);

        scanner.initialize("print 1 × 2;\nuse utf8;\n", false);
        scanner
            .run()
            .unwrap();
        assert!(scanner.needs_rescan());
        assert_eq!(
            scanner
                .diagnostics()
                .len(),
            1
        );

        scanner.initialize("use utf8;\nmy $x = 1;\n", false);
        scanner
            .run()
            .unwrap();
        assert!(!scanner.needs_rescan());
    }
}
