//! Scope flags and the bracket stack

/// State carried by one level of nesting. A child scope starts from
/// `inherit()` of its parent; nothing flows back up when it closes.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct Flags {
    pub in_expression: bool,
    pub collecting: bool,
    pub eval_active: bool,
    pub in_eval: bool,
    pub string_eval: bool,
    pub conditional: bool,
    pub expects_bracket: bool,
}

impl Flags {
    /// Flags for a child scope opened by a bracket.
    pub fn inherit(&self) -> Flags {
        Flags {
            collecting: self.collecting,
            in_eval: self.in_eval,
            string_eval: self.string_eval,
            conditional: self.conditional,
            expects_bracket: true,
            ..Flags::default()
        }
    }

    /// Clear the per-statement state at a statement boundary.
    pub fn end_sentence(&mut self) {
        self.in_expression = false;
        self.collecting = false;
        self.eval_active = false;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub opener: char,
    pub offset: usize,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    frames: Vec<Frame>,
}

impl Stack {
    pub fn new() -> Stack {
        Stack { frames: vec![] }
    }

    pub fn current(&self) -> Option<&Frame> {
        self.frames
            .last()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames
            .push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames
            .pop()
    }

    pub fn depth(&self) -> usize {
        self.frames
            .len()
    }

    /// Discard frames pushed after a snapshot was taken.
    pub fn truncate(&mut self, depth: usize) {
        self.frames
            .truncate(depth);
    }

    pub fn reset(&mut self) {
        self.frames
            .clear();
    }
}
