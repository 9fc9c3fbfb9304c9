//! Find the modules a piece of Perl source depends on, without running it.

mod regex;

pub mod context;
pub mod dispatch;
pub mod error;
pub mod output;
pub mod plugins;
pub mod scanning;

pub use context::{Context, Prerequisites, Requirements, Tier, Version};
pub use dispatch::{Kind, Plugin, Registry};
pub use scanning::{scan, tokenize, Outcome};
