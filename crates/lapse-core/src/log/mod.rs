mod parser;
mod reader;
mod types;

pub use parser::{LineOutcome, SkipReason, parse, parse_line};
pub use reader::LogReader;
pub use types::*;
