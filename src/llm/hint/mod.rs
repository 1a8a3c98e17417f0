

pub mod extract;
pub mod models;
pub mod parser;
pub mod permissive;
pub mod prompt;

pub use extract::{decode_hint, first_brace_block};
pub use models::{HintError, StructuredHint};
pub use parser::HintParser;
pub use permissive::{PermissiveError, parse_permissive};
