// Stateless input checks shared by every vetta transport

pub mod types;
pub mod email;
pub mod phone;
pub mod uri;
pub mod pattern;

pub use email::validate_email;
pub use pattern::{validate_regex, validate_regex_with_flags, CompiledPattern, PatternError, RegexFlags};
pub use phone::validate_phone;
pub use types::*;
pub use uri::{check_url, validate_url, UrlError};
