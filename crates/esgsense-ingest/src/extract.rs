//! Field extraction from raw feed cells: tone vectors and theme tokens.
//!
//! Both parsers are total: malformed input yields `None` or an empty list,
//! never an error.

pub mod themes;
pub mod tone;

pub use themes::{categorize, extract_themes};
pub use tone::{parse_tone, ToneVector};
