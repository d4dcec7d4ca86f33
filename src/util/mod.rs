//! Shared text helpers used by the normalizer and the render path.

mod text;

pub use text::{excerpt_words, truncate_chars, truncate_to_width};
