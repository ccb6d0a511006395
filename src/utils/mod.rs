//! Small shared helpers.

mod text;

pub use text::{escape_markdown, html_escape, truncate_title};
