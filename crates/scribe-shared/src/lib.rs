//! # Scribe Shared
//!
//! Form payloads and text helpers shared by the web app and its templates.

pub mod forms;
pub mod text;

pub use forms::{FormErrors, REQUIRED};
pub use text::uglify;
