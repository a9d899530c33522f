//! Text filters used by templates.

/// Alternate case by position: even indices upper, odd indices lower.
///
/// Positions count `char`s, not bytes. A character whose case mapping expands
/// (e.g. `ß` → `SS`) contributes every mapped character.
pub fn uglify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (index, c) in text.chars().enumerate() {
        if index % 2 == 0 {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
