//! Reference path algebra: `<document>#/<key>/<key>...` strings.
//!
//! All functions are pure substring operations. Keys are case-sensitive and
//! no escaping is supported.

/// Separates the document part from the in-document pointer.
pub const DELIMITER: char = '#';

/// Separates keys inside the pointer part.
pub const SEGMENT_SEPARATOR: char = '/';

/// True when the reference has no document part and targets the same document.
pub fn is_local(path: &str) -> bool {
    return path.starts_with(DELIMITER);
}

/// The file part of a reference, empty for local references.
pub fn document_part(path: &str) -> &str {
    return match path.split_once(DELIMITER) {
        Some((document, _)) => document,
        None => path,
    };
}

/// The pointer part of a reference, including the leading delimiter.
/// Empty when the reference has no delimiter at all.
pub fn pointer_part(path: &str) -> &str {
    return match path.find(DELIMITER) {
        Some(idx) => path.get(idx..).unwrap_or(""),
        None => "",
    };
}

/// Ordered keys to walk from the target document's root.
pub fn pointer_segments(path: &str) -> Vec<&str> {
    let pointer = pointer_part(path);
    let Some(keys) = pointer.strip_prefix(DELIMITER) else {
        return Vec::new();
    };
    let Some(keys) = keys.strip_prefix(SEGMENT_SEPARATOR) else {
        // `#` alone, or `#key` without a leading slash: nothing to discard.
        return keys.split(SEGMENT_SEPARATOR).filter(|k| return !k.is_empty()).collect();
    };
    return keys.split(SEGMENT_SEPARATOR).collect();
}

/// Local form a remote reference takes once its target is copied into the
/// combining document: the document part is dropped, the pointer kept.
pub fn promote(path: &str) -> &str {
    return pointer_part(path);
}

/// Sort key placing remote references before local ones.
/// Used with a stable sort so discovery order is kept within each group.
pub fn remote_first_rank(path: &str) -> u8 {
    return u8::from(is_local(path));
}
