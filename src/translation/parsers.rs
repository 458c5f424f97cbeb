pub(super) fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

/// If a `:name` placeholder starts at `idx`, return the byte offset just past the name.
///
/// The colon must sit at the start of the text or after a non-word, non-colon byte, so
/// `a::int` casts and `x:y` mid-word colons are not placeholders.
pub(super) fn scan_placeholder(bytes: &[u8], idx: usize) -> Option<usize> {
    if bytes.get(idx) != Some(&b':') {
        return None;
    }
    if idx > 0 {
        let prev = bytes[idx - 1];
        if is_word_byte(prev) || prev == b':' {
            return None;
        }
    }
    if !is_ident_start(*bytes.get(idx + 1)?) {
        return None;
    }

    let mut end = idx + 2;
    while end < bytes.len() && is_word_byte(bytes[end]) {
        end += 1;
    }
    Some(end)
}
