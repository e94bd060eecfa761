/*!
 * Text Heuristic
 * Decides whether a sampled header looks like UTF-8 text or binary data
 */

use crate::core::limits::{MAX_CONTROL_CHAR, UTF8_TAIL_TOLERANCE};

/// True when `sample` looks binary
///
/// Binary means a control character at or below `MAX_CONTROL_CHAR` appears,
/// or a replacement character (literal U+FFFD or an invalid UTF-8 sequence)
/// starts before the last `UTF8_TAIL_TOLERANCE` bytes. A multi-byte sequence
/// cut off by the end of the sample is tolerated.
#[must_use]
pub fn is_binary(sample: &[u8]) -> bool {
    // Bytes <= 8 never occur inside a multi-byte sequence
    if sample.iter().any(|&b| u32::from(b) <= MAX_CONTROL_CHAR) {
        return true;
    }

    let tail = sample.len().saturating_sub(UTF8_TAIL_TOLERANCE);
    let mut offset = 0;

    while offset < sample.len() {
        match std::str::from_utf8(&sample[offset..]) {
            Ok(text) => return replacement_before(text, offset, tail),
            Err(e) => {
                let valid_end = offset + e.valid_up_to();
                if let Ok(text) = std::str::from_utf8(&sample[offset..valid_end]) {
                    if replacement_before(text, offset, tail) {
                        return true;
                    }
                }
                if valid_end < tail {
                    return true;
                }
                match e.error_len() {
                    // Truncated at the end of the sample
                    None => return false,
                    Some(len) => offset = valid_end + len,
                }
            }
        }
    }

    false
}

fn replacement_before(text: &str, base: usize, tail: usize) -> bool {
    text.char_indices()
        .any(|(i, c)| c == char::REPLACEMENT_CHARACTER && base + i < tail)
}
