//! Plain text recovery from `message.attributedBody`.
//!
//! Newer Messages versions often leave `message.text` NULL and store the body
//! only as a typedstream-archived `NSAttributedString`. The string payload
//! follows the `NSString` class name as `+ <length> <utf8 bytes>`, where the
//! length is one byte below 0x80, or 0x81/0x82 followed by a 2/3-byte
//! little-endian length.

const NSSTRING_MARKER: &[u8] = b"NSString";
const PAYLOAD_TAG: u8 = 0x2B;
const MARKER_SEARCH_WINDOW: usize = 20;

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Decode the length prefix at `pos`, returning (text start, text length).
fn decode_length(data: &[u8], pos: usize) -> Option<(usize, usize)> {
    let first = *data.get(pos)?;
    match first {
        0x00..=0x7F => Some((pos + 1, first as usize)),
        0x81 => {
            let bytes = data.get(pos + 1..pos + 3)?;
            Some((pos + 3, bytes[0] as usize | (bytes[1] as usize) << 8))
        }
        0x82 => {
            let bytes = data.get(pos + 1..pos + 4)?;
            Some((
                pos + 4,
                bytes[0] as usize | (bytes[1] as usize) << 8 | (bytes[2] as usize) << 16,
            ))
        }
        _ => None,
    }
}

/// Extract the message text, or `None` if the blob has no readable string.
pub fn extract_text(data: &[u8]) -> Option<String> {
    let marker = find_subsequence(data, NSSTRING_MARKER)?;
    let search_start = marker + NSSTRING_MARKER.len();
    let search_end = (search_start + MARKER_SEARCH_WINDOW).min(data.len());

    for tag_pos in search_start..search_end {
        if data[tag_pos] != PAYLOAD_TAG {
            continue;
        }
        let Some((start, len)) = decode_length(data, tag_pos + 1) else {
            continue;
        };
        let Some(bytes) = data.get(start..start + len) else {
            continue;
        };
        if let Ok(text) = std::str::from_utf8(bytes) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
    }

    None
}
