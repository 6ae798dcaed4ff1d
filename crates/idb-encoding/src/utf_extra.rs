//! Decoders for BOM-detectable encodings outside encoding_rs.
//!
//! UTF-32LE and UTF-7 appear in the wild only as BOM-carrying legacy
//! files, so both get a read path here. Neither has a write path.

/// Decode UTF-32LE, stripping a leading BOM.
///
/// Invalid code points and a trailing partial unit become U+FFFD.
pub(crate) fn decode_utf32le(bytes: &[u8]) -> (String, bool) {
    let body = bytes
        .strip_prefix(&[0xff, 0xfe, 0x00, 0x00][..])
        .unwrap_or(bytes);

    let mut out = String::with_capacity(body.len() / 4);
    let mut had_errors = false;

    let mut chunks = body.chunks_exact(4);
    for chunk in &mut chunks {
        let value = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        match char::from_u32(value) {
            Some(c) => out.push(c),
            None => {
                out.push('\u{fffd}');
                had_errors = true;
            }
        }
    }
    if !chunks.remainder().is_empty() {
        out.push('\u{fffd}');
        had_errors = true;
    }

    (out, had_errors)
}

/// Decode UTF-7.
///
/// Direct characters pass through; `+...-` runs hold modified base64
/// over UTF-16BE code units, and `+-` is a literal plus. A leading
/// decoded U+FEFF (the `+/v8-` signature) is stripped.
pub(crate) fn decode_utf7(bytes: &[u8]) -> (String, bool) {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut had_errors = false;

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b != b'+' {
            if b.is_ascii() {
                units.push(u16::from(b));
            } else {
                units.push(0xfffd);
                had_errors = true;
            }
            i += 1;
            continue;
        }

        // Shifted run: "+-" is a literal '+', otherwise base64 until a
        // non-alphabet byte (a terminating '-' is consumed).
        if bytes.get(i + 1) == Some(&b'-') {
            units.push(u16::from(b'+'));
            i += 2;
            continue;
        }

        i += 1;
        let mut accum: u32 = 0;
        let mut bits = 0u8;
        let mut decoded_any = false;
        while i < bytes.len() {
            let Some(value) = base64_value(bytes[i]) else {
                break;
            };
            accum = (accum << 6) | u32::from(value);
            bits += 6;
            if bits >= 16 {
                bits -= 16;
                units.push(((accum >> bits) & 0xffff) as u16);
                decoded_any = true;
            }
            i += 1;
        }
        // Leftover bits must be zero padding
        if bits > 0 && (accum & ((1 << bits) - 1)) != 0 {
            had_errors = true;
        }
        if !decoded_any && bits == 0 {
            // Bare '+' followed by a non-alphabet byte
            had_errors = true;
        }
        if bytes.get(i) == Some(&b'-') {
            i += 1;
        }
    }

    let mut out = String::from_utf16_lossy(&units);
    if out.contains('\u{fffd}') {
        had_errors = true;
    }
    if let Some(stripped) = out.strip_prefix('\u{feff}') {
        out = stripped.to_string();
    }
    (out, had_errors)
}

fn base64_value(b: u8) -> Option<u8> {
    match b {
        b'A'..=b'Z' => Some(b - b'A'),
        b'a'..=b'z' => Some(b - b'a' + 26),
        b'0'..=b'9' => Some(b - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}
