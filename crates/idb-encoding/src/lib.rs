//! Byte-level text encoding detection and conversion.
//!
//! Database files arrive with no encoding declaration and a corpus that
//! is mostly simplified Chinese, so detection runs in three stages:
//!
//! 1. BOM sniff over the first bytes — authoritative when present
//! 2. Candidate decode of a bounded prefix plus script-frequency
//!    scoring, highest confidence above a threshold wins
//! 3. Fallback to GB18030
//!
//! [`detect`] is total: any byte sequence yields exactly one encoding.
//! Legacy GBK and GB2312 labels normalize to GB18030, which is a
//! superset of both.

use encoding_rs::{BIG5, GB18030, UTF_16BE, UTF_16LE, UTF_8};
use tracing::debug;

mod utf_extra;

/// Bytes inspected by the content-scoring stage.
const DETECT_WINDOW: usize = 1024;

/// Decoded characters sampled when scoring a candidate.
const SCORE_SAMPLE: usize = 500;

/// Minimum normalized confidence for a candidate to win.
const SCORE_THRESHOLD: f64 = 0.5;

/// Candidate encodings for BOM-less content, in priority order.
const CANDIDATES: [TextEncoding; 3] = [
    TextEncoding::Utf8,
    TextEncoding::Gb18030,
    TextEncoding::Big5,
];

/// A supported text encoding, identified by canonical name and codepage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf7,
    Gb18030,
    Big5,
}

impl TextEncoding {
    /// Canonical encoding name.
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Utf16Le => "UTF-16LE",
            TextEncoding::Utf16Be => "UTF-16BE",
            TextEncoding::Utf32Le => "UTF-32LE",
            TextEncoding::Utf7 => "UTF-7",
            TextEncoding::Gb18030 => "GB18030",
            TextEncoding::Big5 => "Big5",
        }
    }

    /// Windows codepage number, kept for parity with legacy tooling
    /// that reports encodings as name/codepage pairs.
    pub fn codepage(self) -> u16 {
        match self {
            TextEncoding::Utf8 => 65001,
            TextEncoding::Utf16Le => 1200,
            TextEncoding::Utf16Be => 1201,
            TextEncoding::Utf32Le => 12000,
            TextEncoding::Utf7 => 65000,
            TextEncoding::Gb18030 => 54936,
            TextEncoding::Big5 => 950,
        }
    }

    /// Look up an encoding by label, case-insensitively.
    ///
    /// The legacy "GBK" and "GB2312" labels normalize to GB18030.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(TextEncoding::Utf8),
            "utf-16" | "utf-16le" | "utf16le" | "utf16" => Some(TextEncoding::Utf16Le),
            "utf-16be" | "utf16be" => Some(TextEncoding::Utf16Be),
            "utf-32" | "utf-32le" | "utf32le" | "utf32" => Some(TextEncoding::Utf32Le),
            "utf-7" | "utf7" => Some(TextEncoding::Utf7),
            "gb18030" | "gbk" | "gb2312" => Some(TextEncoding::Gb18030),
            "big5" | "big5-hkscs" => Some(TextEncoding::Big5),
            _ => None,
        }
    }

    /// Decode a byte buffer, stripping a leading BOM when it matches.
    ///
    /// Lossy and total; the flag reports whether any malformed sequence
    /// was replaced along the way.
    pub fn decode(self, bytes: &[u8]) -> (String, bool) {
        match self {
            TextEncoding::Utf8 => {
                let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
                (text.into_owned(), had_errors)
            }
            TextEncoding::Utf16Le => {
                let (text, had_errors) = UTF_16LE.decode_with_bom_removal(bytes);
                (text.into_owned(), had_errors)
            }
            TextEncoding::Utf16Be => {
                let (text, had_errors) = UTF_16BE.decode_with_bom_removal(bytes);
                (text.into_owned(), had_errors)
            }
            TextEncoding::Utf32Le => utf_extra::decode_utf32le(bytes),
            TextEncoding::Utf7 => utf_extra::decode_utf7(bytes),
            TextEncoding::Gb18030 => {
                let (text, had_errors) = GB18030.decode_without_bom_handling(bytes);
                (text.into_owned(), had_errors)
            }
            TextEncoding::Big5 => {
                let (text, had_errors) = BIG5.decode_without_bom_handling(bytes);
                (text.into_owned(), had_errors)
            }
        }
    }

    /// Encode text for saving.
    ///
    /// UTF-16 output is BOM-prefixed so a saved file re-detects on the
    /// next load; UTF-8 output is BOM-less. Returns `None` for
    /// encodings with no writer (UTF-32LE, UTF-7).
    pub fn encode(self, text: &str) -> Option<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Some(text.as_bytes().to_vec()),
            TextEncoding::Utf16Le => {
                let mut out = vec![0xff, 0xfe];
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                Some(out)
            }
            TextEncoding::Utf16Be => {
                let mut out = vec![0xfe, 0xff];
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
                Some(out)
            }
            TextEncoding::Utf32Le | TextEncoding::Utf7 => None,
            TextEncoding::Gb18030 => {
                let (bytes, _, _) = GB18030.encode(text);
                Some(bytes.into_owned())
            }
            TextEncoding::Big5 => {
                let (bytes, _, _) = BIG5.encode(text);
                Some(bytes.into_owned())
            }
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Match the first bytes against known BOM signatures.
///
/// The UTF-32LE signature is a strict prefix extension of UTF-16LE's,
/// so it is probed first.
pub fn sniff_bom(bytes: &[u8]) -> Option<TextEncoding> {
    if bytes.starts_with(&[0x2b, 0x2f, 0x76]) {
        return Some(TextEncoding::Utf7);
    }
    if bytes.starts_with(&[0xef, 0xbb, 0xbf]) {
        return Some(TextEncoding::Utf8);
    }
    if bytes.starts_with(&[0xff, 0xfe, 0x00, 0x00]) {
        return Some(TextEncoding::Utf32Le);
    }
    if bytes.starts_with(&[0xff, 0xfe]) {
        return Some(TextEncoding::Utf16Le);
    }
    if bytes.starts_with(&[0xfe, 0xff]) {
        return Some(TextEncoding::Utf16Be);
    }
    None
}

/// Detect the most likely encoding of a raw byte buffer.
///
/// Never fails: a BOM is authoritative, otherwise the best-scoring
/// candidate above the confidence threshold wins, and anything else
/// falls back to GB18030.
pub fn detect(bytes: &[u8]) -> TextEncoding {
    if let Some(encoding) = sniff_bom(bytes) {
        debug!(encoding = encoding.name(), "encoding detected by BOM");
        return encoding;
    }

    let window = &bytes[..bytes.len().min(DETECT_WINDOW)];
    let mut best: Option<(TextEncoding, f64)> = None;

    for candidate in CANDIDATES {
        let (text, _) = candidate.decode(window);
        let score = confidence(&text);
        debug!(
            encoding = candidate.name(),
            score, "candidate encoding confidence"
        );
        if score > SCORE_THRESHOLD && best.map_or(true, |(_, b)| score > b) {
            best = Some((candidate, score));
        }
    }

    match best {
        Some((encoding, score)) => {
            debug!(
                encoding = encoding.name(),
                score, "encoding detected by content scoring"
            );
            encoding
        }
        None => {
            debug!("no candidate above threshold, defaulting to GB18030");
            TextEncoding::Gb18030
        }
    }
}

/// Score how plausibly `text` is the intended decoding of the file.
///
/// CJK ideographs and full-width punctuation push the score up,
/// replacement characters push it down hard, plain ASCII barely counts.
/// Normalized to [0, 1] over the sampled characters.
fn confidence(text: &str) -> f64 {
    let mut score = 0.0;
    let mut sampled = 0usize;

    for c in text.chars().take(SCORE_SAMPLE) {
        sampled += 1;
        match c {
            '\u{4e00}'..='\u{9fff}' => score += 2.0,
            '\u{3400}'..='\u{4dbf}' | '\u{20000}'..='\u{2a6df}' => score += 1.5,
            '\u{fffd}' | '\0' => score -= 5.0,
            _ if is_fullwidth_punctuation(c) => score += 1.0,
            _ if c.is_ascii_alphanumeric() || c.is_whitespace() => score += 0.1,
            _ => {}
        }
    }

    if sampled == 0 {
        return 0.0;
    }
    (score / (sampled as f64 * 2.0)).clamp(0.0, 1.0)
}

fn is_fullwidth_punctuation(c: char) -> bool {
    matches!(
        c,
        '\u{3002}' // 。
            | '\u{ff0c}' // ，
            | '\u{ff01}' // ！
            | '\u{ff1f}' // ？
            | '\u{ff1b}' // ；
            | '\u{ff1a}' // ：
            | '\u{300c}' // 「
            | '\u{300d}' // 」
            | '\u{300e}' // 『
            | '\u{300f}' // 』
            | '\u{ff08}' // （
            | '\u{ff09}' // ）
            | '\u{3010}' // 【
            | '\u{3011}' // 】
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const CJK_SAMPLE: &str = "红色药水恢复少量生命值的药水道具可以在商店购买使用后立即生效";

    #[test]
    fn test_bom_utf8() {
        let mut bytes = vec![0xef, 0xbb, 0xbf];
        bytes.extend_from_slice(b"Header:\n  Type: ItemDB\n");
        assert_eq!(detect(&bytes), TextEncoding::Utf8);
    }

    #[test]
    fn test_bom_utf16le_and_be() {
        assert_eq!(detect(&[0xff, 0xfe, b'I', 0x00]), TextEncoding::Utf16Le);
        assert_eq!(detect(&[0xfe, 0xff, 0x00, b'I']), TextEncoding::Utf16Be);
    }

    #[test]
    fn test_bom_utf32le_wins_over_utf16le_prefix() {
        assert_eq!(
            detect(&[0xff, 0xfe, 0x00, 0x00, b'I', 0x00, 0x00, 0x00]),
            TextEncoding::Utf32Le
        );
    }

    #[test]
    fn test_bom_utf7_marker() {
        assert_eq!(detect(&[0x2b, 0x2f, 0x76, 0x38, 0x2d]), TextEncoding::Utf7);
    }

    #[test]
    fn test_bom_is_authoritative_regardless_of_body() {
        // GB18030 body behind a UTF-8 BOM still reports UTF-8
        let mut bytes = vec![0xef, 0xbb, 0xbf];
        let (body, _, _) = encoding_rs::GB18030.encode(CJK_SAMPLE);
        bytes.extend_from_slice(&body);
        assert_eq!(detect(&bytes), TextEncoding::Utf8);
    }

    #[test]
    fn test_gb18030_detected_by_content() {
        let (bytes, _, _) = encoding_rs::GB18030.encode(CJK_SAMPLE);
        assert_eq!(detect(&bytes), TextEncoding::Gb18030);
    }

    #[test]
    fn test_utf8_cjk_detected_by_content() {
        assert_eq!(detect(CJK_SAMPLE.as_bytes()), TextEncoding::Utf8);
    }

    #[test]
    fn test_plain_ascii_falls_back_to_default() {
        // ASCII decodes everywhere with a sub-threshold score
        assert_eq!(detect(b"Id: 501\nName: Red Herb\n"), TextEncoding::Gb18030);
    }

    #[test]
    fn test_empty_buffer_falls_back_to_default() {
        assert_eq!(detect(b""), TextEncoding::Gb18030);
    }

    #[test]
    fn test_detect_never_panics_on_junk() {
        let junk: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let _ = detect(&junk);
    }

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = vec![0xef, 0xbb, 0xbf];
        bytes.extend_from_slice(b"Id: 501");
        let (text, had_errors) = TextEncoding::Utf8.decode(&bytes);
        assert_eq!(text, "Id: 501");
        assert!(!had_errors);
    }

    #[test]
    fn test_utf16le_encode_decode_round_trip() {
        let bytes = TextEncoding::Utf16Le.encode(CJK_SAMPLE).expect("encode");
        assert_eq!(sniff_bom(&bytes), Some(TextEncoding::Utf16Le));
        let (text, had_errors) = TextEncoding::Utf16Le.decode(&bytes);
        assert_eq!(text, CJK_SAMPLE);
        assert!(!had_errors);
    }

    #[test]
    fn test_gb18030_encode_decode_round_trip() {
        let bytes = TextEncoding::Gb18030.encode(CJK_SAMPLE).expect("encode");
        let (text, had_errors) = TextEncoding::Gb18030.decode(&bytes);
        assert_eq!(text, CJK_SAMPLE);
        assert!(!had_errors);
    }

    #[test]
    fn test_label_normalization() {
        assert_eq!(TextEncoding::from_label("GBK"), Some(TextEncoding::Gb18030));
        assert_eq!(
            TextEncoding::from_label("gb2312"),
            Some(TextEncoding::Gb18030)
        );
        assert_eq!(TextEncoding::from_label(" utf-8 "), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::from_label("latin1"), None);
    }

    #[test]
    fn test_no_encoder_for_utf7_and_utf32() {
        assert!(TextEncoding::Utf7.encode("abc").is_none());
        assert!(TextEncoding::Utf32Le.encode("abc").is_none());
    }

    #[test]
    fn test_name_codepage_pairs() {
        assert_eq!(TextEncoding::Gb18030.name(), "GB18030");
        assert_eq!(TextEncoding::Gb18030.codepage(), 54936);
        assert_eq!(TextEncoding::Big5.codepage(), 950);
    }
}
