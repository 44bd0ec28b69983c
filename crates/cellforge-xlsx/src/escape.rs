//! XML text escaping
//!
//! Exactly `< > & " '` are replaced; every other byte, including multi-byte
//! UTF-8 sequences, is copied through unchanged. The same output is valid
//! inside element text and attribute values.
//!
//! With the `simd` feature the scan for marker bytes uses `memchr`, which
//! checks 16 or 32 bytes per step where the CPU allows. The scalar scan is
//! always compiled and both produce identical bytes.

use std::borrow::Cow;

/// Longest replacement (`&quot;` / `&apos;`) in bytes
const MAX_EXPANSION: usize = 6;

#[inline]
fn replacement(byte: u8) -> Option<&'static [u8]> {
    match byte {
        b'&' => Some(b"&amp;"),
        b'<' => Some(b"&lt;"),
        b'>' => Some(b"&gt;"),
        b'"' => Some(b"&quot;"),
        b'\'' => Some(b"&apos;"),
        _ => None,
    }
}

/// Check whether `text` contains any character that must be escaped
#[inline]
pub fn needs_escape(text: &str) -> bool {
    #[cfg(feature = "simd")]
    {
        let bytes = text.as_bytes();
        memchr::memchr3(b'&', b'<', b'>', bytes).is_some()
            || memchr::memchr2(b'"', b'\'', bytes).is_some()
    }
    #[cfg(not(feature = "simd"))]
    {
        text.bytes().any(|b| replacement(b).is_some())
    }
}

/// Escape `text`, borrowing it when nothing needs replacing
///
/// # Examples
/// ```
/// use cellforge_xlsx::escape::escape;
///
/// assert_eq!(escape("a < b"), "a &lt; b");
/// assert!(matches!(escape("plain"), std::borrow::Cow::Borrowed(_)));
/// ```
pub fn escape(text: &str) -> Cow<'_, str> {
    if !needs_escape(text) {
        return Cow::Borrowed(text);
    }
    let mut out = Vec::with_capacity(text.len() * MAX_EXPANSION);
    escape_into(text, &mut out);
    // only ASCII bytes were replaced by ASCII, so the output is still UTF-8
    Cow::Owned(String::from_utf8(out).unwrap_or_else(|e| {
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    }))
}

/// Append the escaped form of `text` to `out`
#[inline]
pub fn escape_into(text: &str, out: &mut Vec<u8>) {
    #[cfg(feature = "simd")]
    escape_into_vectorized(text, out);
    #[cfg(not(feature = "simd"))]
    escape_into_scalar(text, out);
}

/// Byte-at-a-time escape
pub fn escape_into_scalar(text: &str, out: &mut Vec<u8>) {
    let bytes = text.as_bytes();
    let mut last = 0;
    out.reserve(bytes.len());

    for (pos, &byte) in bytes.iter().enumerate() {
        if let Some(rep) = replacement(byte) {
            out.extend_from_slice(&bytes[last..pos]);
            out.extend_from_slice(rep);
            last = pos + 1;
        }
    }
    out.extend_from_slice(&bytes[last..]);
}

/// Escape using vectorized search for the next marker byte
///
/// The two searchers each remember their next hit; only the one whose hit
/// was consumed scans again, so every byte is searched at most once per set.
#[cfg(feature = "simd")]
pub fn escape_into_vectorized(text: &str, out: &mut Vec<u8>) {
    let bytes = text.as_bytes();
    let mut last = 0;
    out.reserve(bytes.len());

    let mut markup = memchr::memchr3_iter(b'&', b'<', b'>', bytes).peekable();
    let mut quotes = memchr::memchr2_iter(b'"', b'\'', bytes).peekable();

    loop {
        let pos = match (markup.peek().copied(), quotes.peek().copied()) {
            (Some(a), Some(b)) if a < b => markup.next(),
            (Some(_), Some(_)) | (None, Some(_)) => quotes.next(),
            (Some(_), None) => markup.next(),
            (None, None) => None,
        };
        let Some(pos) = pos else {
            break;
        };

        out.extend_from_slice(&bytes[last..pos]);
        if let Some(rep) = replacement(bytes[pos]) {
            out.extend_from_slice(rep);
        }
        last = pos + 1;
    }
    out.extend_from_slice(&bytes[last..]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scalar(text: &str) -> Vec<u8> {
        let mut out = Vec::new();
        escape_into_scalar(text, &mut out);
        out
    }

    #[test]
    fn test_escapes_exactly_five_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&apos;s&lt;/a&gt;"
        );
        assert_eq!(escape("tab\tnew\nline"), "tab\tnew\nline");
    }

    #[test]
    fn test_non_ascii_passes_through() {
        assert_eq!(escape("Grüße & 日本語 🎉"), "Grüße &amp; 日本語 🎉");
        assert_eq!(scalar("€<€"), "€&lt;€".as_bytes());
    }

    #[test]
    fn test_needs_escape() {
        assert!(!needs_escape(""));
        assert!(!needs_escape("plain text 123"));
        assert!(needs_escape("'"));
        assert!(needs_escape("a&b"));
    }

    #[test]
    fn test_edges() {
        assert_eq!(escape(""), "");
        assert_eq!(escape("&"), "&amp;");
        assert_eq!(escape("&&"), "&amp;&amp;");
        assert_eq!(scalar(">x<"), b"&gt;x&lt;");
    }

    #[test]
    fn test_escape_into_appends() {
        let mut out = b"<t>".to_vec();
        escape_into("1 < 2", &mut out);
        out.extend_from_slice(b"</t>");
        assert_eq!(out, b"<t>1 &lt; 2</t>");
    }

    #[test]
    fn test_long_dense_input() {
        let text = "&".repeat(100_000);
        let mut out = Vec::new();
        escape_into(&text, &mut out);
        assert_eq!(out.len(), 500_000);
        assert_eq!(out, scalar(&text));

        let mixed = "<'".repeat(50_000);
        let mut out = Vec::new();
        escape_into(&mixed, &mut out);
        assert_eq!(out, scalar(&mixed));
    }

    #[cfg(feature = "simd")]
    #[test]
    fn test_vectorized_is_linear_on_one_dense_set() {
        let text = "&".repeat(200_000);
        let started = std::time::Instant::now();
        let mut out = Vec::new();
        escape_into_vectorized(&text, &mut out);
        assert_eq!(out.len(), 1_000_000);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }

    proptest! {
        #[test]
        fn prop_unescape_round_trips(s in any::<String>()) {
            let escaped = escape(&s);
            let unescaped = quick_xml::escape::unescape(&escaped).unwrap();
            prop_assert_eq!(&*unescaped, s.as_str());
        }

        #[test]
        fn prop_escaped_output_has_no_raw_markers(s in "[a-z<>&\"' ]{0,64}") {
            let escaped = escape(&s);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
            prop_assert!(!escaped.contains('"'));
            prop_assert!(!escaped.contains('\''));
        }
    }

    #[cfg(feature = "simd")]
    proptest! {
        #[test]
        fn prop_vectorized_matches_scalar(s in any::<String>()) {
            let mut fast = Vec::new();
            escape_into_vectorized(&s, &mut fast);
            prop_assert_eq!(fast, scalar(&s));
        }

        #[test]
        fn prop_vectorized_matches_scalar_dense(s in "[<>&\"'a-zé]{0,200}") {
            let mut fast = Vec::new();
            escape_into_vectorized(&s, &mut fast);
            prop_assert_eq!(fast, scalar(&s));
        }
    }
}
