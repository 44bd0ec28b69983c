//! Inline vs shared string placement

/// Strings longer than this (in characters) are written inline
pub const MAX_SHARED_LEN: usize = 100;

/// Decide whether a string cell should carry its text inline
///
/// Rules, first match wins:
/// 1. one character or fewer
/// 2. contains `< > & " '`
/// 3. contains a newline, carriage return or tab
/// 4. longer than [`MAX_SHARED_LEN`] characters
///
/// Anything else goes to the shared string table.
pub fn should_use_inline(text: &str) -> bool {
    let mut chars = text.chars();
    if chars.next().is_none() || chars.next().is_none() {
        return true;
    }

    if text
        .bytes()
        .any(|b| matches!(b, b'<' | b'>' | b'&' | b'"' | b'\''))
    {
        return true;
    }

    if text.bytes().any(|b| matches!(b, b'\n' | b'\r' | b'\t')) {
        return true;
    }

    text.chars().nth(MAX_SHARED_LEN).is_some()
}

/// Where string cell values are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringStorage {
    /// Apply [`should_use_inline`] per cell
    #[default]
    Auto,
    /// Every string goes to the shared string table
    AlwaysShared,
    /// Every string is written inline
    AlwaysInline,
}

impl StringStorage {
    /// Check if a string should be written inline under this setting
    pub fn use_inline(&self, text: &str) -> bool {
        match self {
            StringStorage::Auto => should_use_inline(text),
            StringStorage::AlwaysShared => false,
            StringStorage::AlwaysInline => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_strings_are_inline() {
        assert!(should_use_inline(""));
        assert!(should_use_inline("x"));
        assert!(should_use_inline("é"));
        assert!(!should_use_inline("Hi"));
    }

    #[test]
    fn test_markup_characters_are_inline() {
        assert!(should_use_inline("say \"hi\""));
        assert!(should_use_inline("a<b"));
        assert!(should_use_inline("R&D"));
        assert!(should_use_inline("it's"));
    }

    #[test]
    fn test_control_characters_are_inline() {
        assert!(should_use_inline("line\nbreak"));
        assert!(should_use_inline("a\tb"));
        assert!(should_use_inline("a\r"));
    }

    #[test]
    fn test_length_threshold() {
        assert!(!should_use_inline(&"a".repeat(50)));
        assert!(!should_use_inline(&"a".repeat(100)));
        assert!(should_use_inline(&"a".repeat(101)));
        assert!(should_use_inline(&"a".repeat(150)));
        // characters, not bytes
        assert!(!should_use_inline(&"ü".repeat(100)));
    }

    #[test]
    fn test_policy_is_pure() {
        let s = "Category A";
        assert_eq!(should_use_inline(s), should_use_inline(s));
    }

    #[test]
    fn test_storage_override() {
        assert!(StringStorage::AlwaysInline.use_inline("Category"));
        assert!(!StringStorage::AlwaysShared.use_inline("x"));
        assert!(!StringStorage::Auto.use_inline("Category"));
    }
}
