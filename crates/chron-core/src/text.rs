//! Key and slug helpers.

/// Convert arbitrary text into a kebab-case key.
///
/// Letters and digits are lowercased and kept, apostrophes are dropped so
/// possessives stay joined (`"Caesar's"` → `caesars`), and every other run of
/// characters becomes a single hyphen. Leading and trailing hyphens are
/// trimmed. Returns an empty string when the input has no alphanumerics.
#[must_use]
pub fn kebab_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.chars() {
        if matches!(ch, '\'' | '\u{2019}') {
            continue;
        }
        if ch.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    out
}

/// Return the trimmed text when it is non-empty.
#[must_use]
pub fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Columbus", "columbus")]
    #[case("The Fall of Rome", "the-fall-of-rome")]
    #[case("  Aztecs & Incas!  ", "aztecs-incas")]
    #[case("Caesar's Civil War", "caesars-civil-war")]
    #[case("Caesar\u{2019}s Civil War", "caesars-civil-war")]
    #[case("1066: The Year", "1066-the-year")]
    #[case("---", "")]
    #[case("", "")]
    fn kebab_case_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(kebab_case(input), expected);
    }

    #[test]
    fn non_empty_trims_and_filters() {
        assert_eq!(non_empty(Some("  Rome ")), Some("Rome"));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(non_empty(None), None);
    }
}
