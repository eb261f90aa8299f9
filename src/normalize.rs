/// Condenses arbitrary text into a single metric path segment.
///
/// The text is split on every character that isn't an ASCII letter or digit, which also drops
/// non-Latin scripts, and the words are joined back together with their first letter upper-cased:
/// `"connection reset by peer"` becomes `"ConnectionResetByPeer"`.  Normalized text normalizes to
/// itself, and the result never contains the `.` path delimiter.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn test_normalize_camel_cases_words() {
        assert_eq!(normalize("cammel case"), "CammelCase");
    }

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(
            normalize("This is a full sentence. Does it have punctuation?"),
            "ThisIsAFullSentenceDoesItHavePunctuation"
        );
        assert_eq!(normalize("Here is some !@#$%^&*()_+= Perl"), "HereIsSomePerl");
        assert_eq!(
            normalize("Custom !@#$ error &((@*# including. Punctuation & Perl"),
            "CustomErrorIncludingPunctuationPerl"
        );
    }

    #[test]
    fn test_normalize_strips_non_latin() {
        assert_eq!(normalize("Here is some !@#$%^&*()_+= Perl Hello, 世界"), "HereIsSomePerlHello");
        assert_eq!(normalize("世界"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for text in &["cammel case", "error 404: not found", "already.dotted.path", "CamelCase"] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once);
            assert!(!once.contains('.'));
        }
        assert_eq!(normalize("error 404: not found"), "Error404NotFound");
    }
}
