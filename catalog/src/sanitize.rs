use regex::Regex;

/// Normalized lookup key: underscores to spaces, punctuation stripped,
/// whitespace collapsed, lowercased. Seeder dedup and category filters both
/// rely on this being stable across re-seeds.
pub fn sanitize_key(input: &str) -> String {
    let replace = Regex::new(r"[_&/]").unwrap();
    let mut s = replace.replace_all(input, " ").into_owned();

    let clean_re = Regex::new(r"[^A-Za-z0-9- ]").unwrap();
    s = clean_re.replace_all(&s, "").into_owned();

    s = s.trim().to_string();

    let collapse = Regex::new(r" +").unwrap();
    collapse.replace_all(&s, " ").into_owned().to_lowercase()
}

/// Display form: trimmed, inner whitespace collapsed, casing kept.
pub fn tidy(input: &str) -> String {
    let collapse = Regex::new(r"\s+").unwrap();
    collapse.replace_all(input.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::{sanitize_key, tidy};

    #[test]
    fn test_basic() {
        assert_eq!(sanitize_key("hello_world"), "hello world");
        assert_eq!(sanitize_key("Basmati-Rice"), "basmati-rice");
        assert_eq!(sanitize_key("clean-this_text!"), "clean-this text");
    }

    #[test]
    fn test_leading_trailing_spaces() {
        assert_eq!(sanitize_key("   hello   "), "hello");
        assert_eq!(sanitize_key("  multiple   spaces  "), "multiple spaces");
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(sanitize_key("!@#$%^*()"), "");
        assert_eq!(sanitize_key("abc123!@#"), "abc123");
        assert_eq!(sanitize_key("Fruits & Veggies"), "fruits veggies");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(sanitize_key(""), "");
        assert_eq!(sanitize_key("     "), "");
    }

    #[test]
    fn test_tidy_keeps_case() {
        assert_eq!(tidy("  Alphonso   Mango "), "Alphonso Mango");
        assert_eq!(tidy("500\tg"), "500 g");
    }
}
