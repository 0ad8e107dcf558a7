// questbot-core/src/utils/mod.rs

use std::sync::OnceLock;

use rand::Rng;
use regex::Regex;

/// First http(s) URL embedded in free-form text, if any.
pub fn extract_url(text: &str) -> Option<String> {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    let re = URL_RE.get_or_init(|| {
        Regex::new(r"https?://[^\s<>\)]+").expect("static regex must compile")
    });
    re.find(text).map(|m| m.as_str().to_string())
}

const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_SUFFIX_LEN: usize = 8;

/// `{prefix}-{8 random base36 chars}`; prefix defaults to "REWARD".
pub fn generate_redemption_code(prefix: Option<&str>) -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..CODE_SUFFIX_LEN)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect();
    format!("{}-{}", prefix.unwrap_or("REWARD"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_url_from_text() {
        assert_eq!(
            extract_url("proof here: https://example.com/post/1 and more"),
            Some("https://example.com/post/1".to_string())
        );
        assert_eq!(extract_url("no links at all"), None);
    }

    #[test]
    fn redemption_codes_have_prefix_and_suffix() {
        let code = generate_redemption_code(Some("GIFT"));
        let (prefix, suffix) = code.split_once('-').expect("code has a dash");
        assert_eq!(prefix, "GIFT");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));

        assert!(generate_redemption_code(None).starts_with("REWARD-"));
    }
}
