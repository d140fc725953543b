use sha2::{Digest, Sha256};

/// Characters of review text that participate in the fingerprint. Scrapers
/// occasionally re-truncate long reviews between passes, so only a stable
/// prefix is hashed.
const TEXT_PREFIX_CHARS: usize = 100;

/// Deterministic identifier for a review, used solely for deduplication.
///
/// The same `(text, username, date, movie_id)` tuple always produces the same
/// value, across runs and processes. Inputs are not validated; an empty text
/// still yields a stable fingerprint.
#[must_use]
pub fn review_fingerprint(text: &str, username: &str, date: &str, movie_id: i32) -> String {
    let prefix: String = text.chars().take(TEXT_PREFIX_CHARS).collect();
    let unique = format!("{prefix}_{username}_{date}_{movie_id}");

    let mut hasher = Sha256::new();
    hasher.update(unique.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_fingerprint() {
        let a = review_fingerprint("Loved it", "alice", "2024-01-01", 1);
        let b = review_fingerprint("Loved it", "alice", "2024-01-01", 1);
        assert_eq!(a, b);
    }

    #[test]
    fn any_component_changes_the_fingerprint() {
        let base = review_fingerprint("Loved it", "alice", "2024-01-01", 1);
        assert_ne!(base, review_fingerprint("Hated it", "alice", "2024-01-01", 1));
        assert_ne!(base, review_fingerprint("Loved it", "bob", "2024-01-01", 1));
        assert_ne!(base, review_fingerprint("Loved it", "alice", "2024-01-02", 1));
        assert_ne!(base, review_fingerprint("Loved it", "alice", "2024-01-01", 2));
    }

    #[test]
    fn only_the_text_prefix_matters() {
        let prefix = "x".repeat(100);
        let a = review_fingerprint(&format!("{prefix} first tail"), "alice", "d", 1);
        let b = review_fingerprint(&format!("{prefix} second tail"), "alice", "d", 1);
        assert_eq!(a, b);

        let c = review_fingerprint(&"x".repeat(99), "alice", "d", 1);
        assert_ne!(a, c);
    }

    #[test]
    fn multibyte_text_does_not_split_codepoints() {
        // 150 two-byte chars; a byte slice at 100 would land mid-codepoint.
        let text = "é".repeat(150);
        let a = review_fingerprint(&text, "alice", "d", 1);
        assert_eq!(a, review_fingerprint(&"é".repeat(100), "alice", "d", 1));
    }

    #[test]
    fn empty_text_still_hashes() {
        let a = review_fingerprint("", "", "", 0);
        assert_eq!(a.len(), 64);
        assert_eq!(a, review_fingerprint("", "", "", 0));
    }
}
