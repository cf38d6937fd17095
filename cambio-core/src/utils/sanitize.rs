/// Characters removed from free text before it reaches the order service
/// or the hand-off message.
const STRIPPED: &[char] = &['<', '>', '"', '`', '\\', '{', '}'];

/// Strip control characters and markup-sensitive characters, then trim.
///
/// Deterministic, and the identity on text that contains none of those
/// characters and no surrounding whitespace.
pub fn sanitize_text(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_control() && !STRIPPED.contains(c))
        .collect();
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_text_is_unchanged() {
        for s in ["Ana Luísa dos Santos", "31", "AO06000000000000000000000", "D'Almeida"] {
            assert_eq!(sanitize_text(s), s);
        }
    }

    #[test]
    fn test_strips_unsafe_characters() {
        assert_eq!(sanitize_text("<b>Ana</b>"), "bAna/b");
        assert_eq!(sanitize_text("  João\u{0007}\n"), "João");
        assert_eq!(sanitize_text("{\"x\"}"), "x");
    }

    #[test]
    fn test_is_idempotent() {
        let once = sanitize_text(" <script>alert(`1`)</script> ");
        assert_eq!(sanitize_text(&once), once);
    }
}
