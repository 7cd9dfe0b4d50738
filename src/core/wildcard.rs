//! Glob matching for names and values
//!
//! Patterns are byte strings:
//! - `?` matches any single byte
//! - `*` matches any run of bytes, including none
//! - `[abc]`, `[a-z]` match one byte from a class; `[!...]` negates it
//!
//! Every other byte matches itself. An unterminated `[` is a literal.
//! Matching is iterative: only the most recent `*` is kept as a backtrack
//! point, so the cost is bounded by `pattern.len() * text.len()`.

/// Test `text` against a glob `pattern`
pub fn matches(pattern: &[u8], text: &[u8]) -> bool {
    let mut p = 0;
    let mut t = 0;
    // (pattern position after the star, text position it currently absorbs up to)
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if let Some(&token) = pattern.get(p) {
            match token {
                b'*' => {
                    while pattern.get(p) == Some(&b'*') {
                        p += 1;
                    }
                    if p == pattern.len() {
                        return true;
                    }
                    backtrack = Some((p, t));
                    continue;
                }
                b'?' => {
                    p += 1;
                    t += 1;
                    continue;
                }
                b'[' => match match_class(pattern, p, text[t]) {
                    Some((true, next)) => {
                        p = next;
                        t += 1;
                        continue;
                    }
                    Some((false, _)) => {}
                    None if text[t] == b'[' => {
                        p += 1;
                        t += 1;
                        continue;
                    }
                    None => {}
                },
                literal if literal == text[t] => {
                    p += 1;
                    t += 1;
                    continue;
                }
                _ => {}
            }
        }

        // mismatch: let the last star absorb one more byte
        match backtrack {
            Some((star_p, star_t)) => {
                p = star_p;
                t = star_t + 1;
                backtrack = Some((star_p, t));
            }
            None => return false,
        }
    }

    while pattern.get(p) == Some(&b'*') {
        p += 1;
    }
    p == pattern.len()
}

/// Match `byte` against the class opening at `pattern[open]`.
///
/// Returns whether it matched and the pattern position after `]`, or
/// `None` if the class is never closed.
fn match_class(pattern: &[u8], open: usize, byte: u8) -> Option<(bool, usize)> {
    let mut i = open + 1;
    let negate = pattern.get(i) == Some(&b'!');
    if negate {
        i += 1;
    }

    let mut found = false;
    loop {
        let lo = *pattern.get(i)?;
        if lo == b']' {
            return Some((found != negate, i + 1));
        }
        match (pattern.get(i + 1), pattern.get(i + 2)) {
            (Some(b'-'), Some(&hi)) if hi != b']' && lo < hi => {
                found |= (lo..=hi).contains(&byte);
                i += 3;
            }
            _ => {
                found |= lo == byte;
                i += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(pattern: &str, text: &str) -> bool {
        matches(pattern.as_bytes(), text.as_bytes())
    }

    #[test]
    fn test_literal() {
        assert!(m("node", "node"));
        assert!(!m("node", "nodes"));
        assert!(!m("nodes", "node"));
        assert!(m("", ""));
        assert!(!m("", "a"));
    }

    #[test]
    fn test_star() {
        assert!(m("a*c", "abc"));
        assert!(m("a*c", "aXYZc"));
        assert!(m("a*c", "ac"));
        assert!(!m("a*c", "ab"));
        assert!(m("*", ""));
        assert!(m("*", "anything"));
        assert!(m("**b", "aab"));
        assert!(m("*ab*ab", "xabyabab"));
        assert!(!m("a*b", "acbd"));
    }

    #[test]
    fn test_question_mark() {
        assert!(m("a?c", "abc"));
        assert!(!m("a?c", "ac"));
        assert!(!m("a?c", "abbc"));
        assert!(m("???", "xyz"));
    }

    #[test]
    fn test_classes() {
        assert!(m("[ab]x", "ax"));
        assert!(m("[ab]x", "bx"));
        assert!(!m("[ab]x", "cx"));
        assert!(m("[!ab]x", "cx"));
        assert!(!m("[!ab]x", "ax"));
        assert!(m("item[0-9]", "item7"));
        assert!(!m("item[0-9]", "itemx"));
        assert!(m("[a-]", "-"));
        assert!(m("[z-a]", "-"));
        assert!(!m("[z-a]", "m"));
        assert!(!m("[]a", "a"));
    }

    #[test]
    fn test_unterminated_class_is_literal() {
        assert!(m("[ab", "[ab"));
        assert!(!m("[ab", "a"));
    }

    #[test]
    fn test_star_with_class() {
        assert!(m("*[0-9]", "version2"));
        assert!(!m("*[0-9]", "version"));
        assert!(m("b*[!x]", "books"));
    }
}
