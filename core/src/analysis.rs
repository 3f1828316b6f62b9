use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"[\p{L}\p{M}\p{N}]+").expect("valid regex");
}

/// Splits text into lowercase word tokens after NFKC normalization.
///
/// Diacritics are kept: "café" and "cafe" are different tokens, one edit
/// apart.
pub fn analyze(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    TOKEN.find_iter(&normalized).map(|m| m.as_str().to_string()).collect()
}

/// Whether two tokens are at most one edit apart, counting a swap of two
/// adjacent characters as a single edit like the store's fuzzy matching.
pub fn within_one_edit(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    if long.len() - short.len() > 1 {
        return false;
    }
    let prefix = short.iter().zip(long.iter()).take_while(|(x, y)| x == y).count();
    if short.len() == long.len() {
        let substituted = short[prefix..].iter().skip(1).eq(long[prefix..].iter().skip(1));
        let transposed = prefix + 1 < short.len()
            && short[prefix] == long[prefix + 1]
            && short[prefix + 1] == long[prefix]
            && short[prefix + 2..] == long[prefix + 2..];
        substituted || transposed
    } else {
        short[prefix..].iter().eq(long[prefix + 1..].iter())
    }
}

/// Whether `phrase` occurs as a contiguous run inside `tokens`.
pub fn contains_phrase(tokens: &[String], phrase: &[String]) -> bool {
    !phrase.is_empty() && tokens.windows(phrase.len()).any(|window| window == phrase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_splits_on_punctuation() {
        assert_eq!(analyze("¡Cien años de SOLEDAD!"), vec!["cien", "años", "de", "soledad"]);
    }

    #[test]
    fn composes_decomposed_accents() {
        assert_eq!(analyze("cafe\u{301}"), vec!["café"]);
    }

    #[test]
    fn edit_distance_of_one() {
        assert!(within_one_edit("cafe", "café"));
        assert!(within_one_edit("borges", "borge"));
        assert!(within_one_edit("borges", "borgues"));
        assert!(within_one_edit("poesia", "poesia"));
        assert!(!within_one_edit("poesia", "prosa"));
        assert!(!within_one_edit("cafe", "cafeina"));
    }

    #[test]
    fn adjacent_swaps_are_one_edit() {
        assert!(within_one_edit("borges", "borgse"));
        assert!(within_one_edit("poesia", "opesia"));
        assert!(!within_one_edit("poesia", "poaies"));
        assert!(!within_one_edit("abc", "cba"));
    }

    #[test]
    fn phrases_must_be_contiguous() {
        let tokens = analyze("El libro de arena");
        assert!(contains_phrase(&tokens, &analyze("libro de")));
        assert!(!contains_phrase(&tokens, &analyze("libro arena")));
        assert!(!contains_phrase(&tokens, &[]));
    }
}
