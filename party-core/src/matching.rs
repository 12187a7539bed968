//! Approximate name matching for free-text guesses.
//!
//! Both sides are folded to lowercase alphanumerics with diacritics and
//! whitespace removed, so "BarackObama", "barack obama" and "Barack Obamá"
//! compare equal. A guess then matches a name if it equals the whole name or
//! any single word of it, or is within one edit of either.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Maximum Levenshtein distance accepted for a fuzzy match.
pub const EDIT_TOLERANCE: usize = 1;

/// Strings shorter than this must match exactly.
pub const MIN_FUZZY_LEN: usize = 4;

pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

fn name_tokens(name: &str) -> Vec<String> {
    name.split_whitespace()
        .map(normalize)
        .filter(|token| !token.is_empty())
        .collect()
}

pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

fn is_close(guess: &str, target: &str) -> bool {
    if guess == target {
        return true;
    }
    let shortest = guess.chars().count().min(target.chars().count());
    shortest >= MIN_FUZZY_LEN && edit_distance(guess, target) <= EDIT_TOLERANCE
}

pub fn matches_name(guess: &str, name: &str) -> bool {
    let guess = normalize(guess);
    if guess.is_empty() {
        return false;
    }

    let full = normalize(name);
    if is_close(&guess, &full) {
        return true;
    }

    name_tokens(name)
        .iter()
        .any(|token| is_close(&guess, token))
}

/// First name in `names` the guess matches.
pub fn find_match<'a>(guess: &str, names: &[&'a str]) -> Option<&'a str> {
    names.iter().copied().find(|name| matches_name(guess, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Barack Obama"), "barackobama");
        assert_eq!(normalize("  BÉYONCÉ  Knowles!"), "beyonceknowles");
        assert_eq!(normalize("Captain\tKirk"), "captainkirk");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("obama", "obama"), 0);
        assert_eq!(edit_distance("barrackobama", "barackobama"), 1);
        assert_eq!(edit_distance("obama", "obamma"), 1);
    }

    #[test]
    fn test_accepted_spellings() {
        for guess in [
            "Barack Obama",
            "barack obama",
            "BARACK OBAMA",
            "Barack",
            "Obama",
            "BarackObama",
            "Barrack Obama",
            "Barack Obamá",
            "  barack   obama  ",
        ] {
            assert!(matches_name(guess, "Barack Obama"), "{guess} should match");
        }

        assert!(matches_name("Clint Eastwod", "Clint Eastwood"));
        assert!(matches_name("Morgn Freeman", "Morgan Freeman"));
        assert!(matches_name("eastwood", "Clint Eastwood"));
    }

    #[test]
    fn test_rejected_guesses() {
        for guess in ["Congress", "", "   ", "!!!", "Obamacare", "Michelle"] {
            assert!(!matches_name(guess, "Barack Obama"), "{guess} should not match");
        }
        // Short words have no typo allowance
        assert!(!matches_name("Kir", "Captain Kirk"));
    }

    #[test]
    fn test_find_match_checks_every_name() {
        let names = ["George Washington", "Barack Obama", "Donald Duck"];
        assert_eq!(find_match("obama", &names), Some("Barack Obama"));
        assert_eq!(find_match("washingtn", &names), Some("George Washington"));
        assert_eq!(find_match("Congress", &names), None);
    }
}
