//! Natural ordering for dotted alphanumeric identifiers
//!
//! Process numbers such as `OE-4.2` and `OE-4.10` are compared token by
//! token: runs of ASCII digits compare by numeric value, everything else
//! compares as raw strings. No case folding is applied.

use std::cmp::Ordering;

/// Split a string into alternating runs of digits and non-digits
fn tokenize(s: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;

    for (i, ch) in s.char_indices() {
        let is_digit = ch.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                tokens.push(&s[start..i]);
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }

    if start < s.len() {
        tokens.push(&s[start..]);
    }

    tokens
}

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Compare two digit runs by magnitude without parsing, so any length works
fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compare two identifiers in natural order.
///
/// Missing trailing tokens compare as the empty string, which sorts before
/// any other token, so `OE-4` orders before `OE-4.1`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ta = tokenize(a);
    let tb = tokenize(b);

    for i in 0..ta.len().max(tb.len()) {
        let x = ta.get(i).copied().unwrap_or("");
        let y = tb.get(i).copied().unwrap_or("");

        let ord = if is_numeric(x) && is_numeric(y) {
            compare_numeric(x, y)
        } else {
            x.cmp(y)
        };

        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

/// Stable in-place sort of `items` by a natural-ordered string key
pub fn sort_naturally_by_key<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| natural_cmp(key(a), key(b)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tokenize_splits_on_digit_boundaries() {
        assert_eq!(tokenize("OE-4.10"), vec!["OE-", "4", ".", "10"]);
        assert_eq!(tokenize("12ab3"), vec!["12", "ab", "3"]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_numeric_segments_compare_by_value() {
        assert_eq!(natural_cmp("OE-4.2", "OE-4.10"), Ordering::Less);
        assert_eq!(natural_cmp("OE-10.1", "OE-9.1"), Ordering::Greater);
        assert_eq!(natural_cmp("OE-4.10", "OE-4.10"), Ordering::Equal);
    }

    #[test]
    fn test_pure_strings_compare_lexicographically() {
        assert_eq!(natural_cmp("alpha", "beta"), Ordering::Less);
        assert_eq!(natural_cmp("Beta", "alpha"), Ordering::Less);
    }

    #[test]
    fn test_pure_numbers_compare_numerically() {
        assert_eq!(natural_cmp("9", "10"), Ordering::Less);
        assert_eq!(natural_cmp("007", "7"), Ordering::Equal);
        assert_eq!(
            natural_cmp("123456789012345678901234567890", "99"),
            Ordering::Greater
        );
    }

    #[test]
    fn test_shorter_token_list_sorts_first() {
        assert_eq!(natural_cmp("OE-4", "OE-4.1"), Ordering::Less);
        assert_eq!(natural_cmp("OE-4.1", "OE-4"), Ordering::Greater);
        assert_eq!(natural_cmp("", "OE-1"), Ordering::Less);
        assert_eq!(natural_cmp("", ""), Ordering::Equal);
    }

    #[test]
    fn test_no_case_folding() {
        assert_eq!(natural_cmp("oe-1", "OE-1"), Ordering::Greater);
    }

    #[test]
    fn test_sort_naturally_by_key() {
        let mut numbers = vec!["OE-1.10", "OE-1.1", "OE-1.2"];
        sort_naturally_by_key(&mut numbers, |s| s);
        assert_eq!(numbers, vec!["OE-1.1", "OE-1.2", "OE-1.10"]);
    }

    proptest! {
        #[test]
        fn prop_numeric_suffix_matches_integer_order(n in 0u64..100_000, m in 0u64..100_000) {
            let a = format!("P.{}", n);
            let b = format!("P.{}", m);
            prop_assert_eq!(natural_cmp(&a, &b), n.cmp(&m));
        }

        #[test]
        fn prop_reflexive(x in "[A-Za-z0-9.\\-]{0,12}") {
            prop_assert_eq!(natural_cmp(&x, &x), Ordering::Equal);
        }

        #[test]
        fn prop_antisymmetric(x in "[A-Z0-9.\\-]{0,10}", y in "[A-Z0-9.\\-]{0,10}") {
            prop_assert_eq!(natural_cmp(&x, &y), natural_cmp(&y, &x).reverse());
        }

        #[test]
        fn prop_transitive(
            x in "[AB0-9.]{0,8}",
            y in "[AB0-9.]{0,8}",
            z in "[AB0-9.]{0,8}",
        ) {
            let mut v = [x, y, z];
            v.sort_by(|a, b| natural_cmp(a, b));
            prop_assert_ne!(natural_cmp(&v[0], &v[1]), Ordering::Greater);
            prop_assert_ne!(natural_cmp(&v[1], &v[2]), Ordering::Greater);
            prop_assert_ne!(natural_cmp(&v[0], &v[2]), Ordering::Greater);
        }
    }
}
