//! Criterion numbers of AC codes
//!
//! An AC code ends in a 3-digit criterion number (`0001-EXMP-007` is
//! criterion 7 of `0001-EXMP`). Number `000` is reserved and never counts as
//! a used criterion.

use crate::patterns::ac_code_captures;

/// The criterion number of `text` when it is exactly one AC code.
fn criterion_number(text: &str) -> Option<u32> {
    let caps = ac_code_captures(text)?;
    let whole = caps.get(0)?;
    if whole.start() != 0 || whole.end() != text.len() {
        return None;
    }
    caps.name("number")?.as_str().parse().ok()
}

/// The criterion numbers used by a list of codes, skipping unparseable codes
/// and the reserved `000`.
pub(crate) fn criterion_numbers<'a>(codes: impl IntoIterator<Item = &'a str>) -> Vec<u32> {
    codes
        .into_iter()
        .filter_map(criterion_number)
        .filter(|n| *n != 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_of_plain_and_np_codes() {
        assert_eq!(criterion_number("0001-EXMP-007"), Some(7));
        assert_eq!(criterion_number("0012-NP-LIPE-020"), Some(20));
    }

    #[test]
    fn partial_matches_have_no_number() {
        assert_eq!(criterion_number("0001-EXMP-01"), None);
        assert_eq!(criterion_number("x0001-EXMP-001"), None);
        assert_eq!(criterion_number("0001-EXMP-0011"), None);
        assert_eq!(criterion_number("0001-exmp-001"), None);
    }

    #[test]
    fn criterion_numbers_skip_reserved() {
        let numbers = criterion_numbers(["0001-EXMP-000", "0001-EXMP-002", "junk", "0001-EXMP-005"]);
        assert_eq!(numbers, vec![2, 5]);
    }
}
