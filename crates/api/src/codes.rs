//! Reference-data id codes.
//!
//! The synthetic datasets key rows by prefixed codes ("U12", "P015", "S01").
//! Relational and graph ids are the numeric part.

use anyhow::{bail, Result};

/// Convert an id code like "P015" to 15. Fails on codes with no digits.
pub fn id_code(code: &str) -> Result<i64> {
    let digits: String = code.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        bail!("id code {:?} contains no digits", code);
    }
    Ok(digits.parse()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefix_and_leading_zeros() {
        assert_eq!(id_code("P015").unwrap(), 15);
        assert_eq!(id_code("U7").unwrap(), 7);
        assert_eq!(id_code("S01").unwrap(), 1);
    }

    #[test]
    fn passes_through_bare_numbers() {
        assert_eq!(id_code("123").unwrap(), 123);
    }

    #[test]
    fn rejects_codes_without_digits() {
        assert!(id_code("PROMO").is_err());
        assert!(id_code("").is_err());
    }
}
