//! Generalized Luhn check digits over an arbitrary even-length alphabet.
//!
//! For an alphabet of `N` characters each input character maps to its index. Walking the
//! input right to left with the weights 2, 1, 2, ... every weighted index contributes its
//! base-`N` digit sum (`addend / N + addend % N`). The check character is the one that brings
//! the total to a multiple of `N`. With `N = 10` over `0-9` this is the classic Luhn digit.
//!
//! ```rust
//! use psn_pseudonym::check_digit::CheckDigitCalculator;
//!
//! let luhn = CheckDigitCalculator::new("0123456789").unwrap();
//! assert_eq!(luhn.compute("7992739871", ""), Some('3'));
//! assert_eq!(luhn.validate("79927398713", ""), Some(true));
//! assert_eq!(luhn.validate("79927398714", ""), Some(false));
//! assert_eq!(luhn.validate("7992739871X", ""), None);
//! ```

use crate::algorithm::AlgorithmRegistry;
use crate::error::PseudonymError;
use fxhash::FxHashMap;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct CheckDigitCalculator {
    alphabet: Vec<char>,
    index: FxHashMap<char, usize>,
    case_insensitive: bool,
}

impl CheckDigitCalculator {
    /// Builds a calculator; an odd alphabet loses its last character.
    ///
    /// # Errors
    /// Returns [`PseudonymError::EmptyAlphabet`] when fewer than two characters remain.
    pub fn new(alphabet: &str) -> Result<Self, PseudonymError> {
        let mut chars: Vec<char> = alphabet.chars().collect();
        if chars.len() % 2 == 1 {
            let dropped = chars.pop();
            warn!(
                length = chars.len() + 1,
                dropped = ?dropped,
                "Odd check digit alphabet, dropping its last character"
            );
        }
        if chars.is_empty() {
            return Err(PseudonymError::EmptyAlphabet {
                context: Some("Check digit alphabet needs at least two characters".into()),
            });
        }

        let index = chars.iter().enumerate().map(|(i, c)| (*c, i)).collect();
        let case_insensitive = !chars.iter().any(|c| c.is_lowercase());
        Ok(Self { alphabet: chars, index, case_insensitive })
    }

    /// The (even) alphabet in use.
    #[must_use]
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Strips `prefix` when present and trims surrounding whitespace. Input is uppercased
    /// unless the alphabet itself holds lowercase characters.
    #[must_use]
    pub fn standardize(&self, input: &str, prefix: &str) -> String {
        let trimmed = input.trim();
        let value = trimmed.strip_prefix(prefix).unwrap_or(trimmed).trim();
        if self.case_insensitive { value.to_uppercase() } else { value.to_owned() }
    }

    /// The check character for `input`, or `None` when `input` holds a character outside the
    /// alphabet.
    #[must_use]
    pub fn compute(&self, input: &str, prefix: &str) -> Option<char> {
        let sum = self.weighted_sum(&self.standardize(input, prefix), 2)?;
        let n = self.alphabet.len();
        self.alphabet.get((n - sum % n) % n).copied()
    }

    /// `Some(true)` for a correct trailing check character, `Some(false)` for a wrong one and
    /// `None` when the input cannot be verified (empty, or a character outside the alphabet).
    #[must_use]
    pub fn validate(&self, input: &str, prefix: &str) -> Option<bool> {
        let value = self.standardize(input, prefix);
        if value.is_empty() {
            return None;
        }
        let sum = self.weighted_sum(&value, 1)?;
        Some(sum % self.alphabet.len() == 0)
    }

    /// `input` (prefix included, as given) followed by its check character.
    #[must_use]
    pub fn append(&self, input: &str, prefix: &str) -> Option<String> {
        let check = self.compute(input, prefix)?;
        let mut out = String::with_capacity(input.len() + check.len_utf8());
        out.push_str(input.trim());
        out.push(check);
        Some(out)
    }

    fn weighted_sum(&self, value: &str, first_weight: usize) -> Option<usize> {
        let n = self.alphabet.len();
        let mut weight = first_weight;
        let mut sum = 0_usize;
        for c in value.chars().rev() {
            let addend = weight * self.index.get(&c)?;
            sum += addend / n + addend % n;
            weight = 3 - weight;
        }
        Some(sum)
    }
}

/// Appends a check character using the alphabet that matches `algorithm`.
///
/// `alphabet` is only consulted by strategies drawing from a configured alphabet.
///
/// # Errors
/// Returns [`PseudonymError::EmptyAlphabet`] when the selected alphabet is unusable.
pub fn append_check_digit(
    pseudonym: &str,
    algorithm: &str,
    alphabet: &str,
    prefix: &str,
) -> Result<Option<String>, PseudonymError> {
    let algorithm = AlgorithmRegistry::select(algorithm).algorithm();
    let calculator = CheckDigitCalculator::new(algorithm.check_digit_alphabet(alphabet))?;
    Ok(calculator.append(pseudonym, prefix))
}

/// Validates the trailing check character using the alphabet that matches `algorithm`.
///
/// # Errors
/// Returns [`PseudonymError::EmptyAlphabet`] when the selected alphabet is unusable.
pub fn validate_check_digit(
    pseudonym: &str,
    algorithm: &str,
    alphabet: &str,
    prefix: &str,
) -> Result<Option<bool>, PseudonymError> {
    let algorithm = AlgorithmRegistry::select(algorithm).algorithm();
    let calculator = CheckDigitCalculator::new(algorithm.check_digit_alphabet(alphabet))?;
    Ok(calculator.validate(pseudonym, prefix))
}
