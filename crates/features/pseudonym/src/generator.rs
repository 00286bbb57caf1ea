//! Pseudonym generation.
//!
//! [`PseudonymGenerator::generate`] is pure apart from the random source: the counter value a
//! strategy needs is obtained by the caller (see [`crate::counter::CounterStore::increment`])
//! and passed in, so the read-increment-persist step stays atomic at the storage boundary.
//! Every raw value goes through [`correct_length`] and is then prefixed with the domain
//! prefix; the check character, when configured, is appended last.

use crate::algorithm::{Algorithm, AlgorithmRegistry, Selection, StrategyKind};
use crate::check_digit::CheckDigitCalculator;
use crate::error::PseudonymError;
use md5::Md5;
use psn_domain::config::AttributeDefaults;
use psn_domain::constants::MAX_ALPHABET_LEN;
use psn_hierarchy::EffectiveConfig;
use serde::Serialize;
use sha1::Sha1;
use std::borrow::Cow;
use sha2::{Digest, Sha256, Sha512};
use sha3::Sha3_256;
use tracing::{debug, warn};

/// Everything a strategy needs, detached from the domain it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlgorithmSelection {
    pub algorithm: String,
    pub alphabet: String,
    /// Target length of the value; excludes the prefix and, unless
    /// `check_digit_counts_toward_length`, the check character.
    pub length: usize,
    pub padding_char: char,
    pub padding_enabled: bool,
    pub salt: String,
    pub prefix: String,
    pub add_check_digit: bool,
    pub check_digit_counts_toward_length: bool,
    pub multiple_pseudonyms_allowed: bool,
}

impl AlgorithmSelection {
    /// A standalone selection using the system defaults for everything but the algorithm.
    #[must_use]
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self::with_defaults(algorithm, &AttributeDefaults::default())
    }

    #[must_use]
    pub fn with_defaults(algorithm: impl Into<String>, defaults: &AttributeDefaults) -> Self {
        Self {
            algorithm: algorithm.into(),
            alphabet: defaults.alphabet.clone(),
            length: defaults.pseudonym_length,
            padding_char: defaults.padding_char,
            padding_enabled: defaults.padding_enabled,
            salt: defaults.salt.clone(),
            prefix: String::new(),
            add_check_digit: defaults.add_check_digit,
            check_digit_counts_toward_length: defaults.check_digit_counts_toward_length,
            multiple_pseudonyms_allowed: defaults.multiple_pseudonyms_allowed,
        }
    }

    #[must_use]
    pub fn from_effective(config: &EffectiveConfig) -> Self {
        Self {
            algorithm: config.algorithm.value.clone(),
            alphabet: config.alphabet.value.clone(),
            length: config.pseudonym_length.value,
            padding_char: config.padding_char.value,
            padding_enabled: config.padding_enabled.value,
            salt: config.salt.value.clone(),
            prefix: config.prefix.clone(),
            add_check_digit: config.add_check_digit.value,
            check_digit_counts_toward_length: config.check_digit_counts_toward_length.value,
            multiple_pseudonyms_allowed: config.multiple_pseudonyms_allowed.value,
        }
    }

    /// Length of the generated value before the check character is appended.
    #[must_use]
    pub fn value_length(&self) -> usize {
        if self.add_check_digit && self.check_digit_counts_toward_length {
            self.length.saturating_sub(1).max(1)
        } else {
            self.length
        }
    }
}

/// A generated pseudonym with the details of how it was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generated {
    /// `prefix + value [+ check digit]`.
    pub pseudonym: String,
    pub value: String,
    pub check_digit: Option<char>,
    pub selection: Selection,
    pub counter: Option<i64>,
    /// `false` when the value is shorter than requested (padding disabled) or the check
    /// character could not be computed.
    pub conforming: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PseudonymGenerator;

impl PseudonymGenerator {
    /// Generates a pseudonym for `identifier`.
    ///
    /// `counter` must hold the post-increment counter whenever the selected strategy
    /// [uses one](Algorithm::uses_counter); it is ignored otherwise.
    ///
    /// # Errors
    /// Returns [`PseudonymError::EmptyAlphabet`] for a random strategy without alphabet and
    /// [`PseudonymError::InvalidConfig`] for a missing or negative counter, an oversized
    /// alphabet or a length that leaves no room for a value.
    pub fn generate(
        identifier: &str,
        selection: &AlgorithmSelection,
        counter: Option<i64>,
    ) -> Result<Generated, PseudonymError> {
        let choice = AlgorithmRegistry::select(&selection.algorithm);
        let algorithm = choice.algorithm();
        let counter = if algorithm.uses_counter(selection.multiple_pseudonyms_allowed) {
            Some(counter.ok_or_else(|| PseudonymError::InvalidConfig {
                message: format!("{algorithm} needs a counter value").into(),
                context: None,
            })?)
        } else {
            None
        };

        let target = selection.value_length();
        if target == 0 {
            return Err(PseudonymError::InvalidConfig {
                message: format!("pseudonym length {} leaves no room for a value", selection.length)
                    .into(),
                context: None,
            });
        }

        let calculator = if selection.add_check_digit {
            Some(CheckDigitCalculator::new(algorithm.check_digit_alphabet(&selection.alphabet))?)
        } else {
            None
        };
        let raw =
            raw_value(algorithm, identifier, selection, counter, target, calculator.as_ref())?;
        let padding = selection.padding_enabled.then_some(selection.padding_char);
        let value = correct_length(&raw, target, padding);
        let mut conforming = value.chars().count() == target;
        if !conforming {
            warn!(
                algorithm = %algorithm,
                length = value.chars().count(),
                target,
                "Generated value is shorter than the configured length and padding is disabled"
            );
        }

        let check_digit = calculator.and_then(|calculator| {
            let check = calculator.compute(&value, "");
            if check.is_none() {
                conforming = false;
                warn!(
                    algorithm = %algorithm,
                    "Value holds characters outside the check digit alphabet, no check digit added"
                );
            }
            check
        });

        let mut pseudonym = String::with_capacity(selection.prefix.len() + value.len() + 1);
        pseudonym.push_str(&selection.prefix);
        pseudonym.push_str(&value);
        pseudonym.extend(check_digit);

        debug!(algorithm = %algorithm, length = pseudonym.len(), "Pseudonym generated");
        Ok(Generated { pseudonym, value, check_digit, selection: choice, counter, conforming })
    }
}

/// The text deterministic strategies hash for `identifier` of type `id_type`.
///
/// An empty `id_type` leaves the identifier as is; otherwise the type follows it after a
/// unit separator (`U+001F`), so one identifier under two types yields two pseudonyms.
#[must_use]
pub fn subject<'a>(identifier: &'a str, id_type: &str) -> Cow<'a, str> {
    if id_type.is_empty() {
        Cow::Borrowed(identifier)
    } else {
        Cow::Owned(format!("{identifier}\u{1f}{id_type}"))
    }
}

/// Brings `value` to `target` characters.
///
/// Longer values are truncated from the right. Shorter values are left-padded with `padding`
/// or, when it is `None`, returned unchanged.
#[must_use]
pub fn correct_length(value: &str, target: usize, padding: Option<char>) -> String {
    let len = value.chars().count();
    if len > target {
        debug!(length = len, target, "Truncating over-long value");
        return value.chars().take(target).collect();
    }
    match padding {
        Some(pad) if len < target => {
            let mut out: String = std::iter::repeat_n(pad, target - len).collect();
            out.push_str(value);
            out
        },
        _ => value.to_owned(),
    }
}

fn raw_value(
    algorithm: Algorithm,
    identifier: &str,
    selection: &AlgorithmSelection,
    counter: Option<i64>,
    length: usize,
    calculator: Option<&CheckDigitCalculator>,
) -> Result<String, PseudonymError> {
    let counter_text = counter.map(|c| c.to_string()).unwrap_or_default();

    match algorithm.kind() {
        StrategyKind::Digest => {
            let input = [identifier.as_bytes(), counter_text.as_bytes(), selection.salt.as_bytes()]
                .concat();
            Ok(digest_hex(algorithm, &input))
        },
        StrategyKind::KeyedHash => {
            let seed = salt_seed(&selection.salt);
            let input = [identifier.as_bytes(), counter_text.as_bytes()].concat();
            Ok(format!("{:016X}", xxhash_rust::xxh64::xxh64(&input, seed)))
        },
        StrategyKind::Random => {
            // With a check digit, draw only from the characters the check digit covers.
            let alphabet: Vec<char> = calculator.map_or_else(
                || algorithm.output_alphabet(&selection.alphabet).chars().collect(),
                |calculator| calculator.alphabet().to_vec(),
            );
            random_string(&alphabet, length)
        },
        StrategyKind::Counter => match counter {
            Some(value) if value >= 0 => Ok(counter_text),
            _ => Err(PseudonymError::InvalidConfig {
                message: format!("counter must be non-negative, got {counter_text}").into(),
                context: None,
            }),
        },
    }
}

fn digest_hex(algorithm: Algorithm, input: &[u8]) -> String {
    match algorithm {
        Algorithm::Md5 => hex::encode_upper(Md5::digest(input)),
        Algorithm::Sha1 => hex::encode_upper(Sha1::digest(input)),
        Algorithm::Sha512 => hex::encode_upper(Sha512::digest(input)),
        Algorithm::Sha3_256 => hex::encode_upper(Sha3_256::digest(input)),
        _ => hex::encode_upper(Sha256::digest(input)),
    }
}

/// First eight bytes of SHA-256(salt), big-endian.
fn salt_seed(salt: &str) -> u64 {
    let digest = Sha256::digest(salt.as_bytes());
    let mut seed = [0_u8; 8];
    seed.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(seed)
}

fn random_string(alphabet: &[char], length: usize) -> Result<String, PseudonymError> {
    match alphabet {
        [] => Err(PseudonymError::EmptyAlphabet {
            context: Some("Random strategy needs a non-empty alphabet".into()),
        }),
        [only] => Ok(std::iter::repeat_n(*only, length).collect()),
        _ if alphabet.len() > MAX_ALPHABET_LEN => Err(PseudonymError::InvalidConfig {
            message: format!(
                "alphabet holds {} characters, at most {MAX_ALPHABET_LEN} allowed",
                alphabet.len()
            )
            .into(),
            context: None,
        }),
        _ => Ok(sample(alphabet, length)),
    }
}

/// Draws `length` characters uniformly from `alphabet` by masked rejection sampling over
/// bytes of the system CSPRNG. Counts characters, so multi-byte alphabets are fine.
fn sample(alphabet: &[char], length: usize) -> String {
    let mask = alphabet.len().next_power_of_two() - 1;
    let step = length.saturating_mul(8).div_ceil(5).max(8);
    let mut out = String::with_capacity(length);
    let mut drawn = 0;

    while drawn < length {
        for byte in nanoid::rngs::default(step) {
            if let Some(c) = alphabet.get(usize::from(byte) & mask) {
                out.push(*c);
                drawn += 1;
                if drawn == length {
                    break;
                }
            }
        }
    }
    out
}
