use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

bitflags! {
    /// A set of inheritable domain attributes.
    ///
    /// Used to describe which attributes a domain sets locally and which attributes a patch
    /// resets back to "inherit from the parent".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct AttributeSet: u32 {
        const ALGORITHM = 1 << 0;
        const ALPHABET = 1 << 1;
        const PSEUDONYM_LENGTH = 1 << 2;
        const PADDING_CHAR = 1 << 3;
        const PADDING_ENABLED = 1 << 4;
        const ADD_CHECK_DIGIT = 1 << 5;
        const CHECK_DIGIT_COUNTS_TOWARD_LENGTH = 1 << 6;
        const MULTIPLE_PSEUDONYMS_ALLOWED = 1 << 7;
        const VALID_FROM = 1 << 8;
        const VALID_TO = 1 << 9;
        const ENFORCE_START_DATE_VALIDITY = 1 << 10;
        const ENFORCE_END_DATE_VALIDITY = 1 << 11;
        const SALT = 1 << 12;
        const CONSECUTIVE_COUNTER = 1 << 13;

        const ALL = (1 << 14) - 1;
    }
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&str> for AttributeSet {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "algorithm" => Self::ALGORITHM,
            "alphabet" => Self::ALPHABET,
            "pseudonym_length" | "length" => Self::PSEUDONYM_LENGTH,
            "padding_char" => Self::PADDING_CHAR,
            "padding_enabled" => Self::PADDING_ENABLED,
            "add_check_digit" => Self::ADD_CHECK_DIGIT,
            "check_digit_counts_toward_length" => Self::CHECK_DIGIT_COUNTS_TOWARD_LENGTH,
            "multiple_pseudonyms_allowed" => Self::MULTIPLE_PSEUDONYMS_ALLOWED,
            "valid_from" => Self::VALID_FROM,
            "valid_to" => Self::VALID_TO,
            "enforce_start_date_validity" => Self::ENFORCE_START_DATE_VALIDITY,
            "enforce_end_date_validity" => Self::ENFORCE_END_DATE_VALIDITY,
            "salt" => Self::SALT,
            "consecutive_counter" => Self::CONSECUTIVE_COUNTER,
            "all" | "*" => Self::ALL,
            _ => Self::empty(),
        }
    }
}

impl Serialize for AttributeSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.bits())
    }
}

impl<'de> Deserialize<'de> for AttributeSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Self::from_bits_truncate(bits))
    }
}

/// The locally-set inheritable attributes of a domain.
///
/// `None` means "not set here": the value is inherited from the nearest ancestor that sets it,
/// or from the system defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainAttributes {
    pub algorithm: Option<String>,
    pub alphabet: Option<String>,
    pub pseudonym_length: Option<usize>,
    pub padding_char: Option<char>,
    pub padding_enabled: Option<bool>,
    pub add_check_digit: Option<bool>,
    pub check_digit_counts_toward_length: Option<bool>,
    pub multiple_pseudonyms_allowed: Option<bool>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub enforce_start_date_validity: Option<bool>,
    pub enforce_end_date_validity: Option<bool>,
    pub salt: Option<String>,
    pub consecutive_counter: Option<i64>,
}

impl DomainAttributes {
    /// Returns the set of attributes that carry a local value.
    #[must_use]
    pub fn local(&self) -> AttributeSet {
        let mut set = AttributeSet::empty();
        set.set(AttributeSet::ALGORITHM, self.algorithm.is_some());
        set.set(AttributeSet::ALPHABET, self.alphabet.is_some());
        set.set(AttributeSet::PSEUDONYM_LENGTH, self.pseudonym_length.is_some());
        set.set(AttributeSet::PADDING_CHAR, self.padding_char.is_some());
        set.set(AttributeSet::PADDING_ENABLED, self.padding_enabled.is_some());
        set.set(AttributeSet::ADD_CHECK_DIGIT, self.add_check_digit.is_some());
        set.set(
            AttributeSet::CHECK_DIGIT_COUNTS_TOWARD_LENGTH,
            self.check_digit_counts_toward_length.is_some(),
        );
        set.set(AttributeSet::MULTIPLE_PSEUDONYMS_ALLOWED, self.multiple_pseudonyms_allowed.is_some());
        set.set(AttributeSet::VALID_FROM, self.valid_from.is_some());
        set.set(AttributeSet::VALID_TO, self.valid_to.is_some());
        set.set(AttributeSet::ENFORCE_START_DATE_VALIDITY, self.enforce_start_date_validity.is_some());
        set.set(AttributeSet::ENFORCE_END_DATE_VALIDITY, self.enforce_end_date_validity.is_some());
        set.set(AttributeSet::SALT, self.salt.is_some());
        set.set(AttributeSet::CONSECUTIVE_COUNTER, self.consecutive_counter.is_some());
        set
    }

    /// Copies every attribute that `other` sets over the local value.
    pub fn overlay(&mut self, other: &Self) {
        fn take<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
            if let Some(v) = value {
                *slot = Some(v.clone());
            }
        }

        take(&mut self.algorithm, other.algorithm.as_ref());
        take(&mut self.alphabet, other.alphabet.as_ref());
        take(&mut self.pseudonym_length, other.pseudonym_length.as_ref());
        take(&mut self.padding_char, other.padding_char.as_ref());
        take(&mut self.padding_enabled, other.padding_enabled.as_ref());
        take(&mut self.add_check_digit, other.add_check_digit.as_ref());
        take(
            &mut self.check_digit_counts_toward_length,
            other.check_digit_counts_toward_length.as_ref(),
        );
        take(&mut self.multiple_pseudonyms_allowed, other.multiple_pseudonyms_allowed.as_ref());
        take(&mut self.valid_from, other.valid_from.as_ref());
        take(&mut self.valid_to, other.valid_to.as_ref());
        take(&mut self.enforce_start_date_validity, other.enforce_start_date_validity.as_ref());
        take(&mut self.enforce_end_date_validity, other.enforce_end_date_validity.as_ref());
        take(&mut self.salt, other.salt.as_ref());
        take(&mut self.consecutive_counter, other.consecutive_counter.as_ref());
    }

    /// Drops the local values of `attributes`, so they are inherited again.
    pub fn clear(&mut self, attributes: AttributeSet) {
        if attributes.contains(AttributeSet::ALGORITHM) {
            self.algorithm = None;
        }
        if attributes.contains(AttributeSet::ALPHABET) {
            self.alphabet = None;
        }
        if attributes.contains(AttributeSet::PSEUDONYM_LENGTH) {
            self.pseudonym_length = None;
        }
        if attributes.contains(AttributeSet::PADDING_CHAR) {
            self.padding_char = None;
        }
        if attributes.contains(AttributeSet::PADDING_ENABLED) {
            self.padding_enabled = None;
        }
        if attributes.contains(AttributeSet::ADD_CHECK_DIGIT) {
            self.add_check_digit = None;
        }
        if attributes.contains(AttributeSet::CHECK_DIGIT_COUNTS_TOWARD_LENGTH) {
            self.check_digit_counts_toward_length = None;
        }
        if attributes.contains(AttributeSet::MULTIPLE_PSEUDONYMS_ALLOWED) {
            self.multiple_pseudonyms_allowed = None;
        }
        if attributes.contains(AttributeSet::VALID_FROM) {
            self.valid_from = None;
        }
        if attributes.contains(AttributeSet::VALID_TO) {
            self.valid_to = None;
        }
        if attributes.contains(AttributeSet::ENFORCE_START_DATE_VALIDITY) {
            self.enforce_start_date_validity = None;
        }
        if attributes.contains(AttributeSet::ENFORCE_END_DATE_VALIDITY) {
            self.enforce_end_date_validity = None;
        }
        if attributes.contains(AttributeSet::SALT) {
            self.salt = None;
        }
        if attributes.contains(AttributeSet::CONSECUTIVE_COUNTER) {
            self.consecutive_counter = None;
        }
    }
}
