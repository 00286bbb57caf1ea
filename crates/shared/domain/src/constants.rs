//! Alphabets and system defaults shared by every crate of the workspace.

/// Upper-case hexadecimal digits, the output alphabet of every digest strategy.
pub const HEX_ALPHABET: &str = "0123456789ABCDEF";

/// Decimal digits, the output alphabet of the numeric and consecutive strategies.
pub const DECIMAL_ALPHABET: &str = "0123456789";

/// Latin capitals, the alphabet of the letter strategy and of the fallback strategy.
pub const LETTERS_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Alphabet used when neither a domain nor any of its ancestors configures one.
pub const DEFAULT_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const DEFAULT_ALGORITHM: &str = "SHA2";
pub const DEFAULT_PSEUDONYM_LENGTH: usize = 32;
pub const DEFAULT_PADDING_CHAR: char = '0';

/// Alphabets are indexed with a single byte by the random strategies.
pub const MAX_ALPHABET_LEN: usize = 255;
