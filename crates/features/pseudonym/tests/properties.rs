use proptest::prelude::*;
use psn_domain::constants::{DECIMAL_ALPHABET, HEX_ALPHABET, LETTERS_ALPHABET};
use psn_pseudonym::{AlgorithmSelection, CheckDigitCalculator, PseudonymGenerator, correct_length};

fn alphabet() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![HEX_ALPHABET, DECIMAL_ALPHABET, LETTERS_ALPHABET, "XY", "abcdef"])
}

fn word_over(alphabet: &'static str) -> impl Strategy<Value = String> {
    let chars: Vec<char> = alphabet.chars().collect();
    prop::collection::vec(prop::sample::select(chars), 1..40)
        .prop_map(|v| v.into_iter().collect())
}

proptest! {
    #[test]
    fn length_correction_is_idempotent(
        value in "[A-F0-9]{0,80}",
        target in 0_usize..64,
        padding in proptest::option::of(prop::sample::select(vec!['0', 'X', '_'])),
    ) {
        let once = correct_length(&value, target, padding);
        prop_assert_eq!(correct_length(&once, target, padding), once.clone());
        prop_assert!(once.chars().count() <= target.max(value.chars().count()));
        if padding.is_some() {
            prop_assert_eq!(once.chars().count(), target);
        }
    }

    #[test]
    fn appended_check_digit_validates(
        (alphabet, word) in alphabet().prop_flat_map(|a| (Just(a), word_over(a))),
        prefix in prop::sample::select(vec!["", "TS-", "P"]),
    ) {
        let calc = CheckDigitCalculator::new(alphabet).unwrap();
        let input = format!("{prefix}{word}");
        let with_check = calc.append(&input, prefix).unwrap();
        prop_assert_eq!(calc.validate(&with_check, prefix), Some(true));
    }

    #[test]
    fn single_substitution_is_detected(
        (alphabet, word) in alphabet().prop_flat_map(|a| (Just(a), word_over(a))),
        position in any::<prop::sample::Index>(),
        shift in 1_usize..64,
    ) {
        let calc = CheckDigitCalculator::new(alphabet).unwrap();
        let valid: Vec<char> = calc.append(&word, "").unwrap().chars().collect();

        let chars = calc.alphabet();
        let at = position.index(valid.len());
        let current = chars.iter().position(|c| *c == valid[at]).unwrap();
        let replacement = chars[(current + 1 + shift % (chars.len() - 1)) % chars.len()];
        prop_assume!(replacement != valid[at]);

        let mut mutated = valid.clone();
        mutated[at] = replacement;
        let mutated: String = mutated.into_iter().collect();
        prop_assert_eq!(calc.validate(&mutated, ""), Some(false));
    }

    #[test]
    fn hashes_are_deterministic_and_salt_sensitive(
        algorithm in prop::sample::select(vec!["MD5", "SHA1", "SHA2", "SHA512", "SHA3", "XXHASH"]),
        identifier in "[0-9]{1,12}",
        salt in "[a-z]{1,8}",
        counter in 0_i64..1_000,
        multiple in any::<bool>(),
    ) {
        let mut selection = AlgorithmSelection::new(algorithm);
        selection.salt.clone_from(&salt);
        selection.multiple_pseudonyms_allowed = multiple;

        let first = PseudonymGenerator::generate(&identifier, &selection, Some(counter)).unwrap();
        let second = PseudonymGenerator::generate(&identifier, &selection, Some(counter)).unwrap();
        prop_assert_eq!(&first.pseudonym, &second.pseudonym);

        selection.salt = format!("{salt}!");
        let salted = PseudonymGenerator::generate(&identifier, &selection, Some(counter)).unwrap();
        prop_assert_ne!(first.value, salted.value);
    }
}
