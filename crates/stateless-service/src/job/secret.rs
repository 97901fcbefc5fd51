//! Callback secret generation.

use rand::Rng;

const LETTERS_AND_DIGITS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PUNCTUATION: &[u8] = b"!@#$%^&*()-_[]{}<>~`+=,.;:/?|";

/// Length of generated callback secrets.
pub const SECRET_LENGTH: usize = 20;

/// Generate a random callback secret of letters, digits and punctuation.
pub fn generate_secret(length: usize) -> String {
    let mut rng = rand::rng();
    let charset: Vec<u8> = LETTERS_AND_DIGITS
        .iter()
        .chain(PUNCTUATION)
        .copied()
        .collect();
    (0..length)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

/// Compare secrets without short-circuiting on the first mismatch.
pub fn secrets_match(expected: &str, given: &str) -> bool {
    expected.len() == given.len()
        && expected
            .bytes()
            .zip(given.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secret_shape() {
        let secret = generate_secret(SECRET_LENGTH);
        assert_eq!(secret.chars().count(), SECRET_LENGTH);
        assert!(secret.bytes().all(|b| LETTERS_AND_DIGITS.contains(&b) || PUNCTUATION.contains(&b)));
        assert_ne!(secret, generate_secret(SECRET_LENGTH));
    }

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("abc!", "abc!"));
        assert!(!secrets_match("abc!", "abc?"));
        assert!(!secrets_match("abc", "abcd"));
    }
}
