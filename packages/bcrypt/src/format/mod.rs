//! Textual hash format: grammar, validation and encoding
//!
//! ```text
//! record  = "$" version "$" cost "$" salt [ digest ]
//! version = "2" | "2a" | "2b" | "2x" | "2y"
//! cost    = DIGIT DIGIT            ; 04..31, 2^cost >= MIN_ROUNDS
//! salt    = 22 * R64
//! digest  = 31 * R64
//! ```

pub mod cost;
pub mod radix64;
pub mod record;
pub mod version;

pub use cost::{Cost, DEFAULT_COST, MAX_COST, MIN_COST, MIN_ROUNDS};
pub use record::{HashRecord, DIGEST_LEN, DIGEST_TEXT_LEN, SALT_LEN, SALT_TEXT_LEN};
pub use version::Version;

use crate::Result;

/// Whether `text` is a well-formed salt or hash record
///
/// This is the only gate in front of the cipher for untrusted strings. It
/// never panics and never allocates an error.
#[must_use]
pub fn validate(text: &str) -> bool {
    HashRecord::parse(text).is_ok()
}

/// Extract the cost factor of a record
///
/// # Errors
///
/// Returns `BcryptError::MalformedHash` if `text` fails validation.
pub fn parse_cost(text: &str) -> Result<Cost> {
    HashRecord::parse(text).map(|record| record.cost())
}

/// Render a complete record
#[must_use]
pub fn encode(
    version: Version,
    cost: Cost,
    salt: &[u8; SALT_LEN],
    digest: &[u8; DIGEST_LEN],
) -> String {
    HashRecord::with_digest(version, cost, *salt, *digest).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn validate_never_panics(text in "\\PC{0,80}") {
            let _ = validate(&text);
        }

        #[test]
        fn validate_accepts_every_encoding(
            version_index in 0usize..5,
            cost in MIN_COST..=MAX_COST,
            salt in any::<[u8; SALT_LEN]>(),
            digest in any::<[u8; DIGEST_LEN]>(),
        ) {
            let version = Version::ALL[version_index];
            let cost = Cost::saturating(cost);
            let text = encode(version, cost, &salt, &digest);
            prop_assert!(validate(&text));
            prop_assert_eq!(parse_cost(&text).map(Cost::get), Ok(cost.get()));
            let record = HashRecord::parse(&text);
            prop_assert_eq!(record.map(|r| r.encoded_len()), Ok(text.len()));
        }

        #[test]
        fn validate_matches_grammar_shape(text in "\\$2[abxy]?\\$[0-9]{2}\\$[./A-Za-z0-9]{22}") {
            let cost: u32 = text[text.len() - 25..text.len() - 23].parse().unwrap_or(0);
            prop_assert_eq!(validate(&text), (MIN_COST..=MAX_COST).contains(&cost));
        }
    }

    #[test]
    fn test_parse_cost_errors() {
        assert!(matches!(
            parse_cost("not-a-hash"),
            Err(crate::BcryptError::MalformedHash(_))
        ));
        assert_eq!(
            parse_cost("$2b$12$......................").map(Cost::get),
            Ok(12)
        );
    }
}
