//! Redemption code allocation
//!
//! Codes are derived from UUIDs and checked against the store with a
//! bounded retry loop; exhausting the attempts is an error, never a spin.

use crate::store::{StoreError, StoreResult};

/// Collision retries before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;

/// Length of the random suffix after the prefix
const SUFFIX_LEN: usize = 8;

/// Generate one candidate code: `PREFIX-XXXXXXXX`
pub fn generate_code(prefix: &str) -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SUFFIX_LEN)
        .collect();
    format!(
        "{}-{}",
        prefix.trim().to_ascii_uppercase(),
        suffix.to_ascii_uppercase()
    )
}

/// Allocate a code not yet present in the store.
///
/// `exists` answers whether a candidate is already taken; the loop retries
/// up to `max_attempts` candidates.
pub async fn allocate_code<F, Fut>(
    prefix: &str,
    max_attempts: u32,
    mut exists: F,
) -> StoreResult<String>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = StoreResult<bool>>,
{
    for _ in 0..max_attempts {
        let candidate = generate_code(prefix);
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
    }
    Err(StoreError::Duplicate(format!(
        "could not allocate a unique '{}' code in {} attempts",
        prefix, max_attempts
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_shape() {
        let code = generate_code("promo");
        assert!(code.starts_with("PROMO-"));
        assert_eq!(code.len(), "PROMO-".len() + SUFFIX_LEN);
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-'));
    }

    #[tokio::test]
    async fn test_allocate_retries_on_collision() {
        let mut calls = 0;
        let code = allocate_code("X", 3, |_| {
            calls += 1;
            let taken = calls < 3;
            async move { Ok(taken) }
        })
        .await
        .unwrap();
        assert!(code.starts_with("X-"));
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_allocate_exhaustion_is_error() {
        let result = allocate_code("X", 2, |_| async { Ok(true) }).await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }
}
