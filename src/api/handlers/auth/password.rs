//! bcrypt hashing for passwords and refresh-token secrets.
//!
//! bcrypt is CPU-bound, so both operations run on the blocking pool to keep
//! request tasks responsive. A verification mismatch is a normal `false`,
//! never an error.

use anyhow::{Context, Result};
use tokio::task;

/// Hash a plaintext with the configured cost. Salted, non-deterministic.
pub(super) async fn hash(plain: String, cost: u32) -> Result<String> {
    task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .context("hash task panicked")?
        .context("failed to hash secret")
}

/// Verify a plaintext against a stored hash.
pub(super) async fn verify(plain: String, hashed: String) -> Result<bool> {
    task::spawn_blocking(move || bcrypt::verify(plain, &hashed))
        .await
        .context("verify task panicked")?
        .context("failed to verify secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the tests fast.
    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn hash_then_verify_round_trips() -> Result<()> {
        let hashed = hash("pw123456".to_string(), TEST_COST).await?;
        assert!(verify("pw123456".to_string(), hashed.clone()).await?);
        assert!(!verify("wrong".to_string(), hashed).await?);
        Ok(())
    }

    #[tokio::test]
    async fn hashes_are_salted() -> Result<()> {
        let first = hash("pw123456".to_string(), TEST_COST).await?;
        let second = hash("pw123456".to_string(), TEST_COST).await?;
        assert_ne!(first, second);
        Ok(())
    }
}
