/// Password hashing with bcrypt.
///
/// Every hash carries its own random salt and cost factor, so the stored
/// string is self-describing and verification needs nothing else. Both
/// operations are CPU-bound and run on tokio's blocking pool.
use super::error::{StoreError, StoreResult};

/// bcrypt only looks at the first 72 bytes of input
pub const MAX_PASSWORD_BYTES: usize = 72;

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> StoreResult<Self> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(StoreError::Invalid(format!(
                "bcrypt cost must be between {} and {}",
                MIN_COST,
                MAX_COST
            )));
        }
        Ok(PasswordHasher { cost })
    }

    pub async fn hash(&self, password: &str) -> StoreResult<String> {
        let cost = self.cost;
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await?
            .map_err(|e| StoreError::Internal(format!("password hashing failed: {}", e)))
    }

    /// Returns `false` for a mismatch and for a stored hash that cannot be parsed.
    pub async fn verify(&self, password: &str, hash: &str) -> StoreResult<bool> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
        match outcome {
            Ok(matched) => Ok(matched),
            Err(e) => {
                log::warn!("Stored password hash rejected: {}", e);
                Ok(false)
            }
        }
    }
}
