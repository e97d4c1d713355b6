use crate::utils::AppError;

/// Custo padrão do bcrypt (2^10 rounds)
pub const DEFAULT_HASH_COST: u32 = 10;

/// One-way password hashing with bcrypt.
///
/// Each call to [`PasswordHasher::hash`] draws a fresh salt, so equal plaintexts never
/// share a digest. Verification is bcrypt's own constant-time comparison.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_COST)
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, plaintext: &str) -> Result<String, AppError> {
        bcrypt::hash(plaintext, self.cost)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored digest is malformed.
    pub fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, AppError> {
        bcrypt::verify(plaintext, digest)
            .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))
    }

    /// Same as [`hash`](Self::hash), on the blocking pool so the worker isn't stalled
    pub async fn hash_blocking(&self, plaintext: String) -> Result<String, AppError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
    }

    pub async fn verify_blocking(&self, plaintext: String, digest: String) -> Result<bool, AppError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &digest))
            .await
            .map_err(|e| AppError::Internal(format!("Task join error: {}", e)))?
    }
}
