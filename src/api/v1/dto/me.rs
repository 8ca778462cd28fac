/*
 * Responsibility
 * - /me の claims 型と response DTO
 * - UserClaims は ClaimSetFactory (TypedClaims) でリクエストごとに decode される
 */
use serde::{Deserialize, Serialize};

use crate::services::auth::{ClaimSet, ClaimsError, RegisteredClaims, TimeWindow};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    #[serde(flatten)]
    pub registered: RegisteredClaims,
    #[serde(default)]
    pub name: Option<String>,
}

impl ClaimSet for UserClaims {
    fn validate(&self, window: &TimeWindow) -> Result<(), ClaimsError> {
        self.registered.validate(window)
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub expires_at: Option<i64>,
    pub algorithm: String,
}
