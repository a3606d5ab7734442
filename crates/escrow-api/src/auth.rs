//! # Caller Identity
//!
//! The ledger trusts whatever caller identifier it is handed; it performs no
//! signature checks. Over HTTP that identifier travels in the
//! `X-Caller-Account` header. Handlers that act on behalf of a caller take a
//! [`CallerIdentity`] argument, which rejects the request with 401 when the
//! header is missing or is not a valid account id.

use axum::http::request::Parts;
use escrow_core::AccountId;

use crate::error::AppError;

/// Header carrying the caller's account id.
pub const CALLER_HEADER: &str = "x-caller-account";

/// The account on whose behalf a request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's account.
    pub account: AccountId,
}

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CALLER_HEADER)
            .ok_or_else(|| AppError::Unauthorized(format!("missing {CALLER_HEADER} header")))?;
        let value = raw
            .to_str()
            .map_err(|_| AppError::Unauthorized(format!("{CALLER_HEADER} is not valid text")))?;
        let account = AccountId::new(value)
            .map_err(|e| AppError::Unauthorized(format!("{CALLER_HEADER}: {e}")))?;
        Ok(Self { account })
    }
}
