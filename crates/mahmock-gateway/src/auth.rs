// SPDX-FileCopyrightText: 2026 Mahmock Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handshake authentication.
//!
//! Clients authenticate with query parameters on the upgrade request:
//! `?qq=<account>&verifyKey=<secret>`. Verification runs before the upgrade,
//! so a rejected client never reaches the session table.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use mahmock_core::{AccountId, MahError};

/// Authentication configuration for the gateway.
#[derive(Clone)]
pub struct AuthConfig {
    /// Shared secret every client must present.
    pub verify_key: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("verify_key", &"[redacted]")
            .finish()
    }
}

/// Raw handshake query parameters.
///
/// Kept as strings so a malformed account id is reported by [`AuthConfig::verify`]
/// rather than by the extractor.
#[derive(Debug, Default, Deserialize)]
pub struct HandshakeParams {
    #[serde(alias = "account")]
    pub qq: Option<String>,
    #[serde(rename = "verifyKey")]
    pub verify_key: Option<String>,
}

/// Why a handshake was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingParam(&'static str),
    MalformedAccount(String),
    BadSecret,
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::MissingParam(_) | Rejection::MalformedAccount(_) => {
                StatusCode::BAD_REQUEST
            }
            Rejection::BadSecret => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn reason(&self) -> String {
        match self {
            Rejection::MissingParam(name) => format!("missing query parameter `{name}`"),
            Rejection::MalformedAccount(raw) => format!("account id `{raw}` is not an integer"),
            Rejection::BadSecret => "verifyKey mismatch".to_string(),
        }
    }
}

impl From<Rejection> for MahError {
    fn from(rejection: Rejection) -> Self {
        MahError::HandshakeRejected {
            reason: rejection.reason(),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (self.status(), self.reason()).into_response()
    }
}

impl AuthConfig {
    pub fn new(verify_key: impl Into<String>) -> Self {
        Self {
            verify_key: verify_key.into(),
        }
    }

    /// Check the handshake parameters and resolve the account.
    ///
    /// Missing or malformed parameters are checked before the secret.
    pub fn verify(&self, params: &HandshakeParams) -> Result<AccountId, Rejection> {
        let raw_account = params
            .qq
            .as_deref()
            .ok_or(Rejection::MissingParam("qq"))?;
        let key = params
            .verify_key
            .as_deref()
            .ok_or(Rejection::MissingParam("verifyKey"))?;

        let account = raw_account
            .trim()
            .parse::<i64>()
            .map(AccountId)
            .map_err(|_| Rejection::MalformedAccount(raw_account.to_string()))?;

        if key != self.verify_key {
            return Err(Rejection::BadSecret);
        }
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(qq: Option<&str>, key: Option<&str>) -> HandshakeParams {
        HandshakeParams {
            qq: qq.map(String::from),
            verify_key: key.map(String::from),
        }
    }

    #[test]
    fn accepts_matching_secret() {
        let auth = AuthConfig::new("TestOnly");
        assert_eq!(
            auth.verify(&params(Some("42"), Some("TestOnly"))),
            Ok(AccountId(42))
        );
    }

    #[test]
    fn missing_params_are_bad_requests() {
        let auth = AuthConfig::new("TestOnly");
        let err = auth.verify(&params(None, Some("TestOnly"))).unwrap_err();
        assert_eq!(err, Rejection::MissingParam("qq"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = auth.verify(&params(Some("1"), None)).unwrap_err();
        assert_eq!(err, Rejection::MissingParam("verifyKey"));
    }

    #[test]
    fn non_integer_account_is_a_bad_request() {
        let auth = AuthConfig::new("TestOnly");
        let err = auth.verify(&params(Some("abc"), Some("TestOnly"))).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let auth = AuthConfig::new("TestOnly");
        let err = auth.verify(&params(Some("1"), Some("nope"))).unwrap_err();
        assert_eq!(err, Rejection::BadSecret);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn account_alias_is_accepted() {
        let parsed: HandshakeParams =
            serde_json::from_value(serde_json::json!({"account": "7", "verifyKey": "k"}))
                .unwrap();
        assert_eq!(AuthConfig::new("k").verify(&parsed), Ok(AccountId(7)));
    }

    #[test]
    fn debug_redacts_secret() {
        let debug = format!("{:?}", AuthConfig::new("hunter2"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[redacted]"));
    }
}
