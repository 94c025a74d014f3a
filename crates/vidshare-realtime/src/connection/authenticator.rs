//! WebSocket handshake authentication.

use std::sync::Arc;

use vidshare_auth::jwt::JwtDecoder;
use vidshare_core::error::AppError;
use vidshare_core::types::id::UserId;

/// Identity verified from the handshake token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedConnection {
    /// User ID.
    pub user_id: UserId,
    /// Username.
    pub username: String,
}

/// Authenticates WebSocket connections using the REST JWT decoder.
#[derive(Clone)]
pub struct WsAuthenticator {
    decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Resolve the handshake token.
    ///
    /// No token yields an anonymous connection; a token that fails
    /// verification is an authentication error.
    pub fn authenticate(
        &self,
        token: Option<&str>,
    ) -> Result<Option<AuthenticatedConnection>, AppError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        let claims = self.decoder.decode_access_token(token)?;

        Ok(Some(AuthenticatedConnection {
            user_id: claims.user_id(),
            username: claims.username,
        }))
    }
}
