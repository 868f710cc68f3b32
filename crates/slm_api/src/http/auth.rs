use crate::http::SlmApiState;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use common::auth::AuthClaims;
use common::domain::{DomainError, DomainResult};
use tracing::debug;

/// Caller identity taken from a bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub claims: AuthClaims,
}

impl AuthenticatedUser {
    /// Email for senders, staff id for mailroom users
    pub fn user_id(&self) -> &str {
        &self.claims.sub
    }

    pub fn require_role(&self, role: &str) -> DomainResult<()> {
        if self.claims.has_role(role) {
            Ok(())
        } else {
            debug!(user_id = %self.claims.sub, role, "missing role");
            Err(DomainError::PermissionDenied(format!("requires {role}")))
        }
    }
}

fn bearer_token(parts: &Parts) -> DomainResult<&str> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or_else(|| DomainError::InvalidToken("missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| DomainError::InvalidToken("malformed authorization header".to_string()))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| DomainError::InvalidToken("expected a bearer token".to_string()))
}

impl FromRequestParts<SlmApiState> for AuthenticatedUser {
    type Rejection = DomainError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SlmApiState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.auth_token_provider.validate_token(token)?;
        Ok(Self { claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/barcode");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts(Some("Bearer abc.def"))).unwrap(), "abc.def");
        assert!(matches!(
            bearer_token(&parts(None)),
            Err(DomainError::InvalidToken(_))
        ));
        assert!(matches!(
            bearer_token(&parts(Some("Basic dXNlcg=="))),
            Err(DomainError::InvalidToken(_))
        ));
        assert!(matches!(
            bearer_token(&parts(Some("Bearer   "))),
            Err(DomainError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_require_role() {
        let user = AuthenticatedUser {
            claims: AuthClaims {
                sub: "mailroom-1".to_string(),
                roles: vec!["ROLE_SLM_SCAN_BARCODE".to_string()],
                exp: 0,
                iat: 0,
            },
        };
        assert!(user.require_role("ROLE_SLM_SCAN_BARCODE").is_ok());
        assert!(matches!(
            user.require_role("ROLE_SLM_CREATE_BARCODE"),
            Err(DomainError::PermissionDenied(_))
        ));
    }
}
