use actix_web::dev::Payload;
use actix_web::http::header::Header;
use actix_web::{FromRequest, HttpRequest, web};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use chrono::{Duration, Utc};
use futures_util::future::{Ready, ready};
use jsonwebtoken::{DecodingKey, EncodingKey, Header as JwtHeader, Validation, decode, encode};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::author::model::Role;
use crate::config::AuthConfig;
use crate::utils::error::CustomError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub role: Role,
    pub exp: usize,
}

/// Caller identity decoded from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: ObjectId,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owners and admins may change or remove a resource.
    pub fn can_manage(&self, owner: &ObjectId) -> bool {
        self.is_admin() || self.id == *owner
    }
}

impl FromRequest for AuthUser {
    type Error = CustomError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, CustomError> {
    let config = req
        .app_data::<web::Data<AuthConfig>>()
        .ok_or_else(|| CustomError::InternalServerError("Auth is not configured".to_string()))?;

    let header = Authorization::<Bearer>::parse(req).map_err(|_| {
        CustomError::UnauthenticatedError("Access denied. No token provided".to_string())
    })?;

    let claims = verify_token(header.as_ref().token(), config)?;
    let id = ObjectId::parse_str(&claims.id)
        .map_err(|_| CustomError::UnauthenticatedError("Invalid user id in token".to_string()))?;

    Ok(AuthUser {
        id,
        role: claims.role,
    })
}

pub fn create_token(
    author_id: &ObjectId,
    role: Role,
    config: &AuthConfig,
) -> Result<String, CustomError> {
    let expiration = Duration::try_days(config.token_ttl_days)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .ok_or_else(|| CustomError::InternalServerError("Invalid token lifetime".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        id: author_id.to_hex(),
        role,
        exp: expiration,
    };

    encode(
        &JwtHeader::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|_| CustomError::InternalServerError("Token generation failed".to_string()))
}

pub fn verify_token(token: &str, config: &AuthConfig) -> Result<Claims, CustomError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| CustomError::UnauthenticatedError("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_days: 7,
            bcrypt_cost: 4,
            admin_emails: Vec::new(),
        }
    }

    #[test]
    fn token_round_trips_identity_and_role() {
        let id = ObjectId::new();
        let token = create_token(&id, Role::Author, &config()).unwrap();
        let claims = verify_token(&token, &config()).unwrap();
        assert_eq!(claims.id, id.to_hex());
        assert_eq!(claims.role, Role::Author);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = create_token(&ObjectId::new(), Role::User, &config()).unwrap();
        let other = AuthConfig {
            jwt_secret: "other".to_string(),
            ..config()
        };
        assert!(matches!(
            verify_token(&token, &other),
            Err(CustomError::UnauthenticatedError(_))
        ));
    }

    #[actix_web::test]
    async fn extractor_requires_a_bearer_header() {
        let req = TestRequest::default()
            .app_data(web::Data::new(config()))
            .to_http_request();
        let err = AuthUser::extract(&req).await.unwrap_err();
        assert!(matches!(err, CustomError::UnauthenticatedError(_)));
    }

    #[actix_web::test]
    async fn extractor_decodes_a_valid_token() {
        let id = ObjectId::new();
        let token = create_token(&id, Role::Admin, &config()).unwrap();
        let req = TestRequest::default()
            .app_data(web::Data::new(config()))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_http_request();

        let user = AuthUser::extract(&req).await.unwrap();
        assert_eq!(user.id, id);
        assert!(user.is_admin());
        assert!(user.can_manage(&ObjectId::new()));
    }

    #[test]
    fn owners_manage_their_own_resources_only() {
        let user = AuthUser {
            id: ObjectId::new(),
            role: Role::Author,
        };
        assert!(user.can_manage(&user.id.clone()));
        assert!(!user.can_manage(&ObjectId::new()));
    }
}
