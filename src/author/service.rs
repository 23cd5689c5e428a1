use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use log::info;
use mongodb::bson::oid::ObjectId;

use crate::author::model::{
    AuthResponse, Author, AuthorProfile, AuthorSummary, CreateAuthorRequest, LoginRequest, Role,
};
use crate::author::repository::AuthorRepository;
use crate::config::AuthConfig;
use crate::middleware::auth::create_token;
use crate::utils::error::CustomError;
use crate::utils::hashing;
use crate::utils::helpers::{optional_text, required_text};

/// Look up the summaries for a set of author ids in one query. Ids without a
/// stored author are left out of the map.
pub async fn resolve_summaries<I>(
    authors: &dyn AuthorRepository,
    ids: I,
) -> Result<HashMap<ObjectId, AuthorSummary>, CustomError>
where
    I: IntoIterator<Item = ObjectId>,
{
    let mut unique: Vec<ObjectId> = ids.into_iter().collect();
    unique.sort();
    unique.dedup();

    let found = authors.find_by_ids(&unique).await?;
    Ok(found
        .iter()
        .map(|author| (author.id, AuthorSummary::from(author)))
        .collect())
}

pub struct AuthorService {
    authors: Arc<dyn AuthorRepository>,
    auth: AuthConfig,
}

impl AuthorService {
    pub fn new(authors: Arc<dyn AuthorRepository>, auth: AuthConfig) -> Self {
        Self { authors, auth }
    }

    pub async fn register(&self, req: CreateAuthorRequest) -> Result<AuthResponse, CustomError> {
        let first_name = required_text(req.first_name.as_deref(), "first_name")?;
        let surname = required_text(req.surname.as_deref(), "surname")?;
        let email = required_text(req.email.as_deref(), "email")?.to_lowercase();
        let password = required_text(req.password.as_deref(), "password")?;

        if !email.contains('@') {
            return Err(CustomError::ValidationError("Provide a valid email".to_string()));
        }

        let role = self.role_for(&email, req.role)?;

        if self.authors.find_by_email(&email).await?.is_some() {
            return Err(CustomError::ConflictError(
                "An author with this email already exists".to_string(),
            ));
        }

        let hashed = hashing::hash_password(&password, self.auth.bcrypt_cost)
            .map_err(|e| CustomError::InternalServerError(format!("Failed to hash password: {}", e)))?;

        let now = Utc::now();
        let author = self
            .authors
            .insert(Author {
                id: ObjectId::new(),
                first_name,
                surname,
                email,
                password: hashed,
                image: optional_text(req.image.as_deref()),
                role,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!("registered author {} as {:?}", author.id, author.role);

        let token = create_token(&author.id, author.role, &self.auth)?;
        Ok(AuthResponse {
            token,
            author: AuthorProfile::from(&author),
        })
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, CustomError> {
        let email = required_text(req.email.as_deref(), "email")?.to_lowercase();
        let password = required_text(req.password.as_deref(), "password")?;

        let invalid = || CustomError::UnauthenticatedError("Invalid email or password".to_string());

        let author = self.authors.find_by_email(&email).await?.ok_or_else(invalid)?;

        let matches = hashing::verify_password(&password, &author.password)
            .map_err(|_| invalid())?;
        if !matches {
            return Err(invalid());
        }

        let token = create_token(&author.id, author.role, &self.auth)?;
        Ok(AuthResponse {
            token,
            author: AuthorProfile::from(&author),
        })
    }

    pub async fn list(&self) -> Result<Vec<AuthorProfile>, CustomError> {
        let authors = self.authors.find_all().await?;
        Ok(authors.iter().map(AuthorProfile::from).collect())
    }

    pub async fn get(&self, id: &ObjectId) -> Result<AuthorProfile, CustomError> {
        self.authors
            .find_by_id(id)
            .await?
            .map(|author| AuthorProfile::from(&author))
            .ok_or_else(|| CustomError::NotFoundError("Author not found".to_string()))
    }

    /// Admin is granted through configuration only.
    fn role_for(&self, email: &str, requested: Option<Role>) -> Result<Role, CustomError> {
        if self.auth.is_admin_email(email) {
            return Ok(Role::Admin);
        }

        match requested.unwrap_or_default() {
            Role::Admin => Err(CustomError::ForbiddenError(
                "The admin role cannot be self-assigned".to_string(),
            )),
            role => Ok(role),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::InMemoryStore;
    use crate::middleware::auth::verify_token;

    fn service() -> AuthorService {
        let auth = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_days: 7,
            bcrypt_cost: 4,
            admin_emails: vec!["boss@example.com".to_string()],
        };
        AuthorService::new(Arc::new(InMemoryStore::new()), auth)
    }

    fn request(email: &str, role: Option<Role>) -> CreateAuthorRequest {
        CreateAuthorRequest {
            first_name: Some("Ada".to_string()),
            surname: Some("Lovelace".to_string()),
            email: Some(email.to_string()),
            password: Some("analytical-engine".to_string()),
            image: None,
            role,
        }
    }

    #[tokio::test]
    async fn register_issues_a_token_and_hides_the_password() {
        let service = service();
        let res = service.register(request("Ada@Example.com", Some(Role::Author))).await.unwrap();

        assert_eq!(res.author.email, "ada@example.com");
        assert_eq!(res.author.role, Role::Author);

        let claims = verify_token(&res.token, &service.auth).unwrap();
        assert_eq!(claims.id, res.author.id);

        let json = serde_json::to_value(&res.author).unwrap();
        assert!(json.get("password").is_none());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let service = service();
        service.register(request("ada@example.com", None)).await.unwrap();
        let err = service.register(request("ADA@example.com", None)).await.unwrap_err();
        assert!(matches!(err, CustomError::ConflictError(_)));
    }

    #[tokio::test]
    async fn admin_comes_from_configuration_only() {
        let service = service();
        let err = service
            .register(request("ada@example.com", Some(Role::Admin)))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::ForbiddenError(_)));

        let res = service.register(request("boss@example.com", None)).await.unwrap();
        assert_eq!(res.author.role, Role::Admin);
    }

    #[tokio::test]
    async fn missing_fields_are_validation_errors() {
        let err = service()
            .register(CreateAuthorRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::ValidationError(_)));
    }

    #[tokio::test]
    async fn login_checks_the_password() {
        let service = service();
        service.register(request("ada@example.com", None)).await.unwrap();

        let ok = service
            .login(LoginRequest {
                email: Some("ada@example.com".to_string()),
                password: Some("analytical-engine".to_string()),
            })
            .await;
        assert!(ok.is_ok());

        let err = service
            .login(LoginRequest {
                email: Some("ada@example.com".to_string()),
                password: Some("wrong".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::UnauthenticatedError(_)));
    }
}
