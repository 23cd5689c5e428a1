use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Author,
    #[default]
    User,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Author {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub first_name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Author fields embedded in blog, comment and like responses.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuthorSummary {
    pub id: String,
    pub first_name: String,
    pub surname: String,
    pub image: Option<String>,
}

impl From<&Author> for AuthorSummary {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id.to_hex(),
            first_name: author.first_name.clone(),
            surname: author.surname.clone(),
            image: author.image.clone(),
        }
    }
}

/// Everything about an author except the password hash.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuthorProfile {
    pub id: String,
    pub first_name: String,
    pub surname: String,
    pub email: String,
    pub image: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&Author> for AuthorProfile {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id.to_hex(),
            first_name: author.first_name.clone(),
            surname: author.surname.clone(),
            email: author.email.clone(),
            image: author.image.clone(),
            role: author.role,
            created_at: author.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct CreateAuthorRequest {
    pub first_name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub author: AuthorProfile,
}
