use std::sync::Arc;

use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::category::model::{Category, CategoryView, CreateCategoryRequest};
use crate::category::repository::CategoryRepository;
use crate::middleware::auth::AuthUser;
use crate::utils::error::CustomError;
use crate::utils::helpers::required_text;

pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn create(
        &self,
        user: &AuthUser,
        req: CreateCategoryRequest,
    ) -> Result<CategoryView, CustomError> {
        if !user.is_admin() {
            return Err(CustomError::ForbiddenError(
                "Access denied. Admins only".to_string(),
            ));
        }

        let name = required_text(req.name.as_deref(), "name")?;
        let now = Utc::now();
        let category = self
            .categories
            .insert(Category {
                id: ObjectId::new(),
                name,
                created_at: now,
                updated_at: now,
            })
            .await?;

        Ok(CategoryView::from(&category))
    }

    pub async fn list(&self) -> Result<Vec<CategoryView>, CustomError> {
        let categories = self.categories.find_all().await?;
        Ok(categories.iter().map(CategoryView::from).collect())
    }
}
