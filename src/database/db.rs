use log::info;
use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};

use crate::config::AppConfig;

pub const AUTHORS: &str = "authors";
pub const BLOGS: &str = "blogs";
pub const COMMENTS: &str = "comments";
pub const LIKES: &str = "likes";
pub const CATEGORIES: &str = "categories";

/// Open a client, ping the server and hand back the application database.
pub async fn connect_to_mongo(config: &AppConfig) -> Result<Database, mongodb::error::Error> {
    let mut client_options = ClientOptions::parse(&config.mongodb_uri).await?;
    client_options.app_name = Some("quill-blog".to_string());

    let client = Client::with_options(client_options)?;

    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await?;

    info!("Connected successfully to MongoDB");

    Ok(client.database(&config.mongodb_database))
}

/// Connect and ensure indexes. The unique like and email indexes back the
/// repositories' conflict checks, so a failure here must stop startup.
pub async fn init_database(config: &AppConfig) -> Result<Database, mongodb::error::Error> {
    let db = connect_to_mongo(config).await?;
    ensure_indexes(&db).await?;
    Ok(db)
}

/// Create the indexes the repositories rely on. Safe to run on every start.
pub async fn ensure_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let unique = || IndexOptions::builder().unique(true).build();

    db.collection::<mongodb::bson::Document>(LIKES)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "blog": 1, "author": 1 })
                .options(unique())
                .build(),
        )
        .await?;

    db.collection::<mongodb::bson::Document>(AUTHORS)
        .create_index(
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique())
                .build(),
        )
        .await?;

    db.collection::<mongodb::bson::Document>(COMMENTS)
        .create_index(IndexModel::builder().keys(doc! { "blog": 1 }).build())
        .await?;

    info!("MongoDB indexes are in place");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_fails_when_the_server_is_unreachable() {
        let mut config = AppConfig::from_lookup(|name| match name {
            "JWT_SECRET" => Some("s".to_string()),
            _ => None,
        })
        .unwrap();
        config.mongodb_uri =
            "mongodb://127.0.0.1:1/?serverSelectionTimeoutMS=200&connectTimeoutMS=200"
                .to_string();

        assert!(init_database(&config).await.is_err());
    }
}
