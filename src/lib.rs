pub mod author;
pub mod blog;
pub mod cache;
pub mod category;
pub mod comment;
pub mod config;
pub mod counter;
pub mod database;
pub mod like;
pub mod middleware;
pub mod router;
pub mod utils;
