pub mod index;
pub mod services;
