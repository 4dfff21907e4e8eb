pub mod campaign;
pub mod config;
pub mod driver;
pub mod models;
pub mod notify;
pub mod retry;
pub mod sites;
pub mod utils;

// Re-export commonly used types
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
