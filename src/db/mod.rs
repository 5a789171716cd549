// Database module
// Connection pooling and repository access for the Sonarbot API

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DbError;
pub use pool::DbPool;
pub use repositories::Repositories;
