pub mod courses;
pub mod feedback;
pub mod modules;
pub mod orders;
pub mod users;

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Open a SeaORM connection pool for `database_url`.
pub async fn create_pool(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
