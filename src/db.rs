use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};

use crate::store::StoreResult;

pub async fn connect_and_migrate(database_url: &str) -> StoreResult<DatabaseConnection> {
    let mut options = ConnectOptions::new(database_url);
    options.sqlx_logging(false);
    if database_url.contains(":memory:") {
        // Every pooled connection would otherwise see its own empty database.
        options.max_connections(1);
    }

    let db = Database::connect(options).await?;

    for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL"] {
        db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string())).await?;
    }

    Migrator::up(&db, None).await?;
    Ok(db)
}
