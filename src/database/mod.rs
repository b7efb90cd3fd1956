pub mod handle;
pub mod manager;
pub mod schema;
pub mod sqlite;

pub use handle::{BoundStatement, Database, PreparedStatement, Row, SqlValue, StatementResult};
pub use manager::{DatabaseError, DatabaseManager};
pub use schema::{SchemaEnsurer, SchemaOutcome, TABLE_NAME};
pub use sqlite::SqliteDatabase;
