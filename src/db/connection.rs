use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;

pub type Db = Surreal<Any>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: env::var("SURREALDB_URL").unwrap_or_else(|_| "memory".to_string()),
            namespace: env::var("SURREALDB_NAMESPACE").unwrap_or_else(|_| "school".to_string()),
            database: env::var("SURREALDB_DATABASE").unwrap_or_else(|_| "registry".to_string()),
            username: env::var("SURREALDB_USERNAME").ok(),
            password: env::var("SURREALDB_PASSWORD").ok(),
        }
    }
}

impl DatabaseConfig {
    /// Config for a throwaway in-process database.
    pub fn in_memory() -> Self {
        Self {
            url: "memory".to_string(),
            namespace: "school".to_string(),
            database: "registry".to_string(),
            username: None,
            password: None,
        }
    }
}

pub async fn create_connection(config: DatabaseConfig) -> Result<Db> {
    let db = surrealdb::engine::any::connect(config.url).await?;

    // Sign in if credentials are provided
    if let (Some(username), Some(password)) = (config.username, config.password) {
        db.signin(Root {
            username: &username,
            password: &password,
        })
        .await?;
    }

    db.use_ns(config.namespace).use_db(config.database).await?;

    Ok(db)
}

pub async fn ensure_schema(db: &Db) -> Result<()> {
    let schema_queries = vec![
        // Student records, keyed by student number (student:<n>)
        "DEFINE TABLE IF NOT EXISTS student SCHEMAFULL;
         DEFINE FIELD IF NOT EXISTS student_number ON TABLE student TYPE int;
         DEFINE FIELD IF NOT EXISTS name ON TABLE student TYPE string;
         DEFINE FIELD IF NOT EXISTS age ON TABLE student TYPE int;
         DEFINE FIELD IF NOT EXISTS address ON TABLE student TYPE string;
         DEFINE FIELD IF NOT EXISTS graduation ON TABLE student TYPE bool;
         DEFINE FIELD IF NOT EXISTS password ON TABLE student TYPE string;
         DEFINE FIELD IF NOT EXISTS created_at ON TABLE student TYPE datetime DEFAULT time::now();
         DEFINE FIELD IF NOT EXISTS updated_at ON TABLE student TYPE datetime VALUE time::now();",
        // Unique-key lookup for sign-in
        "DEFINE INDEX IF NOT EXISTS student_number_unique ON TABLE student COLUMNS student_number UNIQUE;",
    ];

    for query in schema_queries {
        db.query(query).await?.check()?;
    }

    Ok(())
}
