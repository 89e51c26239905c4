use crate::{ConnectionPool, Database, PooledConnection};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{marker::PhantomData, sync::Arc, sync::Mutex, time::Duration};
use surrealdb::opt::auth::Root;
use tokio::time::timeout;

use app_error::{AppError, AppErrorExt, AppResult};

impl ConnectionPool {
    pub fn new(
        connection_url: &str,
        max_size: usize,
        namespace: &str,
        database: &str,
        credentials: Option<DbCredentials>,
    ) -> Self {
        Self {
            connection_url: connection_url.to_string(),
            connections: Mutex::new(Vec::with_capacity(max_size)).into(),
            max_size,
            namespace: namespace.to_string(),
            database: database.to_string(),
            credentials,
        }
    }

    /// Runs on every connection the pool opens: authenticate when
    /// credentials are configured, then select the namespace and database.
    /// A connection is never handed out without this.
    async fn initialize_connection(
        &self,
        conn: &surrealdb::Surreal<surrealdb::engine::any::Any>,
    ) -> AppResult<()> {
        if let Some(credentials) = &self.credentials {
            conn.signin(Root {
                username: credentials.get_username(),
                password: credentials.get_password(),
            })
            .await
            .context("Failed to authenticate with database")
            .db_err()?;
        }

        conn.use_ns(&self.namespace)
            .use_db(&self.database)
            .await
            .context("Failed to select namespace and database")
            .db_err()?;

        Ok(())
    }

    /// Get a connection from the pool or create a new one if needed.
    /// Pooled connections are health-checked before reuse; connection
    /// attempts are bounded by a 5 second timeout.
    pub async fn get_connection(&self) -> AppResult<PooledConnection<'_>> {
        let conn_opt = {
            let mut connections = self.connections.lock().map_err(|e| {
                AppError::ServerError(anyhow::anyhow!(
                    "Failed to lock connection pool mutex: {}",
                    e
                ))
            })?;
            connections.pop()
        };

        if let Some(conn) = conn_opt {
            match timeout(Duration::from_secs(2), conn.health()).await {
                Ok(Ok(_)) => {
                    return Ok(PooledConnection {
                        conn: Some(conn),
                        pool: self,
                    });
                }
                _ => {
                    tracing::debug!("Discarding invalid connection from pool");
                }
            }
        }

        let conn_future = surrealdb::engine::any::connect(&self.connection_url);
        match timeout(Duration::from_secs(5), conn_future).await {
            Ok(conn_result) => {
                let new_conn = conn_result
                    .context("Failed to connect to database")
                    .db_err()?;

                self.initialize_connection(&new_conn).await?;

                Ok(PooledConnection {
                    conn: Some(new_conn),
                    pool: self,
                })
            }
            Err(_) => Err(AppError::DatabaseError(anyhow::anyhow!(
                "Database connection timeout - could not establish connection within 5 seconds"
            ))),
        }
    }

    pub fn return_connection(&self, conn: surrealdb::Surreal<surrealdb::engine::any::Any>) {
        if let Ok(mut connections) = self.connections.lock() {
            if connections.len() < self.max_size {
                connections.push(conn);
                return;
            }
        }
        // Pool full or mutex poisoned: the connection is dropped
    }
}

#[derive(Clone)]
pub struct DbCredentials {
    username: String,
    password: String,
}

impl DbCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    pub fn get_password(&self) -> &str {
        &self.password
    }
}

// Don't accidentally log credentials
impl std::fmt::Debug for DbCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Database {
    pub fn new(
        connection_url: &str,
        max_connections: usize,
        namespace: &str,
        database: &str,
        credentials: Option<DbCredentials>,
    ) -> Self {
        if !connection_url.starts_with("ws://")
            && !connection_url.starts_with("wss://")
            && !connection_url.starts_with("memory")
        {
            tracing::warn!(
                "Potentially invalid database connection URL format: {}",
                connection_url
            );
        }

        let pool = ConnectionPool::new(
            connection_url,
            max_connections,
            namespace,
            database,
            credentials,
        );
        Self { pool }
    }

    pub async fn get_connection(&self) -> AppResult<PooledConnection<'_>> {
        self.pool.get_connection().await
    }

    pub async fn initialize(
        connection_url: &str,
        max_connections: usize,
        namespace: &str,
        database: &str,
        credentials: &DbCredentials,
    ) -> AppResult<Self> {
        if namespace.trim().is_empty() {
            return Err(AppError::validation("namespace", "cannot be empty"));
        }

        if database.trim().is_empty() {
            return Err(AppError::validation("database", "cannot be empty"));
        }

        let db = Self::new(
            connection_url,
            max_connections,
            namespace,
            database,
            Some(credentials.clone()),
        );

        // Open one connection eagerly so bad credentials or an unreachable
        // endpoint surface at startup rather than on the first request
        db.get_connection().await?;

        Ok(db)
    }

    pub async fn initialize_memory(
        max_connections: usize,
        namespace: &str,
        database: &str,
    ) -> AppResult<Self> {
        let db = Self::new("memory", max_connections, namespace, database, None);

        db.get_connection().await?;

        Ok(db)
    }

    pub fn create<T>(&self, table: &str) -> CreateBuilder<'_, T> {
        CreateBuilder {
            pool: &self.pool,
            table: table.to_string(),
            _phantom: PhantomData,
        }
    }

    pub fn update<T>(&self, location: (&str, &str)) -> UpdateBuilder<'_, T> {
        UpdateBuilder {
            pool: &self.pool,
            table: location.0.to_string(),
            id: location.1.to_string(),
            _phantom: PhantomData,
        }
    }

    pub async fn delete<T>(&self, location: (&str, &str)) -> AppResult<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let conn = self.get_connection().await?;
        conn.get_ref()
            .delete((location.0, location.1))
            .await
            .context("Failed to delete record")
            .db_err()
    }

    pub async fn select<T>(&self, location: (&str, &str)) -> AppResult<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let conn = self.get_connection().await?;
        conn.get_ref()
            .select((location.0, location.1))
            .await
            .context("Failed to select record")
            .db_err()
    }

    pub async fn select_all<T>(&self, table: &str) -> AppResult<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let conn = self.get_connection().await?;
        conn.get_ref()
            .select(table)
            .await
            .context("Failed to select records")
            .db_err()
    }

    pub fn query(&self, sql: impl Into<String>) -> QueryBuilder<'_> {
        QueryBuilder {
            pool: &self.pool,
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }
}

pub struct CreateBuilder<'a, T> {
    pool: &'a ConnectionPool,
    table: String,
    _phantom: PhantomData<T>,
}

impl<'a, T> CreateBuilder<'a, T>
where
    T: Serialize + Send + Sync + 'static,
{
    pub async fn content(self, data: T) -> AppResult<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let conn = self.pool.get_connection().await?;
        conn.get_ref()
            .create(&self.table)
            .content(data)
            .await
            .context("Failed to create record")
            .db_err()
    }
}

pub struct UpdateBuilder<'a, T> {
    pool: &'a ConnectionPool,
    table: String,
    id: String,
    _phantom: PhantomData<T>,
}

impl<'a, T> UpdateBuilder<'a, T>
where
    T: Serialize + Send + Sync + 'static,
{
    pub async fn content(self, data: T) -> AppResult<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let conn = self.pool.get_connection().await?;
        conn.get_ref()
            .update((&self.table, &self.id))
            .content(data)
            .await
            .context("Failed to update record")
            .db_err()
    }
}

pub struct QueryBuilder<'a> {
    pool: &'a ConnectionPool,
    sql: String,
    bindings: Vec<(String, serde_json::Value)>,
}

impl<'a> QueryBuilder<'a> {
    pub fn bind(mut self, binding: (impl Into<String>, impl Into<serde_json::Value>)) -> Self {
        self.bindings.push((binding.0.into(), binding.1.into()));
        self
    }

    pub async fn r#await(self) -> AppResult<QueryResponse> {
        let conn = self.pool.get_connection().await?;
        let mut query = conn.get_ref().query(&self.sql);

        for (name, value) in self.bindings {
            query = query.bind((name, value));
        }

        let response = query.await.context("Failed to execute query").db_err()?;
        Ok(QueryResponse(response))
    }
}

pub struct QueryResponse(surrealdb::Response);

impl QueryResponse {
    pub async fn take<T>(mut self, index: usize) -> AppResult<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.0
            .take(index)
            .map_err(|e| anyhow::anyhow!("Failed to extract query results: {}", e))
            .context("Failed to extract query results")
            .db_err()
    }
}

/// Table-scoped store handle. Holds its `Database` by `Arc` so services can
/// be wired explicitly at startup instead of through a process-global.
pub struct DbService<T> {
    db: Arc<Database>,
    table_name: String,
    _phantom: PhantomData<T>,
}

impl<T> DbService<T>
where
    T: Clone + Serialize + for<'de> Deserialize<'de> + Send + Sync + 'static,
{
    pub fn new(db: Arc<Database>, table_name: impl Into<String>) -> Self {
        Self {
            db,
            table_name: table_name.into(),
            _phantom: PhantomData,
        }
    }

    // Generic DB operation wrapper: uniform logging plus translation of the
    // store's uniqueness violation into the conflict variant, so no raw
    // storage error ever reaches a handler
    async fn execute_db_operation<F, R>(&self, operation: &str, execute: F) -> AppResult<R>
    where
        F: Future<Output = AppResult<R>>,
    {
        execute.await.map_err(|e| {
            if let AppError::DatabaseError(err) = e {
                let text = err.to_string();
                // SurrealDB reports unique index violations as
                // "Database index `...` already contains ..."
                if text.contains("already contains") {
                    return AppError::resource_exists(&self.table_name, "value");
                }
                AppError::DatabaseError(anyhow::anyhow!(
                    "Failed to {} {} record: {}",
                    operation,
                    self.table_name,
                    err
                ))
            } else {
                e
            }
        })
    }

    pub async fn create_record(&self, item: T) -> AppResult<Option<T>> {
        self.execute_db_operation("create", async {
            self.db.create(&self.table_name).content(item).await
        })
        .await
    }

    pub async fn update_record(&self, record_id: &str, updated_data: T) -> AppResult<Option<T>> {
        self.execute_db_operation("update", async {
            self.db
                .update((&self.table_name, record_id))
                .content(updated_data)
                .await
        })
        .await
    }

    pub async fn delete_record(&self, record_id: &str) -> AppResult<Option<T>> {
        self.execute_db_operation("delete", async {
            self.db.delete((&self.table_name, record_id)).await
        })
        .await
    }

    pub async fn get_record_by_id(&self, record_id: &str) -> AppResult<Option<T>> {
        self.execute_db_operation("fetch", async {
            self.db.select((&self.table_name, record_id)).await
        })
        .await
    }

    /// Fetch every record in the table. There is no pagination; the list
    /// endpoint is expected to stay small at this scope.
    pub async fn get_all_records(&self) -> AppResult<Vec<T>> {
        self.execute_db_operation("list", async { self.db.select_all(&self.table_name).await })
            .await
    }

    // Validate identifier for injection prevention
    fn validate_identifier(&self, identifier: &str) -> AppResult<()> {
        let valid_pattern = regex::Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap();

        if !valid_pattern.is_match(identifier) {
            return Err(AppError::validation(
                identifier,
                "must start with a letter or underscore and contain only alphanumeric characters and underscores",
            ));
        }

        Ok(())
    }

    pub async fn get_records_by_field<V>(&self, field: &str, value: V) -> AppResult<Vec<T>>
    where
        V: Serialize + Send + Sync + 'static,
    {
        self.validate_identifier(field)?;
        self.validate_identifier(&self.table_name)?;

        let sql = format!("SELECT * FROM {} WHERE {} = $value", self.table_name, field);

        let value_json = serde_json::to_value(value).map_err(|e| {
            AppError::validation(field, &format!("failed to serialize value: {}", e))
        })?;

        self.execute_db_operation("query", async {
            let response = self.db.query(&sql).bind(("value", value_json)).r#await().await?;

            response.take(0).await
        })
        .await
    }
}
