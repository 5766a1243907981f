//! `PostgreSQL` implementation of [`Store`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    postgres::{PgPoolOptions, PgRow},
    Connection, PgPool, Row,
};
use std::time::Duration;
use tracing::{info_span, Instrument, Span};
use uuid::Uuid;

use super::{CredentialRecord, Post, SignupOutcome, Store, User};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

const POST_COLUMNS: &str = "id, content, author_id, author_name, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a pool to `dsn`.
    ///
    /// # Errors
    /// Returns an error if the database is unreachable.
    pub async fn connect(dsn: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;

        Ok(Self { pool })
    }

    /// Apply `sql/schema.sql`. Every statement is idempotent.
    ///
    /// # Errors
    /// Returns an error naming the statement that failed.
    pub async fn apply_schema(&self) -> Result<()> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("failed to acquire connection for schema setup")?;

        for (index, statement) in split_sql_statements(SCHEMA_SQL).iter().enumerate() {
            sqlx::query(statement)
                .execute(&mut *conn)
                .instrument(db_span("DDL", statement))
                .await
                .with_context(|| format!("failed to execute schema statement {}", index + 1))?;
        }

        Ok(())
    }
}

fn db_span(operation: &str, statement: &str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
    }
}

fn post_from_row(row: &PgRow) -> Post {
    Post {
        id: row.get("id"),
        content: row.get("content"),
        author_id: row.get("author_id"),
        author_name: row.get("author_name"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<SignupOutcome> {
        let query = r"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email
        ";
        let row = sqlx::query(query)
            .bind(Uuid::new_v4())
            .bind(name)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", query))
            .await;

        match row {
            Ok(row) => Ok(SignupOutcome::Created(user_from_row(&row))),
            Err(err) if is_unique_violation(&err) => Ok(SignupOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert user"),
        }
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<CredentialRecord>> {
        let query = "SELECT id, name, email, password_hash FROM users WHERE lower(email) = lower($1)";
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to lookup credentials")?;

        Ok(row.map(|row| CredentialRecord {
            user: user_from_row(&row),
            password_hash: row.get("password_hash"),
        }))
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let query = "SELECT id, name, email FROM users WHERE id = $1";
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", query))
            .await
            .context("failed to lookup user")?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn insert_post(&self, author: &User, content: &str) -> Result<Post> {
        let query = format!(
            "INSERT INTO posts (id, content, author_id, author_name) VALUES ($1, $2, $3, $4) RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(content)
            .bind(author.id)
            .bind(&author.name)
            .fetch_one(&self.pool)
            .instrument(db_span("INSERT", &query))
            .await
            .context("failed to insert post")?;

        Ok(post_from_row(&row))
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await
            .context("failed to list posts")?;

        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(db_span("SELECT", &query))
            .await
            .context("failed to lookup post")?;

        Ok(row.as_ref().map(post_from_row))
    }

    async fn update_post(&self, id: Uuid, content: &str) -> Result<Option<Post>> {
        let query = format!(
            "UPDATE posts SET content = $2, updated_at = NOW() WHERE id = $1 RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(content)
            .fetch_optional(&self.pool)
            .instrument(db_span("UPDATE", &query))
            .await
            .context("failed to update post")?;

        Ok(row.as_ref().map(post_from_row))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool> {
        let query = "DELETE FROM posts WHERE id = $1";
        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(db_span("DELETE", query))
            .await
            .context("failed to delete post")?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<()> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("Failed to acquire database connection")?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("Failed to ping database")
    }
}

#[cfg(test)]
mod tests;
