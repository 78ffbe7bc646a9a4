//! RNAi clone repository.

use nemascreen_common::entities::Clone;
use nemascreen_common::error::Result;
use sqlx::PgPool;

#[derive(Clone)]
pub struct CloneRepository {
    pool: PgPool,
}

impl CloneRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Clone>> {
        let clone = sqlx::query_as::<_, Clone>("SELECT * FROM clones WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(clone)
    }

    /// Clones whose id or target gene contains the query substring.
    pub async fn search(&self, query: &str, limit: i64) -> Result<Vec<Clone>> {
        let pattern = format!("%{query}%");
        let clones = sqlx::query_as::<_, Clone>(
            r#"
            SELECT * FROM clones
            WHERE id ILIKE $1 OR gene ILIKE $1
            ORDER BY id
            LIMIT $2
            "#,
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(clones)
    }

    pub async fn insert(&self, clone: &Clone) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO clones (id, gene, functional_description)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&clone.id)
        .bind(&clone.gene)
        .bind(&clone.functional_description)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Attach a gene functional description to a clone, e.g. from the
    /// annotation import.
    pub async fn set_functional_description(&self, id: &str, description: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE clones SET functional_description = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(description)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM clones")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}
