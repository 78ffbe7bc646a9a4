//! Worm strain repository.

use nemascreen_common::entities::{Screen, WormStrain};
use nemascreen_common::error::Result;
use sqlx::PgPool;

#[derive(Clone)]
pub struct StrainRepository {
    pool: PgPool,
}

impl StrainRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<WormStrain>> {
        let strains = sqlx::query_as::<_, WormStrain>(
            "SELECT * FROM worm_strains ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(strains)
    }

    pub async fn get(&self, id: &str) -> Result<Option<WormStrain>> {
        let strain = sqlx::query_as::<_, WormStrain>(
            "SELECT * FROM worm_strains WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(strain)
    }

    pub async fn insert(&self, strain: &WormStrain) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO worm_strains
                (id, gene, allele, genotype, permissive_temperature, restrictive_temperature)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&strain.id)
        .bind(&strain.gene)
        .bind(&strain.allele)
        .bind(&strain.genotype)
        .bind(strain.permissive_temperature)
        .bind(strain.restrictive_temperature)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Strains that participate in the given screen, i.e. have the
    /// relevant extreme temperature recorded.
    pub async fn for_screen(&self, screen: Screen) -> Result<Vec<WormStrain>> {
        let column = match screen {
            Screen::Sup => "restrictive_temperature",
            Screen::Enh => "permissive_temperature",
        };

        let strains = sqlx::query_as::<_, WormStrain>(&format!(
            "SELECT * FROM worm_strains WHERE {column} IS NOT NULL ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(strains)
    }

    pub async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM worm_strains")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}
