//! Library plate and stock repository.

use std::collections::BTreeMap;

use nemascreen_common::entities::{LibraryPlate, LibraryStock};
use nemascreen_common::error::Result;
use sqlx::PgPool;

#[derive(Clone)]
pub struct LibraryRepository {
    pool: PgPool,
}

impl LibraryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn plates(&self) -> Result<Vec<LibraryPlate>> {
        let plates = sqlx::query_as::<_, LibraryPlate>(
            "SELECT * FROM library_plates ORDER BY screen_stage, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(plates)
    }

    pub async fn get_plate(&self, id: &str) -> Result<Option<LibraryPlate>> {
        let plate = sqlx::query_as::<_, LibraryPlate>(
            "SELECT * FROM library_plates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plate)
    }

    pub async fn stocks_for_plate(&self, plate_id: &str) -> Result<Vec<LibraryStock>> {
        let stocks = sqlx::query_as::<_, LibraryStock>(
            "SELECT * FROM library_stocks WHERE plate_id = $1 ORDER BY well",
        )
        .bind(plate_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stocks)
    }

    /// Stocks of a plate keyed by well, for filling experiment plates.
    pub async fn stocks_by_well(&self, plate_id: &str) -> Result<BTreeMap<String, LibraryStock>> {
        let stocks = self.stocks_for_plate(plate_id).await?;

        Ok(stocks
            .into_iter()
            .map(|stock| (stock.well.clone(), stock))
            .collect())
    }

    pub async fn get_stock(&self, id: &str) -> Result<Option<LibraryStock>> {
        let stock = sqlx::query_as::<_, LibraryStock>(
            "SELECT * FROM library_stocks WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stock)
    }

    pub async fn count_stocks(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM library_stocks")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}
