//! Experiment plate and well repository.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use nemascreen_common::comparison::closest_candidate;
use nemascreen_common::entities::{
    Experiment, ExperimentPlate, LibraryStock, Screen,
};
use nemascreen_common::error::{NemascreenError, Result};
use nemascreen_common::serde_helpers::empty_as_none;
use nemascreen_common::wells::well_list_96;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

/// Caps the result size of filter queries.
const MAX_PER_PAGE: i64 = 500;

/// Parameters for filtering experiment wells. Every field is optional;
/// only the present ones become WHERE clauses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExperimentFilter {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub plate: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub plate_gte: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub plate_lte: Option<i64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub well: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub worm_strain: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub worm_gene: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub worm_allele: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub temperature_gte: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub temperature_lte: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_gte: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub date_lte: Option<NaiveDate>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub library_plate: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub screen_stage: Option<i16>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub is_junk: Option<bool>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page: Option<i64>,
}

impl ExperimentFilter {
    /// Whether any filtering field (not just pagination) is set.
    pub fn has_criteria(&self) -> bool {
        self.plate.is_some()
            || self.plate_gte.is_some()
            || self.plate_lte.is_some()
            || self.well.is_some()
            || self.worm_strain.is_some()
            || self.worm_gene.is_some()
            || self.worm_allele.is_some()
            || self.temperature.is_some()
            || self.temperature_gte.is_some()
            || self.temperature_lte.is_some()
            || self.date.is_some()
            || self.date_gte.is_some()
            || self.date_lte.is_some()
            || self.library_plate.is_some()
            || self.screen_stage.is_some()
            || self.is_junk.is_some()
    }
}

/// An experiment well joined with its plate-level context.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ExperimentWellRow {
    pub id: String,
    pub plate_id: i64,
    pub well: String,
    pub worm_strain_id: String,
    pub library_stock_id: String,
    pub is_junk: bool,
    pub screen_stage: i16,
    pub temperature: f64,
    pub date: NaiveDate,
}

/// Fields for a plate about to be created.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExperimentPlate {
    pub id: i64,
    pub screen_stage: i16,
    pub temperature: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub comment: String,
}

#[derive(Clone)]
pub struct ExperimentRepository {
    pool: PgPool,
}

impl ExperimentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn filtered_wells_query(filter: &ExperimentFilter) -> QueryBuilder<'_, Postgres> {
        let mut qb = QueryBuilder::new(
            "SELECT e.id, e.plate_id, e.well, e.worm_strain_id, e.library_stock_id, e.is_junk, \
             p.screen_stage, p.temperature, p.date \
             FROM experiments e \
             JOIN experiment_plates p ON p.id = e.plate_id \
             JOIN worm_strains w ON w.id = e.worm_strain_id \
             JOIN library_stocks ls ON ls.id = e.library_stock_id \
             WHERE 1 = 1",
        );

        if let Some(plate) = filter.plate {
            qb.push(" AND e.plate_id = ").push_bind(plate);
        }
        if let Some(plate) = filter.plate_gte {
            qb.push(" AND e.plate_id >= ").push_bind(plate);
        }
        if let Some(plate) = filter.plate_lte {
            qb.push(" AND e.plate_id <= ").push_bind(plate);
        }
        if let Some(well) = &filter.well {
            qb.push(" AND e.well = ").push_bind(well.as_str());
        }
        if let Some(strain) = &filter.worm_strain {
            qb.push(" AND e.worm_strain_id = ").push_bind(strain.as_str());
        }
        if let Some(gene) = &filter.worm_gene {
            qb.push(" AND w.gene = ").push_bind(gene.as_str());
        }
        if let Some(allele) = &filter.worm_allele {
            qb.push(" AND w.allele = ").push_bind(allele.as_str());
        }
        if let Some(temperature) = filter.temperature {
            qb.push(" AND p.temperature = ").push_bind(temperature);
        }
        if let Some(temperature) = filter.temperature_gte {
            qb.push(" AND p.temperature >= ").push_bind(temperature);
        }
        if let Some(temperature) = filter.temperature_lte {
            qb.push(" AND p.temperature <= ").push_bind(temperature);
        }
        if let Some(date) = filter.date {
            qb.push(" AND p.date = ").push_bind(date);
        }
        if let Some(date) = filter.date_gte {
            qb.push(" AND p.date >= ").push_bind(date);
        }
        if let Some(date) = filter.date_lte {
            qb.push(" AND p.date <= ").push_bind(date);
        }
        if let Some(plate) = &filter.library_plate {
            qb.push(" AND ls.plate_id = ").push_bind(plate.as_str());
        }
        if let Some(stage) = filter.screen_stage {
            qb.push(" AND p.screen_stage = ").push_bind(stage);
        }
        if let Some(is_junk) = filter.is_junk {
            qb.push(" AND e.is_junk = ").push_bind(is_junk);
        }

        qb
    }

    /// Experiment wells matching the filter, ordered by plate and well.
    /// Results are paged; per_page is capped.
    pub async fn filter(
        &self,
        filter: &ExperimentFilter,
        per_page: i64,
    ) -> Result<Vec<ExperimentWellRow>> {
        let mut qb = Self::filtered_wells_query(filter);

        let limit = per_page.clamp(1, MAX_PER_PAGE);
        let offset = (filter.page.unwrap_or(1).max(1) - 1) * limit;

        qb.push(" ORDER BY e.plate_id, e.well");
        qb.push(" LIMIT ").push_bind(limit);
        qb.push(" OFFSET ").push_bind(offset);

        let rows = qb
            .build_query_as::<ExperimentWellRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    pub async fn get_plate(&self, id: i64) -> Result<Option<ExperimentPlate>> {
        let plate = sqlx::query_as::<_, ExperimentPlate>(
            "SELECT * FROM experiment_plates WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plate)
    }

    pub async fn get_well(&self, id: &str) -> Result<Option<ExperimentWellRow>> {
        let row = sqlx::query_as::<_, ExperimentWellRow>(
            r#"
            SELECT e.id, e.plate_id, e.well, e.worm_strain_id, e.library_stock_id, e.is_junk,
                   p.screen_stage, p.temperature, p.date
            FROM experiments e
            JOIN experiment_plates p ON p.id = e.plate_id
            WHERE e.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// The experiment wells of a plate, ordered by well.
    pub async fn wells_for_plate(&self, plate_id: i64) -> Result<Vec<Experiment>> {
        let wells = sqlx::query_as::<_, Experiment>(
            "SELECT * FROM experiments WHERE plate_id = $1 ORDER BY well",
        )
        .bind(plate_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(wells)
    }

    /// Create a new experiment plate plus its 96 wells.
    ///
    /// Assumes the plate holds one worm strain throughout and is derived
    /// from one library plate, whose stocks are supplied keyed by well.
    pub async fn create_plate_and_wells(
        &self,
        plate: &NewExperimentPlate,
        worm_strain_id: &str,
        stocks_by_well: &BTreeMap<String, LibraryStock>,
        is_junk: bool,
    ) -> Result<(ExperimentPlate, Vec<Experiment>)> {
        if self.get_plate(plate.id).await?.is_some() {
            return Err(NemascreenError::PlateExists(plate.id));
        }

        let mut wells = Vec::with_capacity(96);
        for well in well_list_96() {
            let stock = stocks_by_well.get(&well).ok_or_else(|| {
                NemascreenError::NotFound(format!("library stock for well {well}"))
            })?;

            wells.push(Experiment {
                id: Experiment::well_id(plate.id, &well),
                plate_id: plate.id,
                well,
                worm_strain_id: worm_strain_id.to_string(),
                library_stock_id: stock.id.clone(),
                is_junk,
            });
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO experiment_plates (id, screen_stage, temperature, date, comment)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(plate.id)
        .bind(plate.screen_stage)
        .bind(plate.temperature)
        .bind(plate.date)
        .bind(&plate.comment)
        .execute(&mut *tx)
        .await?;

        for well in &wells {
            sqlx::query(
                r#"
                INSERT INTO experiments
                    (id, plate_id, well, worm_strain_id, library_stock_id, is_junk)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(&well.id)
            .bind(well.plate_id)
            .bind(&well.well)
            .bind(&well.worm_strain_id)
            .bind(&well.library_stock_id)
            .bind(well.is_junk)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(plate = plate.id, strain = worm_strain_id, "created experiment plate");

        let created = ExperimentPlate {
            id: plate.id,
            screen_stage: plate.screen_stage,
            temperature: plate.temperature,
            date: plate.date,
            comment: plate.comment.clone(),
        };

        Ok((created, wells))
    }

    /// Flip one well's junk flag; returns the new value.
    pub async fn toggle_junk(&self, well_id: &str) -> Result<bool> {
        let (is_junk,): (bool,) = sqlx::query_as(
            "UPDATE experiments SET is_junk = NOT is_junk WHERE id = $1 RETURNING is_junk",
        )
        .bind(well_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| NemascreenError::NotFound(format!("experiment {well_id}")))?;

        Ok(is_junk)
    }

    /// Set the junk flag for all wells of a plate.
    pub async fn set_plate_junk(&self, plate_id: i64, is_junk: bool) -> Result<u64> {
        let result = sqlx::query("UPDATE experiments SET is_junk = $2 WHERE plate_id = $1")
            .bind(plate_id)
            .bind(is_junk)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// All temperatures at which experiments have been run.
    pub async fn distinct_temperatures(&self) -> Result<Vec<f64>> {
        let rows: Vec<(f64,)> = sqlx::query_as(
            "SELECT DISTINCT temperature FROM experiment_plates ORDER BY temperature",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(t,)| t).collect())
    }

    pub async fn distinct_dates(&self) -> Result<Vec<NaiveDate>> {
        let rows: Vec<(NaiveDate,)> = sqlx::query_as(
            "SELECT DISTINCT date FROM experiment_plates ORDER BY date",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(d,)| d).collect())
    }

    /// The tested temperature closest to the goal, if any experiments
    /// exist at all.
    pub async fn closest_temperature(&self, goal: f64) -> Result<Option<f64>> {
        let temperatures = self.distinct_temperatures().await?;
        Ok(closest_candidate(goal, temperatures))
    }

    /// Primary experiments that are their strain's only replicate for a
    /// library plate, at the strain's screen temperature.
    ///
    /// Most genes had two primary replicates; the ones that had just one
    /// get special treatment in the enhancer secondary selection.
    pub async fn single_replicate_experiments(&self, screen: Screen) -> Result<HashSet<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT e.id
            FROM experiments e
            JOIN experiment_plates p ON p.id = e.plate_id
            JOIN worm_strains w ON w.id = e.worm_strain_id
            JOIN library_stocks ls ON ls.id = e.library_stock_id
            JOIN (
                SELECT e2.worm_strain_id, ls2.plate_id AS library_plate_id
                FROM experiments e2
                JOIN experiment_plates p2 ON p2.id = e2.plate_id
                JOIN worm_strains w2 ON w2.id = e2.worm_strain_id
                JOIN library_stocks ls2 ON ls2.id = e2.library_stock_id
                WHERE p2.screen_stage = 1
                  AND e2.is_junk = FALSE
                  AND p2.temperature = CASE WHEN $1 = 'SUP'
                        THEN w2.restrictive_temperature
                        ELSE w2.permissive_temperature END
                GROUP BY e2.worm_strain_id, ls2.plate_id
                HAVING COUNT(DISTINCT e2.plate_id) = 1
            ) singles ON singles.worm_strain_id = e.worm_strain_id
                     AND singles.library_plate_id = ls.plate_id
            WHERE p.screen_stage = 1
              AND e.is_junk = FALSE
              AND p.temperature = CASE WHEN $1 = 'SUP'
                    THEN w.restrictive_temperature
                    ELSE w.permissive_temperature END
            "#,
        )
        .bind(screen.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn count_plates(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM experiment_plates")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_builds_only_present_clauses() {
        let filter = ExperimentFilter {
            worm_strain: Some("TH48".to_string()),
            temperature_gte: Some(20.0),
            is_junk: Some(false),
            ..Default::default()
        };

        let sql = ExperimentRepository::filtered_wells_query(&filter).into_sql();

        assert!(sql.contains("e.worm_strain_id ="));
        assert!(sql.contains("p.temperature >="));
        assert!(sql.contains("e.is_junk ="));
        assert!(!sql.contains("AND p.date"));
        assert!(!sql.contains("w.gene"));
    }

    #[test]
    fn test_empty_filter_has_no_criteria() {
        let filter = ExperimentFilter::default();
        assert!(!filter.has_criteria());

        let sql = ExperimentRepository::filtered_wells_query(&filter).into_sql();
        assert!(sql.trim_end().ends_with("WHERE 1 = 1"));
    }

    #[test]
    fn test_blank_form_fields_deserialize_as_none() {
        let filter: ExperimentFilter = serde_json::from_str(
            r#"{"plate": "", "worm_strain": "TH48", "temperature_gte": "20", "date": "2015-09-25"}"#,
        )
        .unwrap();

        assert_eq!(filter.plate, None);
        assert_eq!(filter.worm_strain.as_deref(), Some("TH48"));
        assert_eq!(filter.temperature_gte, Some(20.0));
        assert_eq!(filter.date, NaiveDate::from_ymd_opt(2015, 9, 25));
    }

    #[test]
    fn test_pagination_filter_alone_is_not_criteria() {
        let filter = ExperimentFilter {
            page: Some(3),
            ..Default::default()
        };
        assert!(!filter.has_criteria());
    }
}
