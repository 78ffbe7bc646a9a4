//! Manual and DevStaR score repository.

use chrono::{DateTime, Utc};
use nemascreen_common::entities::{
    DevstarScore, ManualScore, Screen, ScoreCode, Scorer, ScreenStage, WormStrain,
};
use nemascreen_common::error::{NemascreenError, Result};
use nemascreen_scoring::organize::ScoreRow;
use sqlx::PgPool;
use uuid::Uuid;

/// A manual score joined with the library stock of its experiment well,
/// as needed to organize scores for classification.
#[derive(Debug, Clone, sqlx::FromRow)]
struct ScreenScoreRecord {
    id: i64,
    experiment_id: String,
    score_code: i32,
    scorer_id: Uuid,
    timestamp: DateTime<Utc>,
    library_stock_id: String,
}

impl From<ScreenScoreRecord> for ScoreRow {
    fn from(record: ScreenScoreRecord) -> Self {
        ScoreRow {
            library_stock_id: record.library_stock_id,
            score: ManualScore {
                id: record.id,
                experiment_id: record.experiment_id,
                score_code: record.score_code,
                scorer_id: record.scorer_id,
                timestamp: record.timestamp,
            },
        }
    }
}

#[derive(Clone)]
pub struct ScoreRepository {
    pool: PgPool,
}

impl ScoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn score_codes(&self) -> Result<Vec<ScoreCode>> {
        let codes = sqlx::query_as::<_, ScoreCode>("SELECT * FROM score_codes ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(codes)
    }

    pub async fn get_scorer(&self, username: &str) -> Result<Option<Scorer>> {
        let scorer = sqlx::query_as::<_, Scorer>("SELECT * FROM scorers WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(scorer)
    }

    /// Record a manual score against an experiment well.
    pub async fn insert_manual(
        &self,
        experiment_id: &str,
        score_code: i32,
        scorer_id: Uuid,
    ) -> Result<ManualScore> {
        let score = sqlx::query_as::<_, ManualScore>(
            r#"
            INSERT INTO manual_scores (experiment_id, score_code, scorer_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(experiment_id)
        .bind(score_code)
        .bind(scorer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(score)
    }

    /// All manual scores for one experiment well.
    pub async fn manual_for_experiment(&self, experiment_id: &str) -> Result<Vec<ManualScore>> {
        let scores = sqlx::query_as::<_, ManualScore>(
            r#"
            SELECT * FROM manual_scores
            WHERE experiment_id = $1
            ORDER BY scorer_id, timestamp, score_code
            "#,
        )
        .bind(experiment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(scores)
    }

    /// All manual scores for one strain's screen at one stage, with the
    /// stock context needed to organize them. Junk wells are excluded,
    /// and only experiments at the strain's screen temperature count.
    pub async fn screen_score_rows(
        &self,
        strain: &WormStrain,
        screen: Screen,
        stage: ScreenStage,
    ) -> Result<Vec<ScoreRow>> {
        let temperature = strain.screen_temperature(screen).ok_or_else(|| {
            NemascreenError::NotFound(format!(
                "{} temperature for strain {}",
                screen.as_str(),
                strain.id
            ))
        })?;

        let records = sqlx::query_as::<_, ScreenScoreRecord>(
            r#"
            SELECT m.id, m.experiment_id, m.score_code, m.scorer_id, m.timestamp,
                   e.library_stock_id
            FROM manual_scores m
            JOIN experiments e ON e.id = m.experiment_id
            JOIN experiment_plates p ON p.id = e.plate_id
            WHERE e.worm_strain_id = $1
              AND e.is_junk = FALSE
              AND p.screen_stage = $2
              AND p.temperature = $3
            ORDER BY e.plate_id, e.well
            "#,
        )
        .bind(&strain.id)
        .bind(stage.as_i16())
        .bind(temperature)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(ScoreRow::from).collect())
    }

    pub async fn insert_devstar(&self, score: &DevstarScore) -> Result<i64> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO devstar_scores
                (experiment_id, area_adult, area_larva, area_embryo,
                 count_adult, count_larva, is_bacteria_present,
                 count_embryo, larva_per_adult, embryo_per_adult,
                 survival, lethality, selected_for_scoring, gi_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING id
            "#,
        )
        .bind(&score.experiment_id)
        .bind(score.area_adult)
        .bind(score.area_larva)
        .bind(score.area_embryo)
        .bind(score.count_adult)
        .bind(score.count_larva)
        .bind(score.is_bacteria_present)
        .bind(score.count_embryo)
        .bind(score.larva_per_adult)
        .bind(score.embryo_per_adult)
        .bind(score.survival)
        .bind(score.lethality)
        .bind(score.selected_for_scoring)
        .bind(score.gi_score)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn devstar_for_experiment(&self, experiment_id: &str) -> Result<Vec<DevstarScore>> {
        let scores = sqlx::query_as::<_, DevstarScore>(
            "SELECT * FROM devstar_scores WHERE experiment_id = $1 ORDER BY id",
        )
        .bind(experiment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(scores)
    }

    pub async fn count_manual(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM manual_scores")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    pub async fn count_devstar(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM devstar_scores")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}
