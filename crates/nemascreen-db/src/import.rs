//! CSV importers for DevStaR output and clone annotations.

use std::path::Path;

use nemascreen_common::entities::{Clone as CloneEntity, DevstarScore, Experiment};
use nemascreen_common::error::Result;
use serde::Deserialize;
use tracing::{info, warn};

use crate::clones::CloneRepository;
use crate::database::Database;
use crate::scores::ScoreRepository;

/// One line of a DevStaR count export.
#[derive(Debug, Deserialize)]
struct DevstarRecord {
    plate: i64,
    well: String,
    area_adult: Option<i32>,
    area_larva: Option<i32>,
    area_embryo: Option<i32>,
    count_adult: Option<i32>,
    count_larva: Option<i32>,
    is_bacteria_present: Option<bool>,
}

/// Import DevStaR raw counts from a CSV file with header
/// plate,well,area_adult,area_larva,area_embryo,count_adult,count_larva,is_bacteria_present.
///
/// Derived fields are computed before insert. Returns the number of
/// rows imported.
pub async fn import_devstar_counts(db: &Database, path: &Path) -> Result<u64> {
    let scores = ScoreRepository::new(db.pool().clone());
    let mut reader = csv::Reader::from_path(path)?;
    let mut imported = 0u64;

    for record in reader.deserialize() {
        let record: DevstarRecord = record?;

        let mut score = DevstarScore {
            experiment_id: Experiment::well_id(record.plate, &record.well),
            area_adult: record.area_adult,
            area_larva: record.area_larva,
            area_embryo: record.area_embryo,
            count_adult: record.count_adult,
            count_larva: record.count_larva,
            is_bacteria_present: record.is_bacteria_present,
            ..Default::default()
        };
        score.compute_derived();

        // Re-running an export must not duplicate rows.
        let existing = scores.devstar_for_experiment(&score.experiment_id).await?;
        if existing.iter().any(|e| e.matches_raw_fields(&score)) {
            warn!(experiment = %score.experiment_id, "duplicate DevStaR row skipped");
            continue;
        }

        scores.insert_devstar(&score).await?;
        imported += 1;
    }

    info!(imported, file = %path.display(), "imported DevStaR counts");
    Ok(imported)
}

/// One line of a clone annotation export.
#[derive(Debug, Deserialize)]
struct AnnotationRecord {
    clone: String,
    functional_description: String,
}

/// Import gene functional descriptions from a CSV file with header
/// clone,functional_description. Clones not yet in the database are
/// created. Returns the number of clones touched.
pub async fn import_functional_descriptions(db: &Database, path: &Path) -> Result<u64> {
    let clones = CloneRepository::new(db.pool().clone());
    let mut reader = csv::Reader::from_path(path)?;
    let mut updated = 0u64;

    for record in reader.deserialize() {
        let record: AnnotationRecord = record?;

        if !clones
            .set_functional_description(&record.clone, &record.functional_description)
            .await?
        {
            warn!(clone = %record.clone, "annotation for unknown clone, creating it");
            clones
                .insert(&CloneEntity {
                    id: record.clone,
                    gene: None,
                    functional_description: Some(record.functional_description),
                })
                .await?;
        }
        updated += 1;
    }

    info!(updated, file = %path.display(), "imported functional descriptions");
    Ok(updated)
}
