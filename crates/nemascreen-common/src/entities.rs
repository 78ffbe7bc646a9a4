/// Core entity types for the screen database.
/// These are Rust representations of the PostgreSQL tables.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ImagesConfig;
use crate::tiles::well_to_tile;

/// Strain name of the wild-type control.
pub const CONTROL_STRAIN: &str = "N2";

/// Clone id of the empty-vector control.
pub const CONTROL_CLONE: &str = "L4440";

// ---------------------------------------------------------------------------
// Screen vocabulary
// ---------------------------------------------------------------------------

/// Which temperature extreme reveals the phenotype of interest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Screen {
    /// Suppressor screen, run at the strain's restrictive temperature.
    Sup,
    /// Enhancer screen, run at the strain's permissive temperature.
    Enh,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Sup => "SUP",
            Screen::Enh => "ENH",
        }
    }
}

impl std::str::FromStr for Screen {
    type Err = crate::error::NemascreenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SUP" => Ok(Screen::Sup),
            "ENH" => Ok(Screen::Enh),
            other => Err(crate::error::NemascreenError::Config(format!(
                "screen must be SUP or ENH, got {other}"
            ))),
        }
    }
}

/// Primary screens have two replicates per pairing; secondary screens many.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScreenStage {
    Primary = 1,
    Secondary = 2,
}

impl ScreenStage {
    pub fn as_i16(&self) -> i16 {
        match self {
            ScreenStage::Primary => 1,
            ScreenStage::Secondary => 2,
        }
    }
}

// ---------------------------------------------------------------------------
// Worm strain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WormStrain {
    /// Strain name, e.g. "TH48". Natural primary key.
    pub id: String,
    pub gene: Option<String>,
    pub allele: Option<String>,
    pub genotype: Option<String>,
    /// Temperature at which the enhancer phenotype is revealed.
    pub permissive_temperature: Option<f64>,
    /// Temperature at which the suppressor phenotype is revealed.
    pub restrictive_temperature: Option<f64>,
}

impl WormStrain {
    pub fn is_control(&self) -> bool {
        self.id == CONTROL_STRAIN
    }

    /// The temperature this strain is screened at for the given screen,
    /// if it participates in that screen at all.
    pub fn screen_temperature(&self, screen: Screen) -> Option<f64> {
        match screen {
            Screen::Sup => self.restrictive_temperature,
            Screen::Enh => self.permissive_temperature,
        }
    }

    /// Classify an experiment temperature as SUP or ENH for this strain.
    pub fn screen_for_temperature(&self, temperature: f64) -> Option<Screen> {
        if crate::comparison::floats_equal_opt(self.restrictive_temperature, Some(temperature)) {
            Some(Screen::Sup)
        } else if crate::comparison::floats_equal_opt(self.permissive_temperature, Some(temperature)) {
            Some(Screen::Enh)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// RNAi clone and library stocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Clone {
    /// Clone name, e.g. "sjj_AH6.4". Natural primary key.
    pub id: String,
    /// Gene the clone is intended to knock down.
    pub gene: Option<String>,
    pub functional_description: Option<String>,
}

impl Clone {
    pub fn is_control(&self) -> bool {
        self.id == CONTROL_CLONE
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LibraryPlate {
    /// Plate name, e.g. "II-3-B2". Natural primary key.
    pub id: String,
    pub screen_stage: Option<i16>,
    pub number_of_wells: i16,
}

/// One well of a library plate: a frozen stock of one clone.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LibraryStock {
    /// `<plate>_<well>`, e.g. "II-3-B2_A05".
    pub id: String,
    pub plate_id: String,
    pub well: String,
    pub intended_clone_id: Option<String>,
}

impl LibraryStock {
    pub fn stock_id(plate_id: &str, well: &str) -> String {
        format!("{plate_id}_{well}")
    }
}

// ---------------------------------------------------------------------------
// Experiments
// ---------------------------------------------------------------------------

/// A plate-level experiment.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ExperimentPlate {
    pub id: i64,
    pub screen_stage: i16,
    pub temperature: f64,
    pub date: NaiveDate,
    pub comment: String,
}

/// A well-level experiment: one biological replicate of a
/// strain x clone x temperature x date combination.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Experiment {
    /// `<plate_id>_<well>`, e.g. "32412_B05".
    pub id: String,
    pub plate_id: i64,
    pub well: String,
    pub worm_strain_id: String,
    pub library_stock_id: String,
    pub is_junk: bool,
}

/// Which rendition of a well image to link to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMode {
    Full,
    Thumbnail,
    Devstar,
}

impl Experiment {
    pub fn well_id(plate_id: i64, well: &str) -> String {
        format!("{plate_id}_{well}")
    }

    pub fn row(&self) -> char {
        self.well.chars().next().unwrap_or('?')
    }

    pub fn column(&self) -> u8 {
        self.well[1..].parse().unwrap_or(0)
    }

    pub fn tile(&self) -> crate::error::Result<String> {
        well_to_tile(&self.well)
    }

    /// URL of this well's image as saved by the microscope, a lower
    /// resolution copy, or the DevStaR overlay.
    pub fn image_url(&self, images: &ImagesConfig, mode: ImageMode) -> crate::error::Result<String> {
        let tile = well_to_tile(&self.well)?;
        Ok(match mode {
            ImageMode::Full => format!("{}/{}/{}.bmp", images.base_url, self.plate_id, tile),
            ImageMode::Thumbnail => {
                format!("{}/{}/{}.jpg", images.thumbnail_base_url, self.plate_id, tile)
            }
            ImageMode::Devstar => {
                format!("{}/{}/{}res.png", images.devstar_base_url, self.plate_id, tile)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Score codes and categories
// ---------------------------------------------------------------------------

/// Qualitative strength of an observed phenotype.
///
/// Relevance and strength do not always coincide: a Negative score is
/// more relevant than an Other score, since Negative means no genetic
/// interaction whereas Other may be any auxiliary score, such as an
/// experiment problem or an unrelated phenotype.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScoreCategory {
    Strong,
    Medium,
    Weak,
    Negative,
    Other,
}

impl ScoreCategory {
    /// Map a score code id to its general category.
    ///
    /// Ids outside the known sets (auxiliary codes for experiment
    /// problems and unrelated phenotypes) are Other.
    pub fn from_code(code: i32) -> Self {
        match code {
            3 | 14 | 18 => ScoreCategory::Strong,
            2 | 13 | 17 => ScoreCategory::Medium,
            1 | 12 | 16 => ScoreCategory::Weak,
            0 => ScoreCategory::Negative,
            _ => ScoreCategory::Other,
        }
    }

    /// Numeric weight used when averaging scores.
    pub fn weight(self) -> u32 {
        match self {
            ScoreCategory::Strong => 3,
            ScoreCategory::Medium => 2,
            ScoreCategory::Weak => 1,
            ScoreCategory::Negative | ScoreCategory::Other => 0,
        }
    }

    /// Rank within one replicate, least to most relevant:
    /// Other < Negative < Weak < Medium < Strong.
    pub fn relevance_per_replicate(self) -> u8 {
        match self {
            ScoreCategory::Other => 0,
            ScoreCategory::Negative => 1,
            ScoreCategory::Weak => 2,
            ScoreCategory::Medium => 3,
            ScoreCategory::Strong => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScoreCategory::Strong => "Strong",
            ScoreCategory::Medium => "Medium",
            ScoreCategory::Weak => "Weak",
            ScoreCategory::Negative => "Negative",
            ScoreCategory::Other => "Other",
        }
    }
}

/// A class of score that a human can assign to an image.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ScoreCode {
    pub id: i32,
    pub description: String,
    pub short_description: String,
    pub legacy_description: String,
}

impl ScoreCode {
    pub fn category(&self) -> ScoreCategory {
        ScoreCategory::from_code(self.id)
    }

    pub fn display_name(&self) -> &str {
        if !self.short_description.is_empty() {
            &self.short_description
        } else if !self.description.is_empty() {
            &self.description
        } else {
            &self.legacy_description
        }
    }
}

// ---------------------------------------------------------------------------
// Scores
// ---------------------------------------------------------------------------

/// A score assigned to a particular image by a human.
/// Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ManualScore {
    pub id: i64,
    pub experiment_id: String,
    pub score_code: i32,
    pub scorer_id: Uuid,
    pub timestamp: DateTime<Utc>,
}

impl ManualScore {
    pub fn category(&self) -> ScoreCategory {
        ScoreCategory::from_code(self.score_code)
    }

    pub fn weight(&self) -> u32 {
        self.category().weight()
    }
}

/// A human who scores images.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Scorer {
    pub id: Uuid,
    pub username: String,
}

/// Denominator for deriving an embryo count from the DevStaR embryo area.
const EMBRYO_AREA_PER_EMBRYO: i32 = 70;

/// Information about an image determined by the DevStaR program.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct DevstarScore {
    pub id: i64,
    pub experiment_id: String,

    // Raw program output
    pub area_adult: Option<i32>,
    pub area_larva: Option<i32>,
    pub area_embryo: Option<i32>,
    pub count_adult: Option<i32>,
    pub count_larva: Option<i32>,
    pub is_bacteria_present: Option<bool>,

    // Derived fields, see compute_derived
    pub count_embryo: Option<i32>,
    pub larva_per_adult: Option<f64>,
    pub embryo_per_adult: Option<f64>,
    pub survival: Option<f64>,
    pub lethality: Option<f64>,

    pub selected_for_scoring: Option<bool>,
    pub gi_score: Option<f64>,
}

impl DevstarScore {
    /// Set the fields derived from the raw DevStaR output.
    ///
    /// Embryo counts come from area (floor division); per-adult ratios
    /// are undefined for zero adults, and survival/lethality are
    /// undefined for an empty brood.
    pub fn compute_derived(&mut self) {
        if let Some(area) = self.area_embryo {
            self.count_embryo = Some(area / EMBRYO_AREA_PER_EMBRYO);
        }

        if let (Some(larva), Some(adult)) = (self.count_larva, self.count_adult) {
            self.larva_per_adult = if adult == 0 {
                None
            } else {
                Some(f64::from(larva) / f64::from(adult))
            };
        }

        if let (Some(embryo), Some(adult)) = (self.count_embryo, self.count_adult) {
            self.embryo_per_adult = if adult == 0 {
                None
            } else {
                Some(f64::from(embryo) / f64::from(adult))
            };
        }

        if let (Some(embryo), Some(larva)) = (self.count_embryo, self.count_larva) {
            let brood_size = larva + embryo;
            if brood_size == 0 {
                self.survival = None;
                self.lethality = None;
            } else {
                self.survival = Some(f64::from(larva) / f64::from(brood_size));
                self.lethality = Some(f64::from(embryo) / f64::from(brood_size));
            }
        }
    }

    /// Whether the raw program-output fields agree with another record.
    pub fn matches_raw_fields(&self, other: &DevstarScore) -> bool {
        self.experiment_id == other.experiment_id
            && self.is_bacteria_present == other.is_bacteria_present
            && self.area_adult == other.area_adult
            && self.area_larva == other.area_larva
            && self.area_embryo == other.area_embryo
            && self.count_adult == other.count_adult
            && self.count_larva == other.count_larva
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code_known_sets() {
        assert_eq!(ScoreCategory::from_code(3), ScoreCategory::Strong);
        assert_eq!(ScoreCategory::from_code(14), ScoreCategory::Strong);
        assert_eq!(ScoreCategory::from_code(18), ScoreCategory::Strong);
        assert_eq!(ScoreCategory::from_code(2), ScoreCategory::Medium);
        assert_eq!(ScoreCategory::from_code(13), ScoreCategory::Medium);
        assert_eq!(ScoreCategory::from_code(17), ScoreCategory::Medium);
        assert_eq!(ScoreCategory::from_code(1), ScoreCategory::Weak);
        assert_eq!(ScoreCategory::from_code(12), ScoreCategory::Weak);
        assert_eq!(ScoreCategory::from_code(16), ScoreCategory::Weak);
        assert_eq!(ScoreCategory::from_code(0), ScoreCategory::Negative);
    }

    #[test]
    fn test_category_from_code_auxiliary_is_other() {
        for code in [-7, -4, -3, -2, 7, 8, 10, 11, 20, 30, 47] {
            assert_eq!(ScoreCategory::from_code(code), ScoreCategory::Other);
        }
    }

    #[test]
    fn test_per_replicate_relevance_order() {
        let order = [
            ScoreCategory::Other,
            ScoreCategory::Negative,
            ScoreCategory::Weak,
            ScoreCategory::Medium,
            ScoreCategory::Strong,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].relevance_per_replicate() < pair[1].relevance_per_replicate());
        }
    }

    #[test]
    fn test_devstar_derived_fields() {
        let mut score = DevstarScore {
            experiment_id: "1_A01".into(),
            area_embryo: Some(700),
            count_adult: Some(5),
            count_larva: Some(40),
            ..Default::default()
        };
        score.compute_derived();
        assert_eq!(score.count_embryo, Some(10));
        assert_eq!(score.larva_per_adult, Some(8.0));
        assert_eq!(score.embryo_per_adult, Some(2.0));
        assert_eq!(score.survival, Some(0.8));
        assert_eq!(score.lethality, Some(0.2));
    }

    #[test]
    fn test_devstar_zero_adults_and_empty_brood() {
        let mut score = DevstarScore {
            experiment_id: "1_A01".into(),
            area_embryo: Some(0),
            count_adult: Some(0),
            count_larva: Some(0),
            ..Default::default()
        };
        score.compute_derived();
        assert_eq!(score.count_embryo, Some(0));
        assert_eq!(score.larva_per_adult, None);
        assert_eq!(score.embryo_per_adult, None);
        assert_eq!(score.survival, None);
        assert_eq!(score.lethality, None);
    }

    #[test]
    fn test_screen_for_temperature() {
        let strain = WormStrain {
            id: "TH48".into(),
            gene: Some("mbk-2".into()),
            allele: Some("dd5".into()),
            genotype: None,
            permissive_temperature: Some(15.0),
            restrictive_temperature: Some(22.5),
        };
        assert_eq!(strain.screen_for_temperature(22.5), Some(Screen::Sup));
        assert_eq!(strain.screen_for_temperature(15.0), Some(Screen::Enh));
        assert_eq!(strain.screen_for_temperature(20.0), None);
    }

    #[test]
    fn test_experiment_well_id() {
        assert_eq!(Experiment::well_id(1234, "B05"), "1234_B05");
    }

    #[test]
    fn test_library_stock_id() {
        assert_eq!(LibraryStock::stock_id("II-3-B2", "A05"), "II-3-B2_A05");
    }
}
