//! Bucket layout of public Landsat and Sentinel-2 scenes.
//!
//! Object paths are derived from positional substrings of the product
//! identifier:
//!
//! ```text
//! LC08_L1TP_174021_20190623_20190704_01_T1
//!           ^^^ ^^^
//!          path row  -> gcp-public-data-landsat/LC08/01/174/021/<id>/
//!
//! S2A_MSIL1C_20190626T083601_N0207_R064_T37VCD_20190626T104222
//!                                        ^^ ^^^
//!                                   zone  lat-band + square
//!                -> gcp-public-data-sentinel-2/tiles/37/V/CD/<id>.SAFE/
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{CatalogError, CatalogResult};

const LANDSAT_BUCKET: &str = "gcp-public-data-landsat";
const SENTINEL_2_BUCKET: &str = "gcp-public-data-sentinel-2";

/// Sentinel-2 processing level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessingLevel {
    L1C,
    L2A,
}

impl ProcessingLevel {
    /// Product metadata file inside the `.SAFE` directory.
    pub fn metadata_file(self) -> &'static str {
        match self {
            ProcessingLevel::L1C => "MTD_MSIL1C.xml",
            ProcessingLevel::L2A => "MTD_MSIL2A.xml",
        }
    }

    fn tiles_root(self) -> &'static str {
        match self {
            ProcessingLevel::L1C => "tiles",
            ProcessingLevel::L2A => "L2/tiles",
        }
    }
}

/// Where a scene lives in the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SceneLocation {
    Landsat {
        /// Sensor folder, the first four characters of the identifier.
        sensor: String,
        path: String,
        row: String,
    },
    Sentinel2 {
        level: ProcessingLevel,
        utm_zone: String,
        latitude_band: String,
        grid_square: String,
    },
}

impl SceneLocation {
    /// Decomposes a Landsat product identifier.
    pub fn landsat(identifier: &str) -> CatalogResult<Self> {
        let caps = landsat_pattern().captures(identifier).ok_or_else(|| {
            CatalogError::InvalidIdentifier(format!(
                "{} does not carry a numeric path/row block",
                identifier
            ))
        })?;

        Ok(SceneLocation::Landsat {
            sensor: caps[1].to_string(),
            path: caps[2].to_string(),
            row: caps[3].to_string(),
        })
    }

    /// Decomposes a Sentinel-2 product name.
    pub fn sentinel2(identifier: &str, level: ProcessingLevel) -> CatalogResult<Self> {
        let caps = sentinel2_pattern().captures(identifier).ok_or_else(|| {
            CatalogError::InvalidIdentifier(format!("{} does not carry a tile block", identifier))
        })?;

        Ok(SceneLocation::Sentinel2 {
            level,
            utm_zone: caps[1].to_string(),
            latitude_band: caps[2].to_string(),
            grid_square: caps[3].to_string(),
        })
    }

    /// URL of the scene's directory, without trailing slash.
    pub fn scene_url(&self, base_url: &str, identifier: &str) -> String {
        match self {
            SceneLocation::Landsat { sensor, path, row } => format!(
                "{}/{}/{}/01/{}/{}/{}",
                base_url, LANDSAT_BUCKET, sensor, path, row, identifier
            ),
            SceneLocation::Sentinel2 {
                level,
                utm_zone,
                latitude_band,
                grid_square,
            } => format!(
                "{}/{}/{}/{}/{}/{}/{}.SAFE",
                base_url,
                SENTINEL_2_BUCKET,
                level.tiles_root(),
                utm_zone,
                latitude_band,
                grid_square,
                identifier
            ),
        }
    }
}

/// `<sensor>_<level>_<path><row>_...`, e.g. `LC08_L1TP_174021_...`.
fn landsat_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([A-Z0-9]{4})_[A-Z0-9]+_(\d{3})(\d{3})").unwrap())
}

/// Sixth underscore field `T<zone><band><square>`, e.g. `T37VCD`.
fn sentinel2_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:[A-Z0-9]+_){5}T(\d{2})([A-Z])([A-Z]{2})(?:_|$)").unwrap()
    })
}

/// Band labels available per platform, in download order.
pub(crate) fn bands_for(platform: &str) -> &'static [&'static str] {
    match platform {
        "LANDSAT_8_C1" => &["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "QA"],
        "LANDSAT_ETM_C1" => &["1", "2", "3", "4", "5", "6_VCID_1", "6_VCID_2", "7", "8", "QA"],
        "LANDSAT_TM_C1" => &["1", "2", "3", "4", "5", "6", "7", "QA"],
        "SENTINEL_2_L1C" => &["1", "2", "3", "4", "5", "6", "7", "8", "8A", "9", "10", "11", "12"],
        "SENTINEL_2_L2A" => &["1", "2", "3", "4", "5", "6", "7", "8", "8A", "9", "11", "12"],
        _ => &[],
    }
}

/// Canonical form of a user-supplied band label: `"04"` is `"4"`, `"8a"` is `"8A"`.
pub(crate) fn normalize_band(band: &str) -> String {
    let upper = band.trim().to_ascii_uppercase();
    let stripped = upper.trim_start_matches('0');
    if stripped.is_empty() || !stripped.starts_with(|c: char| c.is_ascii_digit()) {
        upper
    } else {
        stripped.to_string()
    }
}
