//! Sentinel-2 product metadata: image file discovery.

use roxmltree::Document;

use super::layout::ProcessingLevel;
use crate::error::{CatalogError, CatalogResult};

/// Cloud-probability mask inside a granule's `QI_DATA` directory.
const CLOUD_MASK_FILE: &str = "QI_DATA/MSK_CLDPRB_60m.jp2";

/// Image paths declared by `MTD_MSIL1C.xml` / `MTD_MSIL2A.xml`, relative to
/// the `.SAFE` directory and without extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ImageFiles {
    pub images: Vec<String>,
}

impl ImageFiles {
    pub fn parse(xml: &str) -> CatalogResult<Self> {
        let doc = Document::parse(xml).map_err(|e| {
            CatalogError::InvalidMetadata(format!("malformed product metadata: {}", e))
        })?;

        let images = doc
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "IMAGE_FILE")
            .filter_map(|n| n.text())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        Ok(Self { images })
    }

    /// Image path for a normalized band label, if the product has one.
    ///
    /// When several paths match, the last declared wins.
    pub fn image_for_band(&self, level: ProcessingLevel, band: &str) -> Option<&str> {
        let suffix = band_suffix(level, band)?;
        self.images
            .iter()
            .rev()
            .find(|image| image.ends_with(&suffix))
            .map(String::as_str)
    }

    /// Path of the cloud-probability mask, derived from the `GRANULE/<id>/`
    /// prefix of the first declared image.
    pub fn cloud_mask(&self) -> Option<String> {
        let first = self.images.first()?;
        let mut parts = first.split('/');
        match (parts.next(), parts.next()) {
            (Some("GRANULE"), Some(granule)) if !granule.is_empty() => {
                Some(format!("GRANULE/{}/{}", granule, CLOUD_MASK_FILE))
            }
            _ => None,
        }
    }
}

/// Ending that identifies a band's image file: `B04` (L1C), `B04_10m` (L2A).
fn band_suffix(level: ProcessingLevel, band: &str) -> Option<String> {
    let padded = format!("B{:0>2}", band);
    match level {
        ProcessingLevel::L1C => Some(padded),
        ProcessingLevel::L2A => l2a_resolution(band).map(|res| format!("{}_{}", padded, res)),
    }
}

/// Native resolution of an L2A band.
fn l2a_resolution(band: &str) -> Option<&'static str> {
    match band {
        "2" | "3" | "4" | "8" => Some("10m"),
        "5" | "6" | "7" | "8A" | "11" | "12" => Some("20m"),
        "1" | "9" => Some("60m"),
        _ => None,
    }
}
