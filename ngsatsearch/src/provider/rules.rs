//! Identifier to platform inference.
//!
//! Rules are evaluated in declaration order and the first match wins. An
//! identifier no rule matches is a hard failure, never a default.

use crate::error::{CatalogError, CatalogResult};

/// How a rule recognizes an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Prefix(&'static str),
    Contains(&'static str),
}

impl Marker {
    fn matches(&self, identifier: &str) -> bool {
        match self {
            Marker::Prefix(prefix) => identifier.starts_with(prefix),
            Marker::Contains(needle) => identifier.contains(needle),
        }
    }
}

/// Maps identifiers carrying `marker` to `platform`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierRule {
    pub marker: Marker,
    pub platform: &'static str,
}

const fn prefix(marker: &'static str, platform: &'static str) -> IdentifierRule {
    IdentifierRule {
        marker: Marker::Prefix(marker),
        platform,
    }
}

const fn contains(marker: &'static str, platform: &'static str) -> IdentifierRule {
    IdentifierRule {
        marker: Marker::Contains(marker),
        platform,
    }
}

/// Landsat Collection 1 product identifiers.
pub const LANDSAT_RULES: &[IdentifierRule] = &[
    prefix("LC08", "LANDSAT_8_C1"),
    prefix("LE07", "LANDSAT_ETM_C1"),
    prefix("LT05", "LANDSAT_TM_C1"),
    prefix("LT04", "LANDSAT_TM_C1"),
];

/// Multispectral Scanner scenes, only offered by the session backend.
pub const LANDSAT_MSS_RULES: &[IdentifierRule] = &[
    prefix("LM01", "LANDSAT_MSS_C1"),
    prefix("LM02", "LANDSAT_MSS_C1"),
    prefix("LM03", "LANDSAT_MSS_C1"),
    prefix("LM04", "LANDSAT_MSS_C1"),
    prefix("LM05", "LANDSAT_MSS_C1"),
];

/// Sentinel-2 product names.
pub const SENTINEL_2_RULES: &[IdentifierRule] = &[
    contains("MSIL1C_", "SENTINEL_2_L1C"),
    contains("MSIL2A_", "SENTINEL_2_L2A"),
];

/// Returns the platform of the first rule group entry matching `identifier`.
pub fn infer_platform(
    groups: &[&[IdentifierRule]],
    identifier: &str,
) -> CatalogResult<&'static str> {
    groups
        .iter()
        .flat_map(|group| group.iter())
        .find(|rule| rule.marker.matches(identifier))
        .map(|rule| rule.platform)
        .ok_or_else(|| {
            CatalogError::UnsupportedPlatform(format!(
                "cannot infer platform from identifier '{}'",
                identifier
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landsat_prefixes() {
        let groups: &[&[IdentifierRule]] = &[LANDSAT_RULES, LANDSAT_MSS_RULES];
        assert_eq!(
            infer_platform(groups, "LC08_L1TP_174021_20190623_20190704_01_T1").unwrap(),
            "LANDSAT_8_C1"
        );
        assert_eq!(infer_platform(groups, "LT04_X").unwrap(), "LANDSAT_TM_C1");
        assert_eq!(infer_platform(groups, "LM03_X").unwrap(), "LANDSAT_MSS_C1");
    }

    #[test]
    fn test_sentinel_markers() {
        let groups: &[&[IdentifierRule]] = &[SENTINEL_2_RULES];
        assert_eq!(
            infer_platform(groups, "S2A_MSIL2A_20190626T083601_N0212_R064_T37VCD_20190626T110328")
                .unwrap(),
            "SENTINEL_2_L2A"
        );
    }

    #[test]
    fn test_unmatched_identifier_is_unsupported() {
        let groups: &[&[IdentifierRule]] = &[LANDSAT_RULES, SENTINEL_2_RULES];
        let err = infer_platform(groups, "LM01_X").unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedPlatform(_)));
    }
}
