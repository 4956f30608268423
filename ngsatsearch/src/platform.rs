//! Platform descriptions: recognized search options and their value domains.
//!
//! Tables are static per backend and exposed read-only.

use std::fmt;

use serde::Serialize;

use crate::error::{CatalogError, CatalogResult};

/// Allowed values for one search option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionDomain {
    /// One of a fixed set of strings.
    Enumerated { values: &'static [&'static str] },
    /// An integer within an inclusive range.
    IntegerRange { min: i64, max: i64 },
    /// Free-form text; `hint` documents the expected shape.
    Pattern { hint: &'static str },
}

impl OptionDomain {
    /// Checks a value against this domain.
    ///
    /// Returns a human-readable reason on mismatch.
    pub fn check(&self, value: &str) -> Result<(), String> {
        match self {
            OptionDomain::Enumerated { values } => {
                if values.contains(&value) {
                    Ok(())
                } else {
                    Err(format!("expected one of {}", values.join(", ")))
                }
            }
            OptionDomain::IntegerRange { min, max } => match value.trim().parse::<i64>() {
                Ok(v) if v >= *min && v <= *max => Ok(()),
                _ => Err(format!("expected an integer in {}..={}", min, max)),
            },
            OptionDomain::Pattern { .. } => Ok(()),
        }
    }
}

/// One recognized option of a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    pub name: &'static str,
    pub domain: OptionDomain,
}

/// A searchable platform and the options it recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub name: &'static str,
    pub options: &'static [OptionSpec],
}

impl Platform {
    /// Looks up a recognized option by name.
    pub fn option(&self, name: &str) -> Option<&'static OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Validates one option name/value pair.
    pub fn validate_option(&self, name: &str, value: &str) -> CatalogResult<&'static OptionSpec> {
        let spec = self.option(name).ok_or_else(|| CatalogError::InvalidOption {
            platform: self.name.to_string(),
            option: name.to_string(),
            reason: if self.options.is_empty() {
                "platform accepts no options".to_string()
            } else {
                format!(
                    "not a recognized option (supported: {})",
                    self.options
                        .iter()
                        .map(|o| o.name)
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            },
        })?;

        spec.domain
            .check(value)
            .map_err(|reason| CatalogError::InvalidOption {
                platform: self.name.to_string(),
                option: name.to_string(),
                reason: format!("value '{}' rejected: {}", value, reason),
            })?;

        Ok(spec)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Finds a platform by exact name in a backend's table.
pub fn find_platform(platforms: &'static [Platform], name: &str) -> CatalogResult<&'static Platform> {
    platforms.iter().find(|p| p.name == name).ok_or_else(|| {
        CatalogError::UnsupportedPlatform(format!(
            "{} (supported: {})",
            name,
            platform_names(platforms).join(", ")
        ))
    })
}

/// Names of all platforms in a table, in declaration order.
pub fn platform_names(platforms: &[Platform]) -> Vec<&'static str> {
    platforms.iter().map(|p| p.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOUDY: &[OptionSpec] = &[
        OptionSpec {
            name: "maxCloudCover",
            domain: OptionDomain::IntegerRange { min: 0, max: 100 },
        },
        OptionSpec {
            name: "producttype",
            domain: OptionDomain::Enumerated {
                values: &["GRD", "SLC"],
            },
        },
        OptionSpec {
            name: "filename",
            domain: OptionDomain::Pattern { hint: "S1A_*" },
        },
    ];

    const TABLE: &[Platform] = &[Platform {
        name: "TEST",
        options: CLOUDY,
    }];

    #[test]
    fn test_find_platform() {
        assert_eq!(find_platform(TABLE, "TEST").unwrap().name, "TEST");
        let err = find_platform(TABLE, "OTHER").unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedPlatform(_)));
        assert!(err.to_string().contains("TEST"));
    }

    #[test]
    fn test_unknown_option_rejected() {
        let err = TABLE[0].validate_option("orbit", "12").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidOption { .. }));
    }

    #[test]
    fn test_integer_domain() {
        assert!(TABLE[0].validate_option("maxCloudCover", "40").is_ok());
        assert!(TABLE[0].validate_option("maxCloudCover", "101").is_err());
        assert!(TABLE[0].validate_option("maxCloudCover", "lots").is_err());
    }

    #[test]
    fn test_enumerated_and_pattern_domains() {
        assert!(TABLE[0].validate_option("producttype", "GRD").is_ok());
        assert!(TABLE[0].validate_option("producttype", "OCN").is_err());
        assert!(TABLE[0].validate_option("filename", "anything*").is_ok());
    }
}
