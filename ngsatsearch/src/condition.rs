//! Search conditions: platform, spatial filter, time range and options.
//!
//! A [`SearchCondition`] is built per call, validated against the target
//! platform before any network traffic, and discarded afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::error::{CatalogError, CatalogResult};
use crate::platform::{find_platform, Platform};

/// Timestamp layout used by text-query backends, e.g. `2023-07-01T00:00:00Z`.
pub const ISO_SECONDS_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Closed polygon given by its outer ring, as `(x, y)` = `(lon, lat)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    ring: Vec<(f64, f64)>,
}

/// Axis-aligned bounding box of a polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Polygon {
    /// Creates a polygon from its outer ring.
    ///
    /// The ring needs at least three distinct vertices; it is closed
    /// automatically if the last point differs from the first.
    pub fn from_ring(mut ring: Vec<(f64, f64)>) -> CatalogResult<Self> {
        if ring.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(CatalogError::InvalidPolygon(
                "coordinates must be finite numbers".to_string(),
            ));
        }
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(CatalogError::InvalidPolygon(
                "a polygon ring needs at least three vertices".to_string(),
            ));
        }
        let first = ring[0];
        ring.push(first);
        Ok(Self { ring })
    }

    /// Parses `POLYGON((x y, x y, ...))`. Only the outer ring is kept.
    pub fn from_wkt(wkt: &str) -> CatalogResult<Self> {
        let invalid = || {
            CatalogError::InvalidPolygon(
                "must be like POLYGON((30 60, 30 61, 31 61, 31 60, 30 60))".to_string(),
            )
        };

        let trimmed = wkt.trim();
        let (keyword, body) = trimmed.split_at(trimmed.find('(').ok_or_else(invalid)?);
        if !keyword.trim().eq_ignore_ascii_case("POLYGON") {
            return Err(invalid());
        }

        let start = body.find("((").ok_or_else(invalid)? + 2;
        let end = body[start..].find(')').ok_or_else(invalid)? + start;

        let ring = body[start..end]
            .split(',')
            .map(|point| {
                let mut parts = point.split_whitespace();
                let x = parts.next().and_then(|v| v.parse::<f64>().ok());
                let y = parts.next().and_then(|v| v.parse::<f64>().ok());
                match (x, y) {
                    (Some(x), Some(y)) => Ok((x, y)),
                    _ => Err(invalid()),
                }
            })
            .collect::<CatalogResult<Vec<_>>>()?;

        Self::from_ring(ring)
    }

    /// The closed outer ring.
    pub fn ring(&self) -> &[(f64, f64)] {
        &self.ring
    }

    /// Renders the outer ring as WKT.
    pub fn to_wkt(&self) -> String {
        let points = self
            .ring
            .iter()
            .map(|(x, y)| format!("{} {}", x, y))
            .collect::<Vec<_>>()
            .join(", ");
        format!("POLYGON(({}))", points)
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox {
            x_min: f64::INFINITY,
            y_min: f64::INFINITY,
            x_max: f64::NEG_INFINITY,
            y_max: f64::NEG_INFINITY,
        };
        for &(x, y) in &self.ring {
            bbox.x_min = bbox.x_min.min(x);
            bbox.y_min = bbox.y_min.min(y);
            bbox.x_max = bbox.x_max.max(x);
            bbox.y_max = bbox.y_max.max(y);
        }
        bbox
    }
}

impl FromStr for Polygon {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wkt(s)
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wkt())
    }
}

/// Optional start/end bounds of a search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

/// Resolved shape of a [`TimeRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInterval {
    /// No bounds: the search is not time-constrained.
    Unbounded,
    /// Both bounds present.
    Closed(DateTime<Utc>, DateTime<Utc>),
    /// Only a start: open towards "now".
    OpenEnded(DateTime<Utc>),
    /// Only an end: runs from the Unix epoch.
    FromEpoch(DateTime<Utc>),
}

impl TimeRange {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    /// Builds a range from calendar dates at midnight UTC.
    pub fn from_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self {
            start: start.map(midnight_utc),
            end: end.map(midnight_utc),
        }
    }

    pub fn interval(&self) -> TimeInterval {
        match (self.start, self.end) {
            (Some(start), Some(end)) => TimeInterval::Closed(start, end),
            (Some(start), None) => TimeInterval::OpenEnded(start),
            (None, Some(end)) => TimeInterval::FromEpoch(end),
            (None, None) => TimeInterval::Unbounded,
        }
    }
}

/// `1970-01-01T00:00:00Z`.
pub fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

/// A `(name, value)` search option, passed through verbatim once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOption {
    pub name: String,
    pub value: String,
}

impl SearchOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl FromStr for SearchOption {
    type Err = String;

    /// Parses `name=value`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok(Self::new(name.trim(), value.trim()))
            }
            _ => Err(format!("expected name=value, got '{}'", s)),
        }
    }
}

/// Everything a backend needs to build one search query.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchCondition {
    pub platform: String,
    pub region: Option<Polygon>,
    pub time: TimeRange,
    pub options: Vec<SearchOption>,
}

impl SearchCondition {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            region: None,
            time: TimeRange::default(),
            options: Vec::new(),
        }
    }

    pub fn with_region(mut self, region: Polygon) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_time_range(mut self, time: TimeRange) -> Self {
        self.time = time;
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(SearchOption::new(name, value));
        self
    }

    pub fn with_options(mut self, options: impl IntoIterator<Item = SearchOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Resolves the platform in `platforms` and validates every option.
    ///
    /// Runs before any network call; the first offending option aborts.
    pub fn validate(&self, platforms: &'static [Platform]) -> CatalogResult<&'static Platform> {
        let platform = find_platform(platforms, &self.platform)?;
        for option in &self.options {
            platform.validate_option(&option.name, &option.value)?;
        }
        Ok(platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_wkt_polygon() {
        let polygon = Polygon::from_wkt("POLYGON((30 60, 30 61, 31 61, 31 60, 30 60))").unwrap();
        assert_eq!(polygon.ring().len(), 5);
        assert_eq!(
            polygon.to_wkt(),
            "POLYGON((30 60, 30 61, 31 61, 31 60, 30 60))"
        );
    }

    #[test]
    fn test_parse_wkt_keeps_outer_ring_only() {
        let polygon =
            Polygon::from_wkt("POLYGON ((0 0, 10 0, 10 10, 0 10, 0 0), (2 2, 3 2, 3 3, 2 2))")
                .unwrap();
        let bbox = polygon.bounding_box();
        assert_eq!((bbox.x_min, bbox.x_max), (0.0, 10.0));
        assert_eq!(polygon.ring().len(), 5);
    }

    #[test]
    fn test_unclosed_ring_is_closed() {
        let polygon = Polygon::from_wkt("POLYGON((1 1, 2 1, 2 2))").unwrap();
        assert_eq!(polygon.ring().first(), polygon.ring().last());
        assert_eq!(polygon.ring().len(), 4);
    }

    #[test]
    fn test_invalid_wkt_rejected() {
        for wkt in [
            "",
            "POINT(1 2)",
            "POLYGON((1 1, 2 2))",
            "POLYGON((a b, c d, e f))",
            "MULTIPOLYGON(((0 0, 1 0, 1 1, 0 0)))",
        ] {
            assert!(
                matches!(Polygon::from_wkt(wkt), Err(CatalogError::InvalidPolygon(_))),
                "accepted {:?}",
                wkt
            );
        }
    }

    #[test]
    fn test_bounding_box() {
        let polygon = Polygon::from_wkt("POLYGON((30.5 60, 30 61.2, 31 61, 31 59.9, 30.5 60))")
            .unwrap();
        let bbox = polygon.bounding_box();
        assert_eq!(bbox.x_min, 30.0);
        assert_eq!(bbox.x_max, 31.0);
        assert_eq!(bbox.y_min, 59.9);
        assert_eq!(bbox.y_max, 61.2);
    }

    #[test]
    fn test_time_interval_policy() {
        let start = Some(date(2023, 7, 1));
        let end = Some(date(2023, 7, 20));

        assert!(matches!(
            TimeRange::from_dates(start, end).interval(),
            TimeInterval::Closed(_, _)
        ));
        assert!(matches!(
            TimeRange::from_dates(start, None).interval(),
            TimeInterval::OpenEnded(_)
        ));
        assert!(matches!(
            TimeRange::from_dates(None, end).interval(),
            TimeInterval::FromEpoch(_)
        ));
        assert_eq!(
            TimeRange::from_dates(None, None).interval(),
            TimeInterval::Unbounded
        );
    }

    #[test]
    fn test_dates_are_midnight_utc() {
        let range = TimeRange::from_dates(Some(date(2023, 7, 1)), None);
        assert_eq!(
            range.start.unwrap().format(ISO_SECONDS_FORMAT).to_string(),
            "2023-07-01T00:00:00Z"
        );
        assert_eq!(
            epoch().format(ISO_SECONDS_FORMAT).to_string(),
            "1970-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_search_option_from_str() {
        let option: SearchOption = "producttype=GRD".parse().unwrap();
        assert_eq!(option, SearchOption::new("producttype", "GRD"));

        let option: SearchOption = "cloudcoverpercentage=[0 TO 9.4]".parse().unwrap();
        assert_eq!(option.value, "[0 TO 9.4]");

        assert!("novalue".parse::<SearchOption>().is_err());
        assert!("=x".parse::<SearchOption>().is_err());
    }
}
