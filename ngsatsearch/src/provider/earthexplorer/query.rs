//! JSON request bodies for the inventory API.

use serde_json::{json, Map, Value};

use crate::condition::{epoch, SearchCondition, TimeInterval};
use crate::platform::{OptionDomain, Platform};

/// Date layout of `temporalFilter`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Body of one `search` page. `offset` is zero-based; the API counts from 1.
pub(crate) fn search_body(
    api_key: &str,
    platform: &Platform,
    condition: &SearchCondition,
    offset: usize,
    rows: usize,
) -> Value {
    let mut body = Map::new();
    body.insert("apiKey".into(), json!(api_key));
    body.insert("datasetName".into(), json!(platform.name));
    body.insert("maxResults".into(), json!(rows));
    body.insert("startingNumber".into(), json!(offset + 1));

    if let Some(filter) = temporal_filter(condition.time.interval()) {
        body.insert("temporalFilter".into(), filter);
    }

    if let Some(region) = &condition.region {
        let bbox = region.bounding_box();
        body.insert(
            "spatialFilter".into(),
            json!({
                "filterType": "mbr",
                "lowerLeft": { "latitude": bbox.y_min, "longitude": bbox.x_min },
                "upperRight": { "latitude": bbox.y_max, "longitude": bbox.x_max },
            }),
        );
    }

    for option in &condition.options {
        body.insert(option.name.clone(), option_value(platform, &option.name, &option.value));
    }

    Value::Object(body)
}

/// `temporalFilter` object, or `None` for an unbounded search.
pub(crate) fn temporal_filter(interval: TimeInterval) -> Option<Value> {
    let fmt = |t: chrono::DateTime<chrono::Utc>| t.format(DATE_FORMAT).to_string();
    match interval {
        TimeInterval::Unbounded => None,
        TimeInterval::Closed(start, end) => {
            Some(json!({ "startDate": fmt(start), "endDate": fmt(end) }))
        }
        TimeInterval::OpenEnded(start) => Some(json!({ "startDate": fmt(start) })),
        TimeInterval::FromEpoch(end) => {
            Some(json!({ "startDate": fmt(epoch()), "endDate": fmt(end) }))
        }
    }
}

/// Integer-domain options go out as JSON numbers, everything else verbatim.
fn option_value(platform: &Platform, name: &str, value: &str) -> Value {
    match platform.option(name).map(|spec| spec.domain) {
        Some(OptionDomain::IntegerRange { .. }) => value
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| json!(value)),
        _ => json!(value),
    }
}

pub(crate) fn login_body(username: &str, password: &str) -> Value {
    json!({ "username": username, "password": password })
}

pub(crate) fn idlookup_body(api_key: &str, dataset: &str, display_id: &str) -> Value {
    json!({
        "apiKey": api_key,
        "datasetName": dataset,
        "idList": [display_id],
        "inputField": "displayId",
    })
}

pub(crate) fn download_body(api_key: &str, dataset: &str, entity_id: &str) -> Value {
    json!({
        "apiKey": api_key,
        "datasetName": dataset,
        "products": ["STANDARD"],
        "entityIds": [entity_id],
    })
}

pub(crate) fn datasetfields_body(api_key: &str, dataset: &str) -> Value {
    json!({ "apiKey": api_key, "datasetName": dataset })
}

/// Search filtered on one additional field, used for metadata lookups.
pub(crate) fn field_search_body(api_key: &str, dataset: &str, field_id: i64, value: &str) -> Value {
    json!({
        "apiKey": api_key,
        "datasetName": dataset,
        "additionalCriteria": {
            "filterType": "value",
            "fieldId": field_id,
            "value": value,
            "operand": "like",
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Polygon, TimeRange};
    use crate::provider::earthexplorer::PLATFORMS;
    use chrono::NaiveDate;

    #[test]
    fn test_search_body() {
        let condition = SearchCondition::new("LANDSAT_8_C1")
            .with_region(Polygon::from_wkt("POLYGON((30 60, 30 61, 31 61, 31 60, 30 60))").unwrap())
            .with_time_range(TimeRange::from_dates(
                NaiveDate::from_ymd_opt(2019, 6, 1),
                NaiveDate::from_ymd_opt(2019, 6, 30),
            ))
            .with_option("maxCloudCover", "20");
        let platform = condition.validate(PLATFORMS).unwrap();

        let body = search_body("KEY", platform, &condition, 100, 100);

        assert_eq!(body["apiKey"], "KEY");
        assert_eq!(body["datasetName"], "LANDSAT_8_C1");
        assert_eq!(body["maxResults"], 100);
        assert_eq!(body["startingNumber"], 101);
        assert_eq!(body["maxCloudCover"], 20);
        assert_eq!(body["temporalFilter"]["startDate"], "2019-06-01");
        assert_eq!(body["temporalFilter"]["endDate"], "2019-06-30");
        assert_eq!(body["spatialFilter"]["filterType"], "mbr");
        assert_eq!(body["spatialFilter"]["lowerLeft"]["latitude"], 60.0);
        assert_eq!(body["spatialFilter"]["lowerLeft"]["longitude"], 30.0);
        assert_eq!(body["spatialFilter"]["upperRight"]["latitude"], 61.0);
        assert_eq!(body["spatialFilter"]["upperRight"]["longitude"], 31.0);
    }

    #[test]
    fn test_end_only_filter_starts_at_epoch() {
        let range = TimeRange::from_dates(None, NaiveDate::from_ymd_opt(2023, 7, 20));
        let filter = temporal_filter(range.interval()).unwrap();
        assert_eq!(filter["startDate"], "1970-01-01");
        assert_eq!(filter["endDate"], "2023-07-20");
    }

    #[test]
    fn test_unbounded_search_has_no_filters() {
        let condition = SearchCondition::new("LANDSAT_TM_C1");
        let platform = condition.validate(PLATFORMS).unwrap();
        let body = search_body("KEY", platform, &condition, 0, 100);

        assert_eq!(body["startingNumber"], 1);
        assert!(body.get("temporalFilter").is_none());
        assert!(body.get("spatialFilter").is_none());
    }
}
