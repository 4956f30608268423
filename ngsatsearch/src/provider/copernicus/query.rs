//! OpenSearch query string construction.

use crate::condition::{epoch, SearchCondition, TimeInterval, ISO_SECONDS_FORMAT};
use crate::platform::Platform;

/// Builds the conjunctive `q` parameter for an already validated condition.
///
/// Clauses appear in a fixed order: platform, footprint, time, options.
/// Options are grouped as `(a:x AND b:y)`.
pub(crate) fn build_query(platform: &Platform, condition: &SearchCondition) -> String {
    let mut clauses = vec![format!("platformname:{}", platform.name)];

    if let Some(region) = &condition.region {
        clauses.push(format!("footprint:\"Intersects({})\"", region.to_wkt()));
    }

    if let Some(time) = time_clause(condition.time.interval()) {
        clauses.push(time);
    }

    if !condition.options.is_empty() {
        let options = condition
            .options
            .iter()
            .map(|o| format!("{}:{}", o.name, o.value))
            .collect::<Vec<_>>()
            .join(" AND ");
        clauses.push(format!("({})", options));
    }

    clauses.join(" AND ")
}

/// Renders the time clause, or `None` for an unbounded search.
pub(crate) fn time_clause(interval: TimeInterval) -> Option<String> {
    let fmt = |t: chrono::DateTime<chrono::Utc>| t.format(ISO_SECONDS_FORMAT).to_string();
    match interval {
        TimeInterval::Unbounded => None,
        TimeInterval::Closed(start, end) => {
            Some(format!("beginposition:[{} TO {}]", fmt(start), fmt(end)))
        }
        TimeInterval::OpenEnded(start) => Some(format!("beginposition:[{} TO NOW]", fmt(start))),
        TimeInterval::FromEpoch(end) => Some(format!(
            "endposition:[{} TO {}]",
            fmt(epoch()),
            fmt(end)
        )),
    }
}
