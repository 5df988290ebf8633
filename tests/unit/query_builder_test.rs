// Query builder tests: page size, range bounds and the gte/gt switch
// between the initial page and continuations.

use serde_json::json;

use trxlens::modules::search::query::{build_query, LowerBound};

fn template() -> serde_json::Value {
    json!({
        "query": {
            "bool": {
                "filter": [
                    { "range": { "@timestamp": {} } },
                    { "term": { "channel": "corporate" } }
                ]
            }
        },
        "sort": [ { "@timestamp": { "order": "asc" } } ]
    })
}

#[test]
fn initial_page_uses_inclusive_lower_bound() {
    let query = build_query(
        &template(),
        500,
        "@timestamp",
        "2025-06-01T00:00:00+07:00",
        "2025-06-30T23:59:59+07:00",
        LowerBound::Inclusive,
    )
    .unwrap();

    assert_eq!(query["size"], json!(500));
    let range = &query["query"]["bool"]["filter"][0]["range"]["@timestamp"];
    assert_eq!(range["gte"], json!("2025-06-01T00:00:00+07:00"));
    assert_eq!(range["lt"], json!("2025-06-30T23:59:59+07:00"));
    assert!(range.get("gt").is_none());
}

#[test]
fn continuation_uses_exclusive_lower_bound() {
    let query = build_query(
        &template(),
        500,
        "@timestamp",
        "2025-06-14T09:30:00+07:00",
        "2025-06-30T23:59:59+07:00",
        LowerBound::Exclusive,
    )
    .unwrap();

    let range = &query["query"]["bool"]["filter"][0]["range"]["@timestamp"];
    assert_eq!(range["gt"], json!("2025-06-14T09:30:00+07:00"));
    assert!(range.get("gte").is_none());
}

#[test]
fn switching_bound_modes_clears_the_other_marker() {
    let inclusive = build_query(
        &template(),
        500,
        "@timestamp",
        "2025-06-01T00:00:00+07:00",
        "2025-06-30T23:59:59+07:00",
        LowerBound::Inclusive,
    )
    .unwrap();

    // Continuations reuse the mutated document as their base
    let exclusive = build_query(
        &inclusive,
        500,
        "@timestamp",
        "2025-06-14T09:30:00+07:00",
        "2025-06-30T23:59:59+07:00",
        LowerBound::Exclusive,
    )
    .unwrap();
    let range = &exclusive["query"]["bool"]["filter"][0]["range"]["@timestamp"];
    assert!(range.get("gte").is_none());
    assert_eq!(range["gt"], json!("2025-06-14T09:30:00+07:00"));

    // And back to inclusive
    let back = build_query(
        &exclusive,
        500,
        "@timestamp",
        "2025-06-01T00:00:00+07:00",
        "2025-06-30T23:59:59+07:00",
        LowerBound::Inclusive,
    )
    .unwrap();
    let range = &back["query"]["bool"]["filter"][0]["range"]["@timestamp"];
    assert!(range.get("gt").is_none());
    assert_eq!(range["gte"], json!("2025-06-01T00:00:00+07:00"));
}

#[test]
fn other_filters_survive_untouched() {
    let query = build_query(
        &template(),
        500,
        "@timestamp",
        "2025-06-01T00:00:00+07:00",
        "2025-06-30T23:59:59+07:00",
        LowerBound::Inclusive,
    )
    .unwrap();

    assert_eq!(
        query["query"]["bool"]["filter"][1],
        json!({ "term": { "channel": "corporate" } })
    );
    assert_eq!(query["sort"], template()["sort"]);
}

#[test]
fn template_without_range_filter_is_rejected() {
    let broken = json!({ "query": { "match_all": {} } });

    let result = build_query(
        &broken,
        500,
        "@timestamp",
        "2025-06-01T00:00:00+07:00",
        "2025-06-30T23:59:59+07:00",
        LowerBound::Inclusive,
    );

    assert!(result.is_err());
}

#[test]
fn range_filter_on_wrong_field_is_rejected() {
    let wrong_field = json!({
        "query": { "bool": { "filter": [ { "range": { "created_at": {} } } ] } }
    });

    let result = build_query(
        &wrong_field,
        500,
        "@timestamp",
        "2025-06-01T00:00:00+07:00",
        "2025-06-30T23:59:59+07:00",
        LowerBound::Inclusive,
    );

    assert!(result.is_err());
}
