//! Paging arguments of the list tools.

use crate::common::{TestContext, assert_error_kind, structured};
use hawkbit_core::PaginationConfig;
use serde_json::json;

#[tokio::test]
async fn test_list_defaults() {
    let ctx = TestContext::new();

    ctx.call("getTargets", json!({})).await;

    let query = &ctx.backend.calls()[0].args["query"];
    assert_eq!(query["offset"], 0);
    assert_eq!(query["limit"], 50);
    assert_eq!(query["sort"], "id:asc");
    assert!(query.get("filter").is_none());
}

#[tokio::test]
async fn test_explicit_window_filter_and_sort() {
    let ctx = TestContext::new();

    ctx.call(
        "getRollouts",
        json!({
            "offset": 100,
            "limit": "25",
            "rsqlParam": "status==running",
            "sortParam": "name:desc"
        }),
    )
    .await;

    let query = &ctx.backend.calls()[0].args["query"];
    assert_eq!(query["offset"], 100);
    assert_eq!(query["limit"], 25);
    assert_eq!(query["filter"], "status==running");
    assert_eq!(query["sort"], "name:desc");
}

#[tokio::test]
async fn test_action_search_sorts_newest_first() {
    let ctx = TestContext::new();

    ctx.call("queryActions", json!({"queryType": "SEARCH"})).await;

    let call = &ctx.backend.calls()[0];
    assert_eq!(call.operation, "getActions");
    assert_eq!(call.args["query"]["sort"], "id:desc");
}

#[tokio::test]
async fn test_blank_filter_is_dropped() {
    let ctx = TestContext::new();

    ctx.call("getTargetTags", json!({"rsqlParam": "   "})).await;

    assert!(ctx.backend.calls()[0].args["query"].get("filter").is_none());
}

#[tokio::test]
async fn test_large_limit_is_forwarded() {
    let ctx = TestContext::new();

    ctx.call("getTargetTypes", json!({"limit": 500})).await;

    assert_eq!(ctx.backend.calls()[0].args["query"]["limit"], 500);
}

#[tokio::test]
async fn test_large_limit_is_clamped_when_enforced() {
    let ctx = TestContext::with_pagination(PaginationConfig {
        enforce_max_limit: true,
        ..PaginationConfig::default()
    });

    ctx.call("getTargetTypes", json!({"limit": 500})).await;

    assert_eq!(ctx.backend.calls()[0].args["query"]["limit"], 50);
}

#[tokio::test]
async fn test_invalid_window_is_rejected_locally() {
    let ctx = TestContext::new();

    let negative = ctx.call("getTargetFilters", json!({"offset": -1})).await;
    assert_error_kind(&negative, "InvalidArgument");
    assert_eq!(structured(&negative)["field"], "offset");

    let zero = ctx.call("getTargetFilters", json!({"limit": 0})).await;
    assert_error_kind(&zero, "InvalidArgument");
    assert_eq!(structured(&zero)["field"], "limit");

    assert_eq!(ctx.backend.call_count(), 0);
}

#[tokio::test]
async fn test_action_status_ignores_filter() {
    let ctx = TestContext::new();

    ctx.call(
        "manageTargetActions",
        json!({
            "action": "GET_STATUS",
            "controllerId": "dev-01",
            "actionId": 5,
            "rsqlParam": "status==running",
            "limit": 5
        }),
    )
    .await;

    let call = &ctx.backend.calls()[0];
    assert_eq!(call.operation, "getActionStatusList");
    assert!(call.args["query"].get("filter").is_none());
    assert_eq!(call.args["query"]["limit"], 5);
}
