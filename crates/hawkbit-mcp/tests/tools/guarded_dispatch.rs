//! Preview/confirm gate across the action tools.

use crate::common::{TestContext, assert_error_kind, assert_preview, structured, text};
use serde_json::json;

// =============================================================================
// PREVIEW
// =============================================================================

#[tokio::test]
async fn test_unconfirmed_delete_previews_without_calls() {
    let ctx = TestContext::new();

    let response = ctx
        .call("manageTarget", json!({"action": "DELETE", "controllerId": "dev-01"}))
        .await;

    assert_preview(&response, "DELETE");
    assert_eq!(structured(&response)["controllerId"], "dev-01");
    assert_eq!(ctx.backend.call_count(), 0);
}

#[tokio::test]
async fn test_confirm_false_still_previews() {
    let ctx = TestContext::new();

    let response = ctx
        .call(
            "manageTargetTag",
            json!({"action": "DELETE", "tagId": 7, "confirm": false}),
        )
        .await;

    assert_preview(&response, "DELETE");
    assert_eq!(ctx.backend.call_count(), 0);
}

#[tokio::test]
async fn test_confirm_must_be_literal_true() {
    let ctx = TestContext::new();

    for confirm in [json!("true"), json!(1), json!(null)] {
        let response = ctx
            .call(
                "manageRollout",
                json!({"action": "DELETE", "rolloutId": 42, "confirm": confirm}),
            )
            .await;
        assert_preview(&response, "DELETE");
    }
    assert_eq!(ctx.backend.call_count(), 0);
}

#[tokio::test]
async fn test_preview_echoes_payload() {
    let ctx = TestContext::new();
    let body = json!({"name": "nightly", "query": "name==dev*"});

    let response = ctx
        .call("manageTargetFilter", json!({"action": "CREATE", "filterBody": body}))
        .await;

    assert_preview(&response, "CREATE");
    assert_eq!(structured(&response)["filterBody"], body);
    assert_eq!(ctx.backend.call_count(), 0);
}

// =============================================================================
// CONFIRMED EXECUTION
// =============================================================================

#[tokio::test]
async fn test_confirmed_update_makes_exactly_one_call() {
    let ctx = TestContext::new();

    let response = ctx
        .call(
            "manageTarget",
            json!({
                "action": "UPDATE",
                "controllerId": "dev-01",
                "updateBody": {"name": "Device 1", "description": "lab"},
                "confirm": true
            }),
        )
        .await;

    assert!(!response.is_error, "{}", text(&response));
    let calls = ctx.backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].operation, "updateTarget");
    assert_eq!(calls[0].args["controllerId"], "dev-01");
    assert_eq!(calls[0].args["body"], json!({"name": "Device 1", "description": "lab"}));
}

#[tokio::test]
async fn test_confirmed_delete_returns_message() {
    let ctx = TestContext::new();

    let response = ctx
        .call(
            "manageTarget",
            json!({"action": "DELETE", "controllerId": "dev-01", "confirm": true}),
        )
        .await;

    assert_eq!(text(&response), "Target dev-01 deleted successfully.");
    assert!(response.structured_content.is_none());
    assert_eq!(ctx.backend.operations(), vec!["deleteTarget"]);
}

#[tokio::test]
async fn test_reads_run_without_confirm() {
    let ctx = TestContext::new();
    ctx.backend.respond("getTarget", json!({"controllerId": "dev-01", "name": "Device 1"}));

    let response = ctx
        .call("manageTarget", json!({"action": "GET", "controllerId": "dev-01"}))
        .await;

    assert!(!response.is_error);
    assert_eq!(structured(&response)["name"], "Device 1");
    assert_eq!(ctx.backend.operations(), vec!["getTarget"]);
}

#[tokio::test]
async fn test_tag_assignment_forwards_policy() {
    let ctx = TestContext::new();

    let response = ctx
        .call(
            "manageTargetTagAssignments",
            json!({
                "action": "ASSIGN",
                "tagId": 3,
                "controllerIds": ["a", "b"],
                "onNotFoundPolicy": "on_what_found_and_success",
                "confirm": true
            }),
        )
        .await;

    assert_eq!(text(&response), "2 target(s) assigned to tag 3.");
    let calls = ctx.backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].args["body"], json!(["a", "b"]));
    assert_eq!(calls[0].args["onNotFoundPolicy"], "ON_WHAT_FOUND_AND_SUCCESS");
}

#[tokio::test]
async fn test_tag_assignment_accepts_numeric_controller_ids() {
    let ctx = TestContext::new();

    let response = ctx
        .call(
            "manageTargetTagAssignments",
            json!({
                "action": "ASSIGN",
                "tagId": 3,
                "controllerIds": [1001, "dev-2"],
                "confirm": true
            }),
        )
        .await;

    assert_eq!(text(&response), "2 target(s) assigned to tag 3.");
    assert_eq!(ctx.backend.calls()[0].args["body"], json!(["1001", "dev-2"]));
}

#[tokio::test]
async fn test_metadata_value_can_be_cleared() {
    let ctx = TestContext::new();
    let args = json!({
        "action": "UPDATE",
        "controllerId": "dev-01",
        "metadataKey": "site",
        "value": ""
    });

    let preview = ctx.call("manageTargetMetadata", args.clone()).await;
    assert_preview(&preview, "UPDATE");
    assert_eq!(structured(&preview)["value"], "");
    assert_eq!(ctx.backend.call_count(), 0);

    let mut confirmed = args;
    confirmed["confirm"] = json!(true);
    let response = ctx.call("manageTargetMetadata", confirmed).await;

    assert!(!response.is_error, "{}", text(&response));
    let calls = ctx.backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].operation, "updateMetadata");
    assert_eq!(calls[0].args["body"], json!({"value": ""}));
}

#[tokio::test]
async fn test_compatibility_add_sends_id_refs() {
    let ctx = TestContext::new();

    ctx.call(
        "manageTargetTypeCompatibility",
        json!({
            "action": "ADD",
            "targetTypeId": 5,
            "distributionSetTypeIds": [11, 12],
            "confirm": true
        }),
    )
    .await;

    let calls = ctx.backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].operation, "addCompatibleDistributionSets");
    assert_eq!(calls[0].args["body"], json!([{"id": 11}, {"id": 12}]));
}

// =============================================================================
// VALIDATION
// =============================================================================

#[tokio::test]
async fn test_missing_fields_fail_before_any_call() {
    let ctx = TestContext::new();

    let response = ctx
        .call("manageTargetFilter", json!({"action": "UPDATE", "confirm": true}))
        .await;

    assert_error_kind(&response, "MissingRequiredField");
    assert_eq!(structured(&response)["fields"], json!(["filterId", "filterBody"]));
    assert_eq!(ctx.backend.call_count(), 0);
}

#[tokio::test]
async fn test_missing_fields_are_reported_without_confirm() {
    let ctx = TestContext::new();

    let response = ctx.call("manageRollout", json!({"action": "UPDATE", "rolloutId": 42})).await;

    assert_error_kind(&response, "MissingRequiredField");
    assert_eq!(structured(&response)["fields"], json!(["updateBody"]));
    assert_eq!(ctx.backend.call_count(), 0);
}

#[tokio::test]
async fn test_empty_create_list_is_missing() {
    let ctx = TestContext::new();

    let response = ctx
        .call(
            "manageTargetType",
            json!({"action": "CREATE", "createBody": [], "confirm": true}),
        )
        .await;

    assert_error_kind(&response, "MissingRequiredField");
    assert_eq!(structured(&response)["fields"], json!(["createBody"]));
    assert_eq!(ctx.backend.call_count(), 0);
}

#[tokio::test]
async fn test_unsupported_action_lists_expected() {
    let ctx = TestContext::new();

    let response = ctx
        .call("manageTargetFilter", json!({"action": "PURGE", "filterId": 1}))
        .await;

    assert_error_kind(&response, "UnsupportedAction");
    assert_eq!(
        structured(&response)["expected"],
        json!(["GET", "CREATE", "UPDATE", "DELETE"])
    );
    assert_eq!(ctx.backend.call_count(), 0);
}

#[tokio::test]
async fn test_compatibility_remove_takes_one_id() {
    let ctx = TestContext::new();

    let response = ctx
        .call(
            "manageTargetTypeCompatibility",
            json!({
                "action": "REMOVE",
                "targetTypeId": 5,
                "distributionSetTypeIds": [11, 12],
                "confirm": true
            }),
        )
        .await;

    assert_error_kind(&response, "InvalidArgument");
    assert_eq!(ctx.backend.call_count(), 0);
}

#[tokio::test]
async fn test_remote_failure_is_error_result() {
    let ctx = TestContext::new();
    ctx.backend.fail_remote("deleteTargetTag", 404, "tag 7 not found");

    let response = ctx
        .call(
            "manageTargetTag",
            json!({"action": "DELETE", "tagId": 7, "confirm": true}),
        )
        .await;

    assert_error_kind(&response, "RemoteError");
    assert_eq!(structured(&response)["status"], 404);
    assert!(text(&response).contains("tag 7 not found"));
    assert_eq!(ctx.backend.call_count(), 1);
}

#[tokio::test]
async fn test_unknown_tool_is_not_a_tool_result() {
    let ctx = TestContext::new();
    assert!(ctx.try_call("manageEverything", json!({})).await.is_err());
}
