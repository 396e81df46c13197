//! Rollout CRUD and lifecycle transitions through `manageRollout` and
//! `manageRolloutState`.

use crate::common::{Failure, TestContext, assert_error_kind, assert_preview, structured, text};
use serde_json::json;

// =============================================================================
// ROLLOUT CRUD
// =============================================================================

#[tokio::test]
async fn test_delete_rollout_preview_then_confirm() {
    let ctx = TestContext::new();

    let preview = ctx
        .call("manageRollout", json!({"action": "DELETE", "rolloutId": 42}))
        .await;
    assert_preview(&preview, "DELETE");
    assert_eq!(structured(&preview)["rolloutId"], 42);
    assert_eq!(ctx.backend.call_count(), 0);

    let done = ctx
        .call(
            "manageRollout",
            json!({"action": "DELETE", "rolloutId": 42, "confirm": true}),
        )
        .await;
    assert_eq!(text(&done), "Rollout 42 deleted successfully.");
    assert_eq!(ctx.backend.operations(), vec!["deleteRollout"]);
    assert_eq!(ctx.backend.calls()[0].args["rolloutId"], 42);
}

#[tokio::test]
async fn test_create_rollout_passes_body_through() {
    let ctx = TestContext::new();
    ctx.backend.respond("createRollout", json!({"id": 9, "status": "creating"}));

    let response = ctx
        .call(
            "manageRollout",
            json!({
                "action": "CREATE",
                "createBody": {
                    "name": "wave-1",
                    "distributionSetId": 4,
                    "targetFilterQuery": "name==dev*",
                    "amountGroups": 3,
                    "successCondition": {"condition": "THRESHOLD", "expression": "80"}
                },
                "confirm": true
            }),
        )
        .await;

    assert_eq!(structured(&response)["id"], 9);
    let body = &ctx.backend.calls()[0].args["body"];
    assert_eq!(body["amountGroups"], 3);
    assert_eq!(body["successCondition"]["expression"], "80");
}

#[tokio::test]
async fn test_rollout_id_accepts_numeric_string() {
    let ctx = TestContext::new();

    ctx.call("manageRollout", json!({"action": "GET", "rolloutId": "42"}))
        .await;

    assert_eq!(ctx.backend.calls()[0].args["rolloutId"], 42);
}

// =============================================================================
// LIFECYCLE VERBS
// =============================================================================

#[tokio::test]
async fn test_every_verb_previews_first() {
    let ctx = TestContext::new();

    for verb in [
        "START",
        "PAUSE",
        "RESUME",
        "TRIGGER_NEXT_GROUP",
        "APPROVE",
        "DENY",
        "RETRY",
    ] {
        let response = ctx
            .call("manageRolloutState", json!({"action": verb, "rolloutId": 42}))
            .await;
        assert_preview(&response, verb);
    }
    assert_eq!(ctx.backend.call_count(), 0);
}

#[tokio::test]
async fn test_preview_names_expected_states() {
    let ctx = TestContext::new();

    let response = ctx
        .call("manageRolloutState", json!({"action": "START", "rolloutId": 42}))
        .await;

    let value = structured(&response);
    assert_eq!(value["validFrom"], json!(["READY"]));
    assert_eq!(value["expectedState"], "RUNNING");
}

#[tokio::test]
async fn test_confirmed_verbs_return_messages() {
    let cases = [
        ("START", "startRollout", "Rollout 42 started."),
        ("PAUSE", "pauseRollout", "Rollout 42 paused."),
        ("RESUME", "resumeRollout", "Rollout 42 resumed."),
        (
            "TRIGGER_NEXT_GROUP",
            "triggerNextGroup",
            "Next group processing triggered for Rollout 42",
        ),
        ("APPROVE", "approveRollout", "Rollout 42 approved."),
        ("DENY", "denyRollout", "Rollout 42 denied."),
    ];

    for (verb, operation, message) in cases {
        let ctx = TestContext::new();
        let response = ctx
            .call(
                "manageRolloutState",
                json!({"action": verb, "rolloutId": 42, "confirm": true}),
            )
            .await;
        assert_eq!(text(&response), message, "{verb}");
        assert_eq!(ctx.backend.operations(), vec![operation], "{verb}");
    }
}

#[tokio::test]
async fn test_approve_forwards_remark_verbatim() {
    let ctx = TestContext::new();

    ctx.call(
        "manageRolloutState",
        json!({
            "action": "APPROVE",
            "rolloutId": 42,
            "remark": "  ok for lab fleet ",
            "confirm": true
        }),
    )
    .await;

    assert_eq!(ctx.backend.calls()[0].args["remark"], "  ok for lab fleet ");
}

#[tokio::test]
async fn test_deny_without_remark_sends_empty() {
    let ctx = TestContext::new();

    ctx.call(
        "manageRolloutState",
        json!({"action": "DENY", "rolloutId": 42, "confirm": true}),
    )
    .await;

    assert_eq!(ctx.backend.calls()[0].args["remark"], "");
}

#[tokio::test]
async fn test_retry_returns_new_rollout() {
    let ctx = TestContext::new();
    ctx.backend.respond("retryRollout", json!({"id": 43, "name": "wave-1_retry"}));

    let response = ctx
        .call(
            "manageRolloutState",
            json!({"action": "RETRY", "rolloutId": 42, "confirm": true}),
        )
        .await;

    assert_eq!(structured(&response)["id"], 43);
}

// =============================================================================
// REJECTED TRANSITIONS
// =============================================================================

#[tokio::test]
async fn test_rejected_transition_carries_hint() {
    let ctx = TestContext::new();
    ctx.backend
        .fail_remote("pauseRollout", 400, "rollout is not running");

    let response = ctx
        .call(
            "manageRolloutState",
            json!({"action": "PAUSE", "rolloutId": 42, "confirm": true}),
        )
        .await;

    assert_error_kind(&response, "RemoteError");
    let value = structured(&response);
    assert_eq!(value["status"], 400);
    assert_eq!(value["hint"], "PAUSE is only accepted while the rollout is RUNNING");
    assert!(text(&response).contains("rollout is not running"));
}

#[tokio::test]
async fn test_auth_failure_has_no_hint() {
    let ctx = TestContext::new();
    ctx.backend
        .fail("startRollout", Failure::Auth("token endpoint unreachable".to_string()));

    let response = ctx
        .call(
            "manageRolloutState",
            json!({"action": "START", "rolloutId": 42, "confirm": true}),
        )
        .await;

    assert_error_kind(&response, "RemoteError");
    assert!(structured(&response).get("hint").is_none());
}

// =============================================================================
// ROLLOUT GROUPS
// =============================================================================

#[tokio::test]
async fn test_group_targets_use_target_paging() {
    let ctx = TestContext::new();

    ctx.call(
        "manageRolloutGroups",
        json!({"view": "LIST_GROUP_TARGETS", "rolloutId": 42, "groupId": 2, "limit": 10}),
    )
    .await;

    let call = &ctx.backend.calls()[0];
    assert_eq!(call.operation, "getRolloutGroupTargets");
    assert_eq!(call.args["groupId"], 2);
    assert_eq!(call.args["query"]["limit"], 10);
    assert_eq!(call.args["query"]["offset"], 0);
}

#[tokio::test]
async fn test_group_views_never_preview() {
    let ctx = TestContext::new();

    let response = ctx
        .call("manageRolloutGroups", json!({"view": "GET_GROUP", "rolloutId": 42, "groupId": 2}))
        .await;

    assert!(!response.is_error);
    assert_ne!(structured(&response)["status"], "PREVIEW");
    assert_eq!(ctx.backend.operations(), vec!["getRolloutGroup"]);
}
