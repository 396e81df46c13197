//! Every mutating action across all tools: previewed without `confirm`,
//! executed once with it.

use crate::common::{TestContext, action_spaces, assert_preview, structured, text};
use serde_json::{Value, json};

/// One mutating action with minimal valid arguments and the backend call it
/// must produce once confirmed.
struct GatedCase {
    tool: &'static str,
    action: &'static str,
    args: Value,
    operation: &'static str,
    forwarded: Value,
}

fn case(
    tool: &'static str,
    action: &'static str,
    args: Value,
    operation: &'static str,
    forwarded: Value,
) -> GatedCase {
    GatedCase {
        tool,
        action,
        args,
        operation,
        forwarded,
    }
}

fn gated_cases() -> Vec<GatedCase> {
    let dev = "dev-01";
    vec![
        // manageTarget
        case(
            "manageTarget",
            "CREATE",
            json!({"createBody": [{"controllerId": "dev-02", "name": "Device 2"}]}),
            "createTargets",
            json!({"body": [{"controllerId": "dev-02", "name": "Device 2"}]}),
        ),
        case(
            "manageTarget",
            "UPDATE",
            json!({"controllerId": dev, "updateBody": {"name": "Device 1"}}),
            "updateTarget",
            json!({"controllerId": dev, "body": {"name": "Device 1"}}),
        ),
        case(
            "manageTarget",
            "DELETE",
            json!({"controllerId": dev}),
            "deleteTarget",
            json!({"controllerId": dev}),
        ),
        // manageTargetMetadata
        case(
            "manageTargetMetadata",
            "CREATE",
            json!({"controllerId": dev, "metadata": [{"key": "site", "value": "lab"}]}),
            "createMetadata",
            json!({"controllerId": dev, "body": [{"key": "site", "value": "lab"}]}),
        ),
        case(
            "manageTargetMetadata",
            "UPDATE",
            json!({"controllerId": dev, "metadataKey": "site", "value": "lab-2"}),
            "updateMetadata",
            json!({"controllerId": dev, "key": "site", "body": {"value": "lab-2"}}),
        ),
        case(
            "manageTargetMetadata",
            "DELETE",
            json!({"controllerId": dev, "metadataKey": "site"}),
            "deleteMetadata",
            json!({"controllerId": dev, "key": "site"}),
        ),
        // manageTargetDistributionSet
        case(
            "manageTargetDistributionSet",
            "ASSIGN",
            json!({"controllerId": dev, "assignments": [{"id": 5, "type": "forced"}]}),
            "postAssignedDistributionSet",
            json!({"controllerId": dev, "body": [{"id": 5, "type": "forced"}]}),
        ),
        // manageTargetActions
        case(
            "manageTargetActions",
            "CANCEL",
            json!({"controllerId": dev, "actionId": 9}),
            "cancelAction",
            json!({"controllerId": dev, "actionId": 9}),
        ),
        case(
            "manageTargetActions",
            "UPDATE",
            json!({"controllerId": dev, "actionId": 9, "updateBody": {"forceType": "forced"}}),
            "updateAction",
            json!({"controllerId": dev, "actionId": 9, "body": {"forceType": "forced"}}),
        ),
        case(
            "manageTargetActions",
            "UPDATE_CONFIRMATION",
            json!({
                "controllerId": dev,
                "actionId": 9,
                "confirmationBody": {"confirmation": "confirmed"}
            }),
            "updateActionConfirmation",
            json!({"controllerId": dev, "actionId": 9, "body": {"confirmation": "confirmed"}}),
        ),
        // manageTargetTypeAssignment
        case(
            "manageTargetTypeAssignment",
            "ASSIGN",
            json!({"controllerId": dev, "targetTypeId": 3}),
            "assignTargetType",
            json!({"controllerId": dev, "targetTypeId": 3}),
        ),
        case(
            "manageTargetTypeAssignment",
            "UNASSIGN",
            json!({"controllerId": dev}),
            "unassignTargetType",
            json!({"controllerId": dev}),
        ),
        // manageTargetAutoConfirm
        case(
            "manageTargetAutoConfirm",
            "ACTIVATE",
            json!({"controllerId": dev, "initiator": "ops"}),
            "activateAutoConfirm",
            json!({"controllerId": dev, "body": {"initiator": "ops"}}),
        ),
        case(
            "manageTargetAutoConfirm",
            "DEACTIVATE",
            json!({"controllerId": dev}),
            "deactivateAutoConfirm",
            json!({"controllerId": dev}),
        ),
        // manageRollout
        case(
            "manageRollout",
            "CREATE",
            json!({"createBody": {
                "name": "wave-1",
                "distributionSetId": 4,
                "targetFilterQuery": "name==dev*"
            }}),
            "createRollout",
            json!({"body": {
                "name": "wave-1",
                "distributionSetId": 4,
                "targetFilterQuery": "name==dev*"
            }}),
        ),
        case(
            "manageRollout",
            "UPDATE",
            json!({"rolloutId": 42, "updateBody": {"name": "wave-2"}}),
            "updateRollout",
            json!({"rolloutId": 42, "body": {"name": "wave-2"}}),
        ),
        case(
            "manageRollout",
            "DELETE",
            json!({"rolloutId": 42}),
            "deleteRollout",
            json!({"rolloutId": 42}),
        ),
        // manageRolloutState
        case(
            "manageRolloutState",
            "START",
            json!({"rolloutId": 42}),
            "startRollout",
            json!({"rolloutId": 42}),
        ),
        case(
            "manageRolloutState",
            "PAUSE",
            json!({"rolloutId": 42}),
            "pauseRollout",
            json!({"rolloutId": 42}),
        ),
        case(
            "manageRolloutState",
            "RESUME",
            json!({"rolloutId": 42}),
            "resumeRollout",
            json!({"rolloutId": 42}),
        ),
        case(
            "manageRolloutState",
            "TRIGGER_NEXT_GROUP",
            json!({"rolloutId": 42}),
            "triggerNextGroup",
            json!({"rolloutId": 42}),
        ),
        case(
            "manageRolloutState",
            "APPROVE",
            json!({"rolloutId": 42, "remark": "go"}),
            "approveRollout",
            json!({"rolloutId": 42, "remark": "go"}),
        ),
        case(
            "manageRolloutState",
            "DENY",
            json!({"rolloutId": 42, "remark": "not yet"}),
            "denyRollout",
            json!({"rolloutId": 42, "remark": "not yet"}),
        ),
        case(
            "manageRolloutState",
            "RETRY",
            json!({"rolloutId": 42}),
            "retryRollout",
            json!({"rolloutId": 42}),
        ),
        // manageTargetFilter
        case(
            "manageTargetFilter",
            "CREATE",
            json!({"filterBody": {"name": "nightly", "query": "name==dev*"}}),
            "createFilter",
            json!({"body": {"name": "nightly", "query": "name==dev*"}}),
        ),
        case(
            "manageTargetFilter",
            "UPDATE",
            json!({"filterId": 7, "filterBody": {"query": "name==lab*"}}),
            "updateFilter",
            json!({"filterId": 7, "body": {"query": "name==lab*"}}),
        ),
        case(
            "manageTargetFilter",
            "DELETE",
            json!({"filterId": 7}),
            "deleteFilter",
            json!({"filterId": 7}),
        ),
        // manageTargetFilterAutoAssignment
        case(
            "manageTargetFilterAutoAssignment",
            "ASSIGN",
            json!({"filterId": 7, "assignmentBody": {"id": 4, "type": "soft"}}),
            "postAssignedDistributionSet",
            json!({"filterId": 7, "body": {"id": 4, "type": "soft"}}),
        ),
        case(
            "manageTargetFilterAutoAssignment",
            "UNASSIGN",
            json!({"filterId": 7}),
            "deleteAssignedDistributionSet",
            json!({"filterId": 7}),
        ),
        // manageTargetTag
        case(
            "manageTargetTag",
            "CREATE",
            json!({"createBody": [{"name": "lab"}]}),
            "createTargetTags",
            json!({"body": [{"name": "lab"}]}),
        ),
        case(
            "manageTargetTag",
            "UPDATE",
            json!({"tagId": 3, "updateBody": {"colour": "#00ff00"}}),
            "updateTargetTag",
            json!({"tagId": 3, "body": {"colour": "#00ff00"}}),
        ),
        case(
            "manageTargetTag",
            "DELETE",
            json!({"tagId": 3}),
            "deleteTargetTag",
            json!({"tagId": 3}),
        ),
        // manageTargetTagAssignments
        case(
            "manageTargetTagAssignments",
            "ASSIGN",
            json!({"tagId": 3, "controllerIds": ["dev-01", "dev-02"]}),
            "assignTargets",
            json!({"tagId": 3, "body": ["dev-01", "dev-02"], "onNotFoundPolicy": null}),
        ),
        case(
            "manageTargetTagAssignments",
            "UNASSIGN",
            json!({"tagId": 3, "controllerIds": ["dev-01"]}),
            "unassignTargets",
            json!({"tagId": 3, "body": ["dev-01"]}),
        ),
        // manageTargetType
        case(
            "manageTargetType",
            "CREATE",
            json!({"createBody": [{"name": "gateway"}]}),
            "createTargetTypes",
            json!({"body": [{"name": "gateway"}]}),
        ),
        case(
            "manageTargetType",
            "UPDATE",
            json!({"targetTypeId": 5, "updateBody": {"description": "edge"}}),
            "updateTargetType",
            json!({"targetTypeId": 5, "body": {"description": "edge"}}),
        ),
        case(
            "manageTargetType",
            "DELETE",
            json!({"targetTypeId": 5}),
            "deleteTargetType",
            json!({"targetTypeId": 5}),
        ),
        // manageTargetTypeCompatibility
        case(
            "manageTargetTypeCompatibility",
            "ADD",
            json!({"targetTypeId": 5, "distributionSetTypeIds": [11]}),
            "addCompatibleDistributionSets",
            json!({"targetTypeId": 5, "body": [{"id": 11}]}),
        ),
        case(
            "manageTargetTypeCompatibility",
            "REMOVE",
            json!({"targetTypeId": 5, "distributionSetTypeIds": [11]}),
            "removeCompatibleDistributionSet",
            json!({"targetTypeId": 5, "dsTypeId": 11}),
        ),
    ]
}

fn with_action(case: &GatedCase, confirm: Option<bool>) -> Value {
    let mut args = case.args.clone();
    let map = args.as_object_mut().unwrap();
    map.insert("action".to_string(), json!(case.action));
    if let Some(confirm) = confirm {
        map.insert("confirm".to_string(), json!(confirm));
    }
    args
}

#[test]
fn test_cases_cover_every_mutating_action() {
    let cases = gated_cases();
    for space in action_spaces() {
        for action in space.mutating_actions() {
            assert!(
                cases.iter().any(|c| c.tool == space.tool && c.action == action),
                "{}::{action} has no gated case",
                space.tool
            );
        }
    }
    for case in &cases {
        let space = action_spaces()
            .into_iter()
            .find(|s| s.tool == case.tool)
            .unwrap_or_else(|| panic!("{} is not an action tool", case.tool));
        assert!(
            space.mutating_actions().contains(&case.action),
            "{}::{} does not mutate",
            case.tool,
            case.action
        );
    }
}

#[tokio::test]
async fn test_unconfirmed_actions_preview_their_input() {
    for case in gated_cases() {
        let ctx = TestContext::new();

        let response = ctx.call(case.tool, with_action(&case, None)).await;

        assert_preview(&response, case.action);
        let preview = structured(&response);
        for (field, value) in case.args.as_object().unwrap() {
            assert_eq!(
                &preview[field], value,
                "{}::{} preview changed {field}",
                case.tool, case.action
            );
        }
        assert_eq!(ctx.backend.call_count(), 0, "{}::{}", case.tool, case.action);
    }
}

#[tokio::test]
async fn test_confirm_false_behaves_like_absent() {
    for case in gated_cases() {
        let ctx = TestContext::new();

        let response = ctx.call(case.tool, with_action(&case, Some(false))).await;

        assert_preview(&response, case.action);
        assert_eq!(ctx.backend.call_count(), 0, "{}::{}", case.tool, case.action);
    }
}

#[tokio::test]
async fn test_confirmed_actions_make_one_call_with_payload() {
    for case in gated_cases() {
        let ctx = TestContext::new();

        let response = ctx.call(case.tool, with_action(&case, Some(true))).await;

        assert!(
            !response.is_error,
            "{}::{} failed: {}",
            case.tool,
            case.action,
            text(&response)
        );
        let calls = ctx.backend.calls();
        assert_eq!(calls.len(), 1, "{}::{}", case.tool, case.action);
        assert_eq!(calls[0].operation, case.operation, "{}::{}", case.tool, case.action);
        for (key, expected) in case.forwarded.as_object().unwrap() {
            assert_eq!(
                &calls[0].args[key], expected,
                "{}::{} forwarded {key}",
                case.tool, case.action
            );
        }
    }
}
