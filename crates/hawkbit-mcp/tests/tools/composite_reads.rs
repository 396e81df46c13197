//! `getTargetDetails`: one target plus its sub-resources.

use crate::common::{Failure, TestContext, assert_error_kind, structured};
use hawkbit_client::{HttpManagementClient, NoAuth};
use hawkbit_core::ServerConfig;
use hawkbit_mcp::target_details;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const ALL_PARTS: [&str; 6] = [
    "getTarget",
    "getAttributes",
    "getTags",
    "getAssignedDistributionSet",
    "getInstalledDistributionSet",
    "getMetadata",
];

#[tokio::test]
async fn test_all_parts_present() {
    let ctx = TestContext::new();
    ctx.backend.respond("getTarget", json!({"controllerId": "dev-01", "name": "Device 1"}));
    ctx.backend.respond("getAttributes", json!({"hw": "rev2"}));

    let response = ctx.call("getTargetDetails", json!({"controllerId": "dev-01"})).await;

    assert!(!response.is_error);
    let value = structured(&response);
    assert_eq!(value["controllerId"], "dev-01");
    assert_eq!(value["target"]["name"], "Device 1");
    assert_eq!(value["attributes"]["hw"], "rev2");
    assert_eq!(value["partial"], false);
    assert!(value.get("failedParts").is_none());
    assert!(value["retrievedAt"].is_string());
    assert_eq!(ctx.backend.operations(), ALL_PARTS);
}

#[tokio::test]
async fn test_failed_tags_do_not_hide_attributes() {
    let ctx = TestContext::new();
    ctx.backend.respond("getAttributes", json!({"hw": "rev2"}));
    ctx.backend.fail_remote("getTags", 500, "tag store offline");

    let response = ctx.call("getTargetDetails", json!({"controllerId": "dev-01"})).await;

    assert!(!response.is_error);
    let value = structured(&response);
    assert_eq!(value["attributes"]["hw"], "rev2");
    assert!(value.get("tags").is_none());
    assert!(value["tags_error"].as_str().unwrap().contains("tag store offline"));
    assert_eq!(value["partial"], true);
    assert_eq!(value["failedParts"], json!(["tags"]));
    // later parts are still fetched
    assert!(value.get("metadata").is_some());
}

#[tokio::test]
async fn test_undecodable_part_is_captured() {
    let ctx = TestContext::new();
    ctx.backend.fail(
        "getInstalledDistributionSet",
        Failure::Decode("expected value at line 1 column 1".to_string()),
    );

    let response = ctx.call("getTargetDetails", json!({"controllerId": "dev-01"})).await;

    let value = structured(&response);
    assert_eq!(value["failedParts"], json!(["installedDistributionSet"]));
    assert!(value["installedDistributionSet_error"].is_string());
}

#[tokio::test]
async fn test_unreachable_tags_are_captured() {
    let ctx = TestContext::new();
    ctx.backend.respond("getAttributes", json!({"hw": "rev2"}));
    ctx.backend.fail("getTags", Failure::Transport);

    let response = ctx.call("getTargetDetails", json!({"controllerId": "dev-01"})).await;

    assert!(!response.is_error);
    let value = structured(&response);
    assert_eq!(value["attributes"]["hw"], "rev2");
    assert!(value["tags_error"].as_str().unwrap().starts_with("getTags failed"));
    assert_eq!(value["failedParts"], json!(["tags"]));
    assert_eq!(ctx.backend.operations(), ALL_PARTS);
}

#[tokio::test]
async fn test_missing_target_is_reported_with_other_parts() {
    let ctx = TestContext::new();
    ctx.backend.fail_remote("getTarget", 404, "target dev-99 not found");

    let response = ctx.call("getTargetDetails", json!({"controllerId": "dev-99"})).await;

    assert!(!response.is_error);
    let value = structured(&response);
    assert!(value.get("target").is_none());
    assert!(value["target_error"].as_str().unwrap().contains("target dev-99 not found"));
    assert_eq!(value["failedParts"], json!(["target"]));
    assert_eq!(ctx.backend.operations(), ALL_PARTS);
}

#[tokio::test]
async fn test_timed_out_part_keeps_loaded_parts() {
    let server = MockServer::start();
    for (part, body) in [
        ("", json!({"controllerId": "dev-1", "name": "Device 1"})),
        ("/attributes", json!({"hw": "rev2"})),
        ("/assignedDS", json!({"id": 4})),
        ("/installedDS", json!({"id": 3})),
        ("/metadata", json!({"content": []})),
    ] {
        let path = format!("/rest/v1/targets/dev-1{part}");
        server.mock(|when, then| {
            when.method(GET).path(path);
            then.status(200).json_body(body);
        });
    }
    server.mock(|when, then| {
        when.method(GET).path("/rest/v1/targets/dev-1/tags");
        then.status(200).delay(Duration::from_millis(800)).json_body(json!([]));
    });
    let config = ServerConfig {
        mgmt_url: server.base_url(),
        request_timeout_ms: 200,
        ..ServerConfig::default()
    };
    let client = HttpManagementClient::new(&config, Arc::new(NoAuth)).unwrap();

    let value = target_details(&client, "dev-1").await.unwrap();

    assert_eq!(value["target"]["name"], "Device 1");
    assert_eq!(value["attributes"]["hw"], "rev2");
    assert_eq!(value["installedDistributionSet"]["id"], 3);
    assert!(value["tags_error"].is_string());
    assert_eq!(value["partial"], true);
    assert_eq!(value["failedParts"], json!(["tags"]));
}

#[tokio::test]
async fn test_auth_failure_aborts() {
    let ctx = TestContext::new();
    ctx.backend.fail("getTags", Failure::Auth("token expired".to_string()));

    let response = ctx.call("getTargetDetails", json!({"controllerId": "dev-01"})).await;

    assert_error_kind(&response, "RemoteError");
    assert_eq!(
        ctx.backend.operations(),
        vec!["getTarget", "getAttributes", "getTags"]
    );
}

#[tokio::test]
async fn test_controller_id_is_required() {
    let ctx = TestContext::new();

    let response = ctx.call("getTargetDetails", json!({"controllerId": "  "})).await;

    assert_error_kind(&response, "MissingRequiredField");
    assert_eq!(structured(&response)["fields"], json!(["controllerId"]));
    assert_eq!(ctx.backend.call_count(), 0);
}
