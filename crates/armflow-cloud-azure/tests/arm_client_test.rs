use armflow_cloud::{PollConfig, PollStatus, ResourcePath, Workflow};
use armflow_cloud_azure::{
    AccessToken, ArmClient, AzureError, AzureProvider, Method, PollState,
};
use armflow_config::{Overrides, PrefixPolicy, Profile, Settings};
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

const RG_PATH: &str = "/subscriptions/sub/resourceGroups/alice-rg";
const VMSS_PATH: &str = "/subscriptions/sub/resourceGroups/alice-rg/providers/Microsoft.Compute/virtualMachineScaleSets/alice-vmss";

fn client(server: &MockServer) -> ArmClient {
    ArmClient::new("sub", AccessToken::new("tok")).with_endpoint(server.base_url())
}

fn group_path() -> ResourcePath {
    ResourcePath::resource_group("alice-rg")
}

fn scale_set_path() -> ResourcePath {
    ResourcePath::scale_set("alice-rg", "alice-vmss")
}

#[tokio::test]
async fn test_synchronous_put_is_done_immediately() {
    let server = MockServer::start_async().await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(RG_PATH)
                .query_param("api-version", "2021-04-01")
                .header("authorization", "Bearer tok")
                .json_body(json!({ "location": "westus2" }));
            then.status(201).json_body(json!({
                "id": RG_PATH,
                "name": "alice-rg",
                "properties": { "provisioningState": "Succeeded" }
            }));
        })
        .await;

    let client = client(&server);
    let state = client
        .begin(
            Method::Put,
            &group_path(),
            "2021-04-01",
            &json!({ "location": "westus2" }),
        )
        .await
        .unwrap();
    assert!(matches!(state, PollState::Done { ref status, .. } if status == "201 Created"));

    match client.check(&state).await.unwrap() {
        PollStatus::Succeeded(outcome) => {
            assert_eq!(outcome.resource.unwrap()["id"], RG_PATH);
        }
        other => panic!("Expected Succeeded, got {:?}", other),
    }
    put.assert_async().await;
}

#[tokio::test]
async fn test_async_operation_header_then_final_get() {
    let server = MockServer::start_async().await;
    let operation_url = server.url("/operations/op-1");

    let put = {
        let operation_url = operation_url.clone();
        server
            .mock_async(move |when, then| {
                when.method(PUT).path(VMSS_PATH);
                then.status(201)
                    .header("Azure-AsyncOperation", operation_url)
                    .json_body(json!({
                        "id": VMSS_PATH,
                        "properties": { "provisioningState": "Creating" }
                    }));
            })
            .await
    };

    let client = client(&server);
    let state = client
        .begin(Method::Put, &scale_set_path(), "2021-07-01", &json!({}))
        .await
        .unwrap();
    put.assert_async().await;
    assert!(matches!(state, PollState::AsyncOperation { ref url, .. } if url == &operation_url));

    let mut in_progress = server
        .mock_async(|when, then| {
            when.method(GET).path("/operations/op-1");
            then.status(200).json_body(json!({ "status": "InProgress" }));
        })
        .await;
    assert_eq!(client.check(&state).await.unwrap(), PollStatus::Pending);
    in_progress.delete_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/operations/op-1");
            then.status(200).json_body(json!({ "status": "Succeeded" }));
        })
        .await;
    let final_get = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(VMSS_PATH)
                .query_param("api-version", "2021-07-01");
            then.status(200).json_body(json!({
                "id": VMSS_PATH,
                "name": "alice-vmss",
                "properties": { "provisioningState": "Succeeded" }
            }));
        })
        .await;

    match client.check(&state).await.unwrap() {
        PollStatus::Succeeded(outcome) => {
            assert_eq!(outcome.status, "200 OK");
            assert_eq!(outcome.resource.unwrap()["name"], "alice-vmss");
        }
        other => panic!("Expected Succeeded, got {:?}", other),
    }
    final_get.assert_async().await;
}

#[tokio::test]
async fn test_async_operation_failure_carries_error() {
    let server = MockServer::start_async().await;
    let operation_url = server.url("/operations/op-2");

    server
        .mock_async(move |when, then| {
            when.method(PUT).path(VMSS_PATH);
            then.status(201)
                .header("Azure-AsyncOperation", operation_url);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/operations/op-2");
            then.status(200).json_body(json!({
                "status": "Failed",
                "error": { "code": "SkuNotAvailable", "message": "Basic_A0 is not available" }
            }));
        })
        .await;

    let client = client(&server);
    let state = client
        .begin(Method::Put, &scale_set_path(), "2021-07-01", &json!({}))
        .await
        .unwrap();

    match client.check(&state).await.unwrap() {
        PollStatus::Failed(reason) => {
            assert_eq!(reason, "SkuNotAvailable: Basic_A0 is not available");
        }
        other => panic!("Expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_post_action_follows_location() {
    let server = MockServer::start_async().await;
    let location = server.url("/operations/loc-1");

    let post = {
        let location = location.clone();
        server
            .mock_async(move |when, then| {
                when.method(POST)
                    .path(format!("{}/manualupgrade", VMSS_PATH))
                    .json_body(json!({ "instanceIds": ["0"] }));
                then.status(202).header("Location", location);
            })
            .await
    };

    let client = client(&server);
    let state = client
        .begin(
            Method::Post,
            &scale_set_path().child("manualupgrade"),
            "2021-07-01",
            &json!({ "instanceIds": ["0"] }),
        )
        .await
        .unwrap();
    post.assert_async().await;
    assert_eq!(state, PollState::Location { url: location });

    let mut accepted = server
        .mock_async(|when, then| {
            when.method(GET).path("/operations/loc-1");
            then.status(202);
        })
        .await;
    assert_eq!(client.check(&state).await.unwrap(), PollStatus::Pending);
    accepted.delete_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/operations/loc-1");
            then.status(200);
        })
        .await;
    match client.check(&state).await.unwrap() {
        PollStatus::Succeeded(outcome) => {
            assert_eq!(outcome.status, "200 OK");
            assert!(outcome.resource.is_none());
        }
        other => panic!("Expected Succeeded, got {:?}", other),
    }
}

#[tokio::test]
async fn test_provisioning_state_fallback() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(PUT).path(RG_PATH);
            then.status(201).json_body(json!({
                "id": RG_PATH,
                "properties": { "provisioningState": "Accepted" }
            }));
        })
        .await;

    let client = client(&server);
    let state = client
        .begin(Method::Put, &group_path(), "2021-04-01", &json!({}))
        .await
        .unwrap();
    assert!(matches!(state, PollState::ProvisioningState { .. }));

    let mut creating = server
        .mock_async(|when, then| {
            when.method(GET).path(RG_PATH);
            then.status(200).json_body(json!({
                "id": RG_PATH,
                "properties": { "provisioningState": "Creating" }
            }));
        })
        .await;
    assert_eq!(client.check(&state).await.unwrap(), PollStatus::Pending);
    creating.delete_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path(RG_PATH);
            then.status(200).json_body(json!({
                "id": RG_PATH,
                "properties": { "provisioningState": "Failed" }
            }));
        })
        .await;
    assert!(matches!(
        client.check(&state).await.unwrap(),
        PollStatus::Failed(_)
    ));
}

#[tokio::test]
async fn test_rejected_request_is_api_error() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(PUT).path(RG_PATH);
            then.status(400).json_body(json!({
                "error": {
                    "code": "LocationNotAvailableForResourceGroup",
                    "message": "The provided location 'mars' is not available"
                }
            }));
        })
        .await;

    let result = client(&server)
        .begin(Method::Put, &group_path(), "2021-04-01", &json!({}))
        .await;

    match result {
        Err(AzureError::Api {
            status,
            code,
            message,
        }) => {
            assert_eq!(status, 400);
            assert_eq!(code, "LocationNotAvailableForResourceGroup");
            assert!(message.contains("mars"));
        }
        other => panic!("Expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_workflow_step_through_provider() {
    let server = MockServer::start_async().await;

    let put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path(RG_PATH)
                .header("authorization", "Bearer tok")
                .json_body(json!({ "location": "eastus" }));
            then.status(201).json_body(json!({
                "id": RG_PATH,
                "name": "alice-rg",
                "properties": { "provisioningState": "Succeeded" }
            }));
        })
        .await;

    let settings = Settings::from_sources(
        |key: &str| match key {
            "AZURE_SUBSCRIPTION_ID" => Some("sub".to_string()),
            "MS_ALIAS" => Some("alice".to_string()),
            _ => None,
        },
        &Profile::default(),
        Overrides {
            location: Some("eastus".to_string()),
            ..Default::default()
        },
        PrefixPolicy::Required,
    )
    .unwrap();

    let provider = AzureProvider::new(client(&server));
    let workflow =
        Workflow::new(&provider, &settings).with_poll_config(PollConfig::fixed(Duration::ZERO));

    let group = workflow.create_resource_group().await.unwrap();
    assert_eq!(group.id, RG_PATH);
    assert_eq!(group.name.as_deref(), Some("alice-rg"));
    put.assert_async().await;
}

#[tokio::test]
async fn test_manual_upgrade_reads_final_status_from_location() {
    let server = MockServer::start_async().await;
    let operation_url = server.url("/operations/op-3");
    let location = server.url("/operations/op-3/result");

    {
        let operation_url = operation_url.clone();
        let location = location.clone();
        server
            .mock_async(move |when, then| {
                when.method(POST).path(format!("{}/manualupgrade", VMSS_PATH));
                then.status(202)
                    .header("Azure-AsyncOperation", operation_url)
                    .header("Location", location);
            })
            .await;
    }

    let client = client(&server);
    let state = client
        .begin(
            Method::Post,
            &scale_set_path().child("manualupgrade"),
            "2021-07-01",
            &json!({ "instanceIds": ["0"] }),
        )
        .await
        .unwrap();
    assert_eq!(
        state,
        PollState::AsyncOperation {
            url: operation_url,
            final_url: Some(location),
        }
    );

    server
        .mock_async(|when, then| {
            when.method(GET).path("/operations/op-3");
            then.status(200).json_body(json!({ "status": "Succeeded" }));
        })
        .await;
    let result = server
        .mock_async(|when, then| {
            when.method(GET).path("/operations/op-3/result");
            then.status(200);
        })
        .await;

    match client.check(&state).await.unwrap() {
        PollStatus::Succeeded(outcome) => {
            assert_eq!(outcome.status, "200 OK");
            assert!(outcome.resource.is_none());
        }
        other => panic!("Expected Succeeded, got {:?}", other),
    }
    result.assert_async().await;
}

#[tokio::test]
async fn test_post_with_async_operation_only_uses_status_response() {
    let server = MockServer::start_async().await;
    let operation_url = server.url("/operations/op-4");

    {
        let operation_url = operation_url.clone();
        server
            .mock_async(move |when, then| {
                when.method(POST).path(format!("{}/manualupgrade", VMSS_PATH));
                then.status(202).header("Azure-AsyncOperation", operation_url);
            })
            .await;
    }

    let client = client(&server);
    let state = client
        .begin(
            Method::Post,
            &scale_set_path().child("manualupgrade"),
            "2021-07-01",
            &json!({ "instanceIds": ["0"] }),
        )
        .await
        .unwrap();
    assert_eq!(
        state,
        PollState::AsyncOperation {
            url: operation_url,
            final_url: None,
        }
    );

    let status = server
        .mock_async(|when, then| {
            when.method(GET).path("/operations/op-4");
            then.status(200).json_body(json!({ "status": "Succeeded" }));
        })
        .await;

    match client.check(&state).await.unwrap() {
        PollStatus::Succeeded(outcome) => {
            assert_eq!(outcome.status, "200 OK");
            assert!(outcome.resource.is_none());
        }
        other => panic!("Expected Succeeded, got {:?}", other),
    }
    status.assert_calls_async(1).await;
}
