//! Integration tests for the registry clients

use futures::StreamExt;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use provmirror_errors::ErrorKind;
use provmirror_net::NetClient;
use provmirror_registry::{
    GpgKeyClient, KeyRegistry, PrivateRegistryClient, ProviderRegistry, SourceClient,
    SourceRegistry,
};
use provmirror_types::{PlatformTarget, ProviderRef, RegistryTarget, VersionSpec};
use serde_json::json;

const PROVIDERS: &str = "/api/v2/organizations/acme/registry-providers";
const AWS: &str = "/api/v2/organizations/acme/registry-providers/private/acme/aws";

fn net() -> NetClient {
    NetClient::with_defaults().unwrap()
}

fn private(server: &MockServer) -> PrivateRegistryClient {
    PrivateRegistryClient::new(net(), &server.base_url(), "secret-token")
}

fn aws() -> RegistryTarget {
    RegistryTarget::private("acme", "aws")
}

#[tokio::test]
async fn test_latest_version() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/providers/hashicorp/aws");
            then.status(200)
                .json_body(json!({"id": "hashicorp/aws/6.26.0", "version": "6.26.0"}));
        })
        .await;

    let source = SourceClient::new(net(), &server.base_url());
    let version = source
        .latest_version(&ProviderRef::new("hashicorp", "aws"))
        .await
        .unwrap();
    assert_eq!(version, "6.26.0");
}

#[tokio::test]
async fn test_latest_version_missing_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/providers/hashicorp/gone");
            then.status(200).json_body(json!({"id": "hashicorp/gone"}));
        })
        .await;

    let source = SourceClient::new(net(), &server.base_url());
    let err = source
        .latest_version(&ProviderRef::new("hashicorp", "gone"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_download_descriptor_and_signing_keys() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/providers/hashicorp/aws/6.26.0/download/linux/amd64");
            then.status(200).json_body(json!({
                "os": "linux",
                "arch": "amd64",
                "filename": "terraform-provider-aws_6.26.0_linux_amd64.zip",
                "download_url": "https://releases.example/aws_linux_amd64.zip",
                "shasums_url": "https://releases.example/SHA256SUMS",
                "shasums_signature_url": "",
                "signing_keys": {
                    "gpg_public_keys": [
                        {"key_id": "34365D9472D7468F", "ascii_armor": "-----BEGIN PGP PUBLIC KEY BLOCK-----"}
                    ]
                }
            }));
        })
        .await;

    let source = SourceClient::new(net(), &server.base_url());
    let spec = VersionSpec::new(ProviderRef::new("hashicorp", "aws"), "6.26.0");
    let descriptor = source
        .download_descriptor(&spec, &PlatformTarget::new("linux", "amd64"))
        .await
        .unwrap();

    assert_eq!(descriptor.checksums_url(), Some("https://releases.example/SHA256SUMS"));
    assert_eq!(descriptor.signature_url(), None);

    let keys = source
        .signing_keys(&spec.provider, Some("6.26.0"))
        .await
        .unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].key_id, "34365D9472D7468F");
}

#[tokio::test]
async fn test_download_descriptor_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/providers/hashicorp/aws/6.26.0/download/plan9/mips");
            then.status(404).json_body(json!({"errors": ["Not Found"]}));
        })
        .await;

    let source = SourceClient::new(net(), &server.base_url());
    let spec = VersionSpec::new(ProviderRef::new("hashicorp", "aws"), "6.26.0");
    let err = source
        .download_descriptor(&spec, &PlatformTarget::new("plan9", "mips"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_provider_exists_sends_auth() {
    let server = MockServer::start_async().await;
    let found = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(AWS)
                .header("authorization", "Bearer secret-token")
                .header("content-type", "application/vnd.api+json");
            then.status(200).json_body(json!({"data": {"attributes": {"name": "aws"}}}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v2/organizations/acme/registry-providers/private/acme/azurerm");
            then.status(404);
        })
        .await;

    let client = private(&server);
    assert!(client.provider_exists(&aws()).await.unwrap());
    assert!(!client
        .provider_exists(&RegistryTarget::private("acme", "azurerm"))
        .await
        .unwrap());
    found.assert_async().await;
}

#[tokio::test]
async fn test_create_provider_body() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path(PROVIDERS).json_body(json!({
                "data": {
                    "type": "registry-providers",
                    "attributes": {"name": "aws", "namespace": "acme", "registry-name": "private"}
                }
            }));
            then.status(201).json_body(json!({"data": {"attributes": {"name": "aws"}}}));
        })
        .await;

    private(&server).create_provider(&aws()).await.unwrap();
    create.assert_async().await;
}

#[tokio::test]
async fn test_create_version_returns_upload_targets() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{AWS}/versions")).json_body(json!({
                "data": {
                    "type": "registry-provider-versions",
                    "attributes": {
                        "version": "6.26.0",
                        "key-id": "34365D9472D7468F",
                        "protocols": ["5.0", "6.0"]
                    }
                }
            }));
            then.status(201).json_body(json!({
                "data": {
                    "attributes": {"version": "6.26.0"},
                    "links": {
                        "shasums-upload": "https://archivist.example/sums",
                        "shasums-sig-upload": "https://archivist.example/sig"
                    }
                }
            }));
        })
        .await;

    let targets = private(&server)
        .create_version(
            &aws(),
            "6.26.0",
            "34365D9472D7468F",
            &["5.0".to_string(), "6.0".to_string()],
        )
        .await
        .unwrap();
    assert_eq!(targets.checksums_upload, "https://archivist.example/sums");
    assert_eq!(targets.signature_upload, "https://archivist.example/sig");
}

#[tokio::test]
async fn test_create_existing_version_is_conflict() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path(format!("{AWS}/versions"));
            then.status(422)
                .body(r#"{"errors":[{"status":"422","detail":"Version has already been taken"}]}"#);
        })
        .await;

    let err = private(&server)
        .create_version(&aws(), "6.26.0", "KEY", &["6.0".to_string()])
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert!(err.remote_body().unwrap().contains("already been taken"));
}

#[tokio::test]
async fn test_create_platform_returns_binary_target() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{AWS}/versions/6.26.0/platforms"))
                .json_body(json!({
                    "data": {
                        "type": "registry-provider-version-platforms",
                        "attributes": {
                            "os": "darwin",
                            "arch": "arm64",
                            "shasum": "abc123",
                            "filename": "terraform-provider-aws_6.26.0_darwin_arm64.zip"
                        }
                    }
                }));
            then.status(201).json_body(json!({
                "data": {"links": {"provider-binary-upload": "https://archivist.example/bin"}}
            }));
        })
        .await;

    let target = private(&server)
        .create_platform(
            &aws(),
            "6.26.0",
            &PlatformTarget::new("darwin", "arm64"),
            "terraform-provider-aws_6.26.0_darwin_arm64.zip",
            "abc123",
        )
        .await
        .unwrap();
    assert_eq!(target, "https://archivist.example/bin");
}

#[tokio::test]
async fn test_list_versions_follows_relative_next() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{AWS}/versions"));
            then.status(200).json_body(json!({
                "data": [
                    {"attributes": {"version": "1.0.0"}},
                    {"attributes": {"version": "1.1.0"}}
                ],
                "links": {"next": format!("{AWS}/versions/page/2")}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{AWS}/versions/page/2"));
            then.status(200).json_body(json!({
                "data": [{"attributes": {"version": "1.2.0", "protocols": ["6.0"]}}],
                "links": {"next": null}
            }));
        })
        .await;

    let versions = private(&server).list_versions(&aws()).await.unwrap();
    let names: Vec<&str> = versions.iter().map(|v| v.version.as_str()).collect();
    assert_eq!(names, vec!["1.0.0", "1.1.0", "1.2.0"]);
    assert_eq!(versions[2].attributes["protocols"], json!(["6.0"]));
}

#[tokio::test]
async fn test_list_providers_keeps_attributes() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(PROVIDERS);
            then.status(200).json_body(json!({
                "data": [
                    {"attributes": {"name": "aws", "namespace": "acme", "registry-name": "private"}},
                    {"attributes": {"name": "random"}}
                ]
            }));
        })
        .await;

    let providers = private(&server).list_providers("acme").await.unwrap();
    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0].registry_name(), Some("private"));
    assert_eq!(providers[1].namespace(), None);
}

#[tokio::test]
async fn test_delete_version_statuses() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{AWS}/versions/1.0.0"));
            then.status(204);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{AWS}/versions/0.9.0"));
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{AWS}/versions/0.8.0"));
            then.status(500).body("boom");
        })
        .await;

    let client = private(&server);
    client.delete_version(&aws(), "1.0.0").await.unwrap();
    assert!(client.delete_version(&aws(), "0.9.0").await.unwrap_err().is_not_found());
    let err = client.delete_version(&aws(), "0.8.0").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_upload_streams_without_auth() {
    let server = MockServer::start_async().await;
    let put = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/presigned/bin")
                .header("content-length", "11")
                .body("hello world");
            then.status(200);
        })
        .await;

    let body = futures::stream::iter(vec![
        Ok(bytes::Bytes::from_static(b"hello ")),
        Ok(bytes::Bytes::from_static(b"world")),
    ])
    .boxed();
    private(&server)
        .upload(&server.url("/presigned/bin"), body, 11)
        .await
        .unwrap();
    put.assert_async().await;
}

#[test]
fn test_registry_location() {
    let client = PrivateRegistryClient::new(net(), "https://app.terraform.io/", "t");
    assert_eq!(
        client.registry_location(&aws(), "6.26.0"),
        "https://app.terraform.io/app/acme/registry/private/providers/acme/aws/6.26.0"
    );
}

#[tokio::test]
async fn test_gpg_key_lifecycle() {
    let server = MockServer::start_async().await;
    let key = json!({
        "data": {
            "type": "gpg-keys",
            "id": "13",
            "attributes": {
                "key-id": "34365D9472D7468F",
                "namespace": "acme",
                "ascii-armor": "-----BEGIN PGP PUBLIC KEY BLOCK-----",
                "created-at": "2025-01-01T00:00:00Z"
            }
        }
    });
    let list = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/registry/private/v2/gpg-keys")
                .query_param("filter[namespace]", "acme");
            then.status(200).json_body(json!({"data": [key["data"].clone()]}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/registry/private/v2/gpg-keys")
                .json_body(json!({
                    "data": {
                        "type": "gpg-keys",
                        "attributes": {"namespace": "acme", "ascii-armor": "ARMOR"}
                    }
                }));
            then.status(201).json_body(key.clone());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/registry/private/v2/gpg-keys/acme/34365D9472D7468F");
            then.status(200).json_body(key.clone());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/registry/private/v2/gpg-keys/acme/MISSING");
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/registry/private/v2/gpg-keys/acme/34365D9472D7468F");
            then.status(200).json_body(key.clone());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/registry/private/v2/gpg-keys/acme/34365D9472D7468F");
            then.status(204);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/api/registry/private/v2/gpg-keys/acme/MISSING");
            then.status(404);
        })
        .await;

    let keys = GpgKeyClient::new(net(), &server.base_url(), "acme", "secret-token");

    let listed = keys.list_keys().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].created_at.as_deref(), Some("2025-01-01T00:00:00Z"));
    list.assert_async().await;

    let created = keys.create_key("ARMOR").await.unwrap();
    assert_eq!(created.key_id, "34365D9472D7468F");

    assert!(keys.get_key("34365D9472D7468F").await.unwrap().is_some());
    assert!(keys.get_key("MISSING").await.unwrap().is_none());

    keys.update_key("34365D9472D7468F", "ARMOR").await.unwrap();

    assert!(keys.delete_key("34365D9472D7468F").await.unwrap());
    assert!(!keys.delete_key("MISSING").await.unwrap());
}
