//! Integration tests for the provmirror data model

use provmirror_types::*;

fn artifact(filename: &str) -> ArtifactRef {
    ArtifactRef {
        filename: filename.to_string(),
        location: ArtifactLocation::new(format!("tmp/aws/6.26.0/{filename}")),
    }
}

#[test]
fn test_latest_detection() {
    let provider = ProviderRef::new("hashicorp", "aws");
    assert!(VersionSpec::new(provider.clone(), "latest").is_latest());
    assert!(VersionSpec::new(provider.clone(), "LATEST").is_latest());
    let resolved = VersionSpec::new(provider, "Latest").resolved("6.26.0");
    assert!(!resolved.is_latest());
    assert_eq!(resolved.to_string(), "hashicorp/aws 6.26.0");
}

#[test]
fn test_platform_parsing() {
    let platform: PlatformTarget = "linux/amd64".parse().unwrap();
    assert_eq!(platform, PlatformTarget::new("linux", "amd64"));
    assert_eq!(platform.to_string(), "linux/amd64");

    assert!("linux".parse::<PlatformTarget>().is_err());
    assert!("/amd64".parse::<PlatformTarget>().is_err());
    assert!("linux/amd64/extra".parse::<PlatformTarget>().is_err());
}

#[test]
fn test_manifest_builder_sets_shared_artifacts_once() {
    let mut builder = ManifestBuilder::new();
    assert!(!builder.has_checksums());
    assert!(builder.set_checksums(artifact("terraform-provider-aws_6.26.0_SHA256SUMS")));
    assert!(!builder.set_checksums(artifact("other")));
    assert!(builder.set_signature(artifact("terraform-provider-aws_6.26.0_SHA256SUMS.sig")));
    assert!(!builder.set_signature(artifact("other.sig")));

    builder.push_binary(BinaryRef {
        platform: PlatformTarget::new("linux", "amd64"),
        filename: "terraform-provider-aws_6.26.0_linux_amd64.zip".into(),
        location: ArtifactLocation::new("tmp/aws/6.26.0/terraform-provider-aws_6.26.0_linux_amd64.zip"),
    });

    let manifest = builder.build();
    assert_eq!(manifest.binaries.len(), 1);
    assert_eq!(
        manifest.checksums.unwrap().filename,
        "terraform-provider-aws_6.26.0_SHA256SUMS"
    );
    assert_eq!(
        manifest.signature.unwrap().filename,
        "terraform-provider-aws_6.26.0_SHA256SUMS.sig"
    );
}

#[test]
fn test_artifact_naming() {
    let platform = PlatformTarget::new("darwin", "arm64");
    assert_eq!(
        binary_filename("aws", "6.26.0", &platform),
        "terraform-provider-aws_6.26.0_darwin_arm64.zip"
    );
    assert_eq!(
        checksums_filename("aws", "6.26.0"),
        "terraform-provider-aws_6.26.0_SHA256SUMS"
    );
    assert_eq!(
        signature_filename("aws", "6.26.0"),
        "terraform-provider-aws_6.26.0_SHA256SUMS.sig"
    );
    assert_eq!(store_prefix("aws", "6.26.0"), "tmp/aws/6.26.0/");
}

#[test]
fn test_stored_manifest_json_shape() {
    let stored = StoredManifest {
        provider: "aws".into(),
        namespace: "hashicorp".into(),
        version: "6.26.0".into(),
        gpg_key_id: Some("34365D9472D7468F".into()),
        manifest: ArtifactManifest::default(),
    };
    assert_eq!(stored.key(), "tmp/aws/6.26.0/manifest.json");

    let json = serde_json::to_value(&stored).unwrap();
    assert_eq!(json["gpgKeyId"], "34365D9472D7468F");
    let back: StoredManifest = serde_json::from_value(json).unwrap();
    assert_eq!(back, stored);
}

#[test]
fn test_provider_record_attributes() {
    let record: RegistryProviderRecord = serde_json::from_value(serde_json::json!({
        "name": "aws",
        "attributes": {"registry-name": "private", "namespace": "", "name": "aws"}
    }))
    .unwrap();
    assert_eq!(record.registry_name(), Some("private"));
    assert_eq!(record.namespace(), None);
}

#[test]
fn test_registry_target_private() {
    let target = RegistryTarget::private("acme", "aws");
    assert_eq!(target.namespace, "acme");
    assert_eq!(target.registry_name, "private");
    assert_eq!(target.to_string(), "acme/private/acme/aws");
}

#[test]
fn test_version_ordering_in_sort() {
    let mut versions = vec!["1.10.0", "v1.9.0", "garbage", "1.2", "2.0.0"];
    versions.sort_by(|a, b| VersionKey::parse(b).cmp(&VersionKey::parse(a)));
    assert_eq!(versions, vec!["2.0.0", "1.10.0", "v1.9.0", "1.2", "garbage"]);
}

mod version_props {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prefix_does_not_change_order(
            a in prop::collection::vec(0u64..1000, 1..4),
            b in prop::collection::vec(0u64..1000, 1..4),
        ) {
            let render = |parts: &[u64]| {
                parts.iter().map(u64::to_string).collect::<Vec<_>>().join(".")
            };
            let (plain_a, plain_b) = (render(&a), render(&b));
            prop_assert_eq!(
                VersionKey::parse(&plain_a).cmp(&VersionKey::parse(&plain_b)),
                VersionKey::parse(&format!("v{plain_a}")).cmp(&VersionKey::parse(&plain_b))
            );
        }

        #[test]
        fn display_round_trips(parts in prop::collection::vec(0u64..100_000, 1..5)) {
            let text = parts.iter().map(u64::to_string).collect::<Vec<_>>().join(".");
            prop_assert_eq!(VersionKey::parse(&text).to_string(), text);
        }
    }
}
