//! Integration tests for config

#[cfg(test)]
mod tests {
    use provmirror_config::*;
    use provmirror_errors::{ConfigError, Error};
    use provmirror_types::OutputFormat;
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.registry.address, "https://app.terraform.io");
        assert_eq!(config.source.address, "https://registry.terraform.io");
        assert_eq!(config.registry.token_env, "TFC_TOKEN");
        assert_eq!(config.registry.protocols, vec!["5.0", "6.0"]);
        assert_eq!(config.network.api_timeout, 10);
        assert_eq!(config.network.source_timeout, 30);
        assert_eq!(config.network.transfer_timeout, 300);
        assert_eq!(config.sync.parallel_uploads, 1);
        assert_eq!(config.retention.keep_count, 10);
        assert!(!config.retention.dry_run);
        assert_eq!(config.retention.default_registry_name, "private");
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
default_output = "json"

[registry]
address = "https://tfe.example.com"
organization = "acme"
protocols = ["6.0"]

[network]
api_timeout = 5
ca_bundle = "/etc/ssl/internal.pem"

[sync]
parallel_downloads = 8

[retention]
keep_count = 3
dry_run = true
default_namespace = "platform"
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.default_output, OutputFormat::Json);
        assert_eq!(config.registry.address, "https://tfe.example.com");
        assert_eq!(config.organization().unwrap(), "acme");
        assert_eq!(config.registry.protocols, vec!["6.0"]);
        assert_eq!(config.network.api_timeout, 5);
        assert_eq!(config.network.source_timeout, 30);
        assert_eq!(
            config.network.ca_bundle,
            Some(PathBuf::from("/etc/ssl/internal.pem"))
        );
        assert_eq!(config.sync.parallel_downloads, 8);
        assert_eq!(config.retention.keep_count, 3);
        assert!(config.retention.dry_run);
        assert_eq!(config.default_namespace("acme"), "platform");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let err = Config::load_from_file(std::path::Path::new("/nonexistent/provmirror.toml"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_toml("[retention]\nkeep_count = \"many\"").unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_merge_env_precedence() {
        let mut config = Config::default();
        config
            .merge_env_from(lookup(&[
                ("PROVMIRROR_ORGANIZATION", "acme"),
                ("TFC_ORGANIZATION", "ignored"),
                ("TFC_ADDRESS", "https://tfe.example.com"),
                ("PROVMIRROR_KEEP_COUNT", "5"),
                ("PROVMIRROR_DRY_RUN", "yes"),
                ("PROVMIRROR_STORE_PATH", "/var/tmp/provmirror"),
            ]))
            .unwrap();

        assert_eq!(config.organization().unwrap(), "acme");
        assert_eq!(config.registry.address, "https://tfe.example.com");
        assert_eq!(config.retention.keep_count, 5);
        assert!(config.retention.dry_run);
        assert_eq!(
            config.sync.store_path,
            Some(PathBuf::from("/var/tmp/provmirror"))
        );
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = Config::default();
        let result = config.merge_env_from(lookup(&[("PROVMIRROR_KEEP_COUNT", "ten")]));
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue { .. }))
        ));

        let result = config.merge_env_from(lookup(&[("PROVMIRROR_DRY_RUN", "maybe")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_organization() {
        let config = Config::default();
        let err = config.organization().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField { ref field }) if field == "registry.organization"
        ));
        assert_eq!(config.default_namespace("acme"), "acme");
    }

    #[test]
    fn test_validate_rejects_zero_parallelism() {
        let mut config = Config::default();
        config.sync.parallel_uploads = 0;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_registry_token_sources() {
        let mut token_file = NamedTempFile::new().unwrap();
        writeln!(token_file, "  file-token  ").unwrap();

        let mut config = Config::default();
        config.registry.token_env = "PROVMIRROR_TEST_TOKEN_A".to_string();
        config.registry.token_file = Some(token_file.path().to_path_buf());

        {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            std::env::remove_var("PROVMIRROR_TEST_TOKEN_A");
        }
        assert_eq!(config.registry_token().await.unwrap(), "file-token");

        {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            std::env::set_var("PROVMIRROR_TEST_TOKEN_A", "env-token");
        }
        assert_eq!(config.registry_token().await.unwrap(), "env-token");

        {
            let _guard = ENV_TEST_MUTEX.lock().unwrap();
            std::env::remove_var("PROVMIRROR_TEST_TOKEN_A");
        }
    }

    #[tokio::test]
    async fn test_registry_token_missing() {
        let mut config = Config::default();
        config.registry.token_env = "PROVMIRROR_TEST_TOKEN_UNSET".to_string();
        let err = config.registry_token().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::EnvVarNotFound { ref var }) if var == "PROVMIRROR_TEST_TOKEN_UNSET"
        ));
    }

    #[tokio::test]
    async fn test_load_provider_document() {
        let mut doc = NamedTempFile::new().unwrap();
        write!(
            doc,
            r#"{{"provider": "aws", "namespace": "hashicorp", "version": "6.26.0",
                "platforms": [{{"os": "linux", "arch": "amd64"}}]}}"#
        )
        .unwrap();
        let parsed = ProviderSyncDocument::load(doc.path()).await.unwrap();
        assert_eq!(parsed.providers[0].version, "6.26.0");
    }
}
