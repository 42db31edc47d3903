//! Defaults and environment variable names

pub const DEFAULT_REGISTRY_ADDRESS: &str = "https://app.terraform.io";
pub const DEFAULT_SOURCE_ADDRESS: &str = "https://registry.terraform.io";
pub const DEFAULT_TOKEN_ENV: &str = "TFC_TOKEN";
pub const DEFAULT_REGISTRY_NAME: &str = "private";
pub const DEFAULT_PROTOCOLS: [&str; 2] = ["5.0", "6.0"];

pub const ENV_ADDRESS: &str = "PROVMIRROR_ADDRESS";
pub const ENV_ORGANIZATION: &str = "PROVMIRROR_ORGANIZATION";
pub const ENV_KEEP_COUNT: &str = "PROVMIRROR_KEEP_COUNT";
pub const ENV_DRY_RUN: &str = "PROVMIRROR_DRY_RUN";
pub const ENV_CA_BUNDLE: &str = "PROVMIRROR_CA_BUNDLE";
pub const ENV_STORE_PATH: &str = "PROVMIRROR_STORE_PATH";

// Names used by existing HCP Terraform tooling
pub const ENV_TFC_ADDRESS: &str = "TFC_ADDRESS";
pub const ENV_TFC_ORGANIZATION: &str = "TFC_ORGANIZATION";
