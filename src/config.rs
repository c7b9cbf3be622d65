//! Authority Configuration
//!
//! The signing domain, primary type and type schema the authority builds
//! payloads with. Loaded once at startup and read-only afterwards.
//!
//! Sources, in order of precedence:
//! - `HERO_AUTH_DOMAIN_NAME`, `HERO_AUTH_DOMAIN_VERSION`, `HERO_AUTH_CHAIN_ID`,
//!   `HERO_AUTH_VERIFYING_CONTRACT` override single domain fields
//! - a JSON file named by `HERO_AUTH_CONFIG`, or `--config` on the CLI
//!   (the domain overrides above still apply)
//! - the built-in default below

use crate::eip712::{validate_schema, Eip712Domain, TypeSchema, TypedDataField, DOMAIN_TYPE};
use crate::error::{AuthorityError, AuthorityResult};
use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_CONFIG_PATH: &str = "HERO_AUTH_CONFIG";
pub const ENV_DOMAIN_NAME: &str = "HERO_AUTH_DOMAIN_NAME";
pub const ENV_DOMAIN_VERSION: &str = "HERO_AUTH_DOMAIN_VERSION";
pub const ENV_CHAIN_ID: &str = "HERO_AUTH_CHAIN_ID";
pub const ENV_VERIFYING_CONTRACT: &str = "HERO_AUTH_VERIFYING_CONTRACT";

const DEFAULT_DOMAIN_NAME: &str = "GameItem";
const DEFAULT_DOMAIN_VERSION: &str = "1";
const DEFAULT_CHAIN_ID: u64 = 4;
const DEFAULT_VERIFYING_CONTRACT: &str = "0xb48366c616c7ce992981cfb354301da161687855";
const DEFAULT_PRIMARY_TYPE: &str = "ItemInfo";

/// Domain, primary type and schema for authorization payloads
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityConfig {
    pub domain: Eip712Domain,
    pub primary_type: String,
    pub types: TypeSchema,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        let mut types = TypeSchema::new();
        types.insert(DOMAIN_TYPE.to_string(), Eip712Domain::default_fields());
        types.insert(
            DEFAULT_PRIMARY_TYPE.to_string(),
            vec![
                TypedDataField::new("tokenId", "uint256"),
                TypedDataField::new("itemType", "uint256"),
                TypedDataField::new("strength", "uint256"),
                TypedDataField::new("level", "uint256"),
                TypedDataField::new("expireTime", "uint256"),
            ],
        );

        Self {
            domain: Eip712Domain {
                name: DEFAULT_DOMAIN_NAME.to_string(),
                version: DEFAULT_DOMAIN_VERSION.to_string(),
                chain_id: DEFAULT_CHAIN_ID,
                verifying_contract: DEFAULT_VERIFYING_CONTRACT.to_string(),
            },
            primary_type: DEFAULT_PRIMARY_TYPE.to_string(),
            types,
        }
    }
}

impl AuthorityConfig {
    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> AuthorityResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            AuthorityError::config_error("invalid configuration JSON").with_details(e.to_string())
        })?;
        config.validate()
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> AuthorityResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AuthorityError::config_error(format!("cannot read {}", path.display()))
                .with_details(e.to_string())
        })?;
        Self::from_json_str(&contents)
    }

    /// Build the configuration from the process environment
    pub fn from_env() -> AuthorityResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load a JSON file, then apply the domain overrides from the environment
    pub fn from_file_with_env(path: impl AsRef<Path>) -> AuthorityResult<Self> {
        Self::from_file(path)?.with_overrides(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> AuthorityResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match lookup(ENV_CONFIG_PATH) {
            Some(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };

        config.with_overrides(lookup)
    }

    /// Apply the single-field domain overrides and revalidate
    pub fn with_overrides<F>(mut self, lookup: F) -> AuthorityResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_DOMAIN_NAME) {
            self.domain.name = name;
        }
        if let Some(version) = lookup(ENV_DOMAIN_VERSION) {
            self.domain.version = version;
        }
        if let Some(chain_id) = lookup(ENV_CHAIN_ID) {
            self.domain.chain_id = chain_id.trim().parse().map_err(|_| {
                AuthorityError::config_error(format!("{} is not a chain id: {}", ENV_CHAIN_ID, chain_id))
            })?;
        }
        if let Some(contract) = lookup(ENV_VERIFYING_CONTRACT) {
            self.domain.verifying_contract = contract.trim().to_string();
        }

        self.validate()
    }

    /// Check the configuration and normalize the verifying contract to lowercase
    pub fn validate(mut self) -> AuthorityResult<Self> {
        if self.domain.name.trim().is_empty() {
            return Err(AuthorityError::config_error("domain name must not be empty"));
        }
        if self.domain.version.trim().is_empty() {
            return Err(AuthorityError::config_error("domain version must not be empty"));
        }

        let contract: Address = self.domain.verifying_contract.parse().map_err(|e| {
            AuthorityError::config_error("invalid verifying contract").with_details(format!("{}", e))
        })?;
        self.domain.verifying_contract = contract.to_lower_hex();

        validate_schema(&self.types, &self.primary_type).map_err(|e| {
            AuthorityError::config_error("invalid type schema").with_details(e.to_string())
        })?;

        // The domain struct only carries the four standard fields
        let supported = Eip712Domain::default_fields();
        if let Some(fields) = self.types.get(DOMAIN_TYPE) {
            for field in fields {
                if !supported.iter().any(|s| s.name == field.name) {
                    return Err(AuthorityError::config_error(format!(
                        "unsupported {} field: {}",
                        DOMAIN_TYPE, field.name
                    )));
                }
            }
        }

        Ok(self)
    }
}
