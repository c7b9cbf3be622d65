//! Typed-Data Builder
//!
//! Assembles the authorization payload a client signs. The builder owns the
//! immutable domain and schema and is shared read-only across requests.

use super::hasher::hash_typed_data;
use super::types::*;
use crate::config::AuthorityConfig;
use crate::types::ItemInfo;
use serde_json::{Map, Value};

/// Builds [`TypedPayload`]s for one domain, schema and primary type
#[derive(Debug, Clone, PartialEq)]
pub struct TypedDataBuilder {
    domain: Eip712Domain,
    types: TypeSchema,
    primary_type: String,
}

impl TypedDataBuilder {
    /// Create a builder after checking the schema resolves
    pub fn new(
        domain: Eip712Domain,
        types: TypeSchema,
        primary_type: impl Into<String>,
    ) -> Result<Self, Eip712Error> {
        let primary_type = primary_type.into();
        validate_schema(&types, &primary_type)?;

        Ok(Self {
            domain,
            types,
            primary_type,
        })
    }

    pub fn from_config(config: &AuthorityConfig) -> Result<Self, Eip712Error> {
        Self::new(
            config.domain.clone(),
            config.types.clone(),
            config.primary_type.clone(),
        )
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    pub fn types(&self) -> &TypeSchema {
        &self.types
    }

    pub fn primary_type(&self) -> &str {
        &self.primary_type
    }

    /// Bundle an item message into a payload ready for signing
    pub fn build(&self, item: &ItemInfo) -> Result<TypedPayload, Eip712Error> {
        let fields = match serde_json::to_value(item) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                return Err(Eip712Error::InvalidJson(format!(
                    "item did not serialize to an object: {}",
                    other
                )))
            }
            Err(e) => return Err(Eip712Error::InvalidJson(e.to_string())),
        };

        self.build_from_fields(&fields)
    }

    /// Assign every primary-type field its value from `fields`
    ///
    /// A schema field absent from `fields` is an error; fields the schema
    /// does not declare are dropped.
    pub fn build_from_fields(&self, fields: &Map<String, Value>) -> Result<TypedPayload, Eip712Error> {
        let schema_fields = self
            .types
            .get(&self.primary_type)
            .ok_or_else(|| Eip712Error::InvalidPrimaryType(self.primary_type.clone()))?;

        let mut message = Map::new();
        for field in schema_fields {
            let value = fields.get(&field.name).ok_or_else(|| {
                Eip712Error::SchemaFieldMissing(format!("{}.{}", self.primary_type, field.name))
            })?;
            message.insert(field.name.clone(), value.clone());
        }

        Ok(TypedData {
            types: self.types.clone(),
            primary_type: self.primary_type.clone(),
            domain: self.domain.clone(),
            message,
        })
    }

    /// Build and hash in one step
    pub fn build_with_digest(&self, item: &ItemInfo) -> Result<(TypedPayload, [u8; 32]), Eip712Error> {
        let payload = self.build(item)?;
        let digest = hash_typed_data(&payload)?;
        Ok((payload, digest))
    }
}
