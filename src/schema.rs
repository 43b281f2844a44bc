//! JSON Schema checks for catalog documents.
//!
//! The schema ships inside the binary (`schema/catalog.schema.json`). Loading
//! stays lenient regardless; validation is for catalog authors who want to
//! know which records the browser will silently degrade.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Bundled catalog schema source.
pub const CATALOG_SCHEMA: &str = include_str!("../schema/catalog.schema.json");

/// Compiled validator for the bundled schema.
pub struct CatalogSchema {
    compiled: JSONSchema,
}

impl CatalogSchema {
    pub fn bundled() -> Result<Self> {
        let raw: Value =
            serde_json::from_str(CATALOG_SCHEMA).context("parsing bundled catalog schema")?;
        Self::from_value(&raw)
    }

    /// Compile a schema read from `path` instead of the bundled one.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading schema {}", path.display()))?;
        let raw: Value = serde_json::from_str(&data)
            .with_context(|| format!("parsing schema {}", path.display()))?;
        Self::from_value(&raw).with_context(|| format!("compiling schema {}", path.display()))
    }

    fn from_value(raw: &Value) -> Result<Self> {
        let compiled = JSONSchema::compile(raw)
            .map_err(|err| anyhow!("compiling catalog schema: {err}"))?;
        Ok(Self { compiled })
    }

    /// Every violation in `instance`, one `pointer: message` line each.
    pub fn violations(&self, instance: &Value) -> Vec<String> {
        match self.compiled.validate(instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| {
                    let path = err.instance_path.to_string();
                    if path.is_empty() {
                        err.to_string()
                    } else {
                        format!("{path}: {err}")
                    }
                })
                .collect(),
        }
    }

    pub fn validate(&self, instance: &Value) -> Result<()> {
        let details = self.violations(instance);
        if details.is_empty() {
            return Ok(());
        }
        bail!("catalog failed schema validation:\n{}", details.join("\n"));
    }
}

/// Validate `instance` against the bundled catalog schema.
pub fn validate_catalog_value(instance: &Value) -> Result<()> {
    CatalogSchema::bundled()?.validate(instance)
}
