//! Manifest document parsing.
//!
//! The remote manifest is a JSON document listing every fetchable asset:
//!
//! ```json
//! { "assets": [ { "id": "workouts", "url": "https://x/workouts.json" } ] }
//! ```
//!
//! `Manifest::resolve` is a pure function: bytes in, validated descriptor
//! list out. It performs no I/O and has no side effects. Asset ids must be
//! unique within one manifest; a duplicate is a parse failure.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::SyncError;

/// Default size estimate for an asset whose manifest entry carries none.
pub const DEFAULT_ESTIMATED_SIZE_BYTES: u64 = 1024 * 1024;

/// One fetchable asset from a resolved manifest.
///
/// Descriptors are ephemeral: they exist only for the duration of one
/// resolution and are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// Globally unique id within one manifest.
    pub id: String,
    /// Where the asset bytes are fetched from.
    pub url: String,
    /// Size estimate handed to the host scheduler.
    pub estimated_size_bytes: u64,
}

impl AssetDescriptor {
    /// Build a descriptor with the default size estimate.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            estimated_size_bytes: DEFAULT_ESTIMATED_SIZE_BYTES,
        }
    }
}

/// Wire format of one manifest entry.
#[derive(Debug, Deserialize)]
struct WireAsset {
    id: String,
    url: String,
    #[serde(default)]
    estimated_size_bytes: Option<u64>,
}

/// Wire format of the manifest document.
#[derive(Debug, Deserialize)]
struct WireManifest {
    assets: Vec<WireAsset>,
}

/// An ordered, validated list of asset descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub assets: Vec<AssetDescriptor>,
}

impl Manifest {
    /// Parse manifest bytes into a validated descriptor list.
    ///
    /// Fails with `DataProcessing` when the bytes are not valid JSON in the
    /// expected shape, or when two entries share an id.
    pub fn resolve(bytes: &[u8]) -> Result<Manifest, SyncError> {
        let wire: WireManifest = serde_json::from_slice(bytes)
            .map_err(|e| SyncError::data_processing(format!("invalid manifest: {e}")))?;

        let mut seen = HashSet::with_capacity(wire.assets.len());
        let mut assets = Vec::with_capacity(wire.assets.len());
        for entry in wire.assets {
            if !seen.insert(entry.id.clone()) {
                return Err(SyncError::data_processing(format!(
                    "duplicate asset id `{}` in manifest",
                    entry.id
                )));
            }
            assets.push(AssetDescriptor {
                id: entry.id,
                url: entry.url,
                estimated_size_bytes: entry
                    .estimated_size_bytes
                    .unwrap_or(DEFAULT_ESTIMATED_SIZE_BYTES),
            });
        }

        Ok(Manifest { assets })
    }

    /// Number of assets listed.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the manifest lists no assets.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_valid_manifest() {
        let bytes = br#"{
            "assets": [
                {"id": "workouts", "url": "https://x/workouts.json"},
                {"id": "ns.image.Atlas", "url": "https://x/Atlas.jpg"}
            ]
        }"#;

        let manifest = Manifest::resolve(bytes).unwrap();

        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.assets[0].id, "workouts");
        assert_eq!(manifest.assets[0].url, "https://x/workouts.json");
        assert_eq!(
            manifest.assets[0].estimated_size_bytes,
            DEFAULT_ESTIMATED_SIZE_BYTES
        );
        assert_eq!(manifest.assets[1].id, "ns.image.Atlas");
    }

    #[test]
    fn test_resolve_preserves_order() {
        let bytes = br#"{"assets": [
            {"id": "b", "url": "https://x/b"},
            {"id": "a", "url": "https://x/a"},
            {"id": "c", "url": "https://x/c"}
        ]}"#;

        let manifest = Manifest::resolve(bytes).unwrap();
        let ids: Vec<_> = manifest.assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_resolve_honors_explicit_size() {
        let bytes = br#"{"assets": [
            {"id": "a", "url": "https://x/a", "estimated_size_bytes": 42}
        ]}"#;

        let manifest = Manifest::resolve(bytes).unwrap();
        assert_eq!(manifest.assets[0].estimated_size_bytes, 42);
    }

    #[test]
    fn test_resolve_duplicate_ids_fail() {
        let bytes = br#"{"assets": [
            {"id": "a", "url": "https://x/1"},
            {"id": "a", "url": "https://x/2"}
        ]}"#;

        let err = Manifest::resolve(bytes).unwrap_err();
        assert!(matches!(err, SyncError::DataProcessing(_)));
        assert!(err.to_string().contains("duplicate asset id `a`"));
    }

    #[test]
    fn test_resolve_invalid_json_fails() {
        let err = Manifest::resolve(b"not json at all").unwrap_err();
        assert!(matches!(err, SyncError::DataProcessing(_)));
    }

    #[test]
    fn test_resolve_missing_assets_field_fails() {
        let err = Manifest::resolve(br#"{"files": []}"#).unwrap_err();
        assert!(matches!(err, SyncError::DataProcessing(_)));
    }

    #[test]
    fn test_resolve_empty_manifest() {
        let manifest = Manifest::resolve(br#"{"assets": []}"#).unwrap();
        assert!(manifest.is_empty());
    }
}
