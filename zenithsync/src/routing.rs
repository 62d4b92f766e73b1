//! Asset id to relative path routing.
//!
//! Routing is the contract shared by both writer paths (the foreground sync
//! engine and the background download adapter): whatever path an id routes
//! to, both paths commit to the same file, and concurrent writers stay safe
//! because distinct ids route to disjoint paths.
//!
//! Two kinds of id are recognized:
//! - configuration ids map 1:1 through a fixed filename table;
//! - media ids of the form `<namespace>.image.<entity>` map to
//!   `images/<entity>.jpg`.
//!
//! Anything else routes to no path and is dropped without error.

/// Subdirectory of the shared store holding media images.
pub const IMAGE_SUBDIR: &str = "images";

/// File extension for committed media images.
pub const IMAGE_EXT: &str = "jpg";

/// Separator marking a media asset id.
const IMAGE_ID_MARKER: &str = ".image.";

/// One fixed configuration asset: id and the filename it commits to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub id: String,
    pub filename: String,
}

impl ConfigFile {
    pub fn new(id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            filename: filename.into(),
        }
    }
}

/// Routing table from asset id to store-relative path.
#[derive(Debug, Clone)]
pub struct Routing {
    config_files: Vec<ConfigFile>,
}

impl Default for Routing {
    fn default() -> Self {
        Self::new(default_config_files())
    }
}

impl Routing {
    /// Build a routing table over the given configuration set.
    pub fn new(config_files: Vec<ConfigFile>) -> Self {
        Self { config_files }
    }

    /// The fixed configuration set; this is also the wave-one asset list.
    pub fn config_files(&self) -> &[ConfigFile] {
        &self.config_files
    }

    /// Resolve an asset id to its store-relative path.
    ///
    /// Returns `None` for unrecognized ids; callers drop those silently.
    pub fn route(&self, id: &str) -> Option<String> {
        if let Some(entry) = self.config_files.iter().find(|c| c.id == id) {
            return Some(entry.filename.clone());
        }
        media_entity(id).map(|entity| format!("{IMAGE_SUBDIR}/{entity}.{IMAGE_EXT}"))
    }
}

/// Default configuration set: the three catalog documents.
pub fn default_config_files() -> Vec<ConfigFile> {
    vec![
        ConfigFile::new("workouts", "workouts.json"),
        ConfigFile::new("definitions", "definitions.json"),
        ConfigFile::new("descriptions", "descriptions.json"),
    ]
}

/// Build the media asset id for an entity under a namespace.
pub fn media_asset_id(namespace: &str, entity: &str) -> String {
    format!("{namespace}{IMAGE_ID_MARKER}{entity}")
}

/// Extract the entity name from a media asset id.
///
/// The entity must be a single path component: names that would escape the
/// images directory are treated as unrecognized.
fn media_entity(id: &str) -> Option<&str> {
    let (namespace, entity) = id.rsplit_once(IMAGE_ID_MARKER)?;
    if namespace.is_empty() || entity.is_empty() {
        return None;
    }
    if entity == "." || entity == ".." || entity.contains(['/', '\\']) {
        return None;
    }
    Some(entity)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_config_id_routes_to_fixed_filename() {
        let routing = Routing::default();
        assert_eq!(routing.route("workouts").as_deref(), Some("workouts.json"));
        assert_eq!(
            routing.route("definitions").as_deref(),
            Some("definitions.json")
        );
        assert_eq!(
            routing.route("descriptions").as_deref(),
            Some("descriptions.json")
        );
    }

    #[test]
    fn test_media_id_routes_to_images_dir() {
        let routing = Routing::default();
        assert_eq!(
            routing.route("ns.image.Atlas").as_deref(),
            Some("images/Atlas.jpg")
        );
        assert_eq!(
            routing.route("com.zenithfit.image.Artemis").as_deref(),
            Some("images/Artemis.jpg")
        );
    }

    #[test]
    fn test_unknown_id_routes_to_none() {
        let routing = Routing::default();
        assert_eq!(routing.route("unknown.thing"), None);
        assert_eq!(routing.route(""), None);
    }

    #[test]
    fn test_escaping_entity_is_unrecognized() {
        let routing = Routing::default();
        assert_eq!(routing.route("ns.image.."), None);
        assert_eq!(routing.route("ns.image..."), None);
        assert_eq!(routing.route("ns.image.a/b"), None);
        assert_eq!(routing.route("ns.image.a\\b"), None);
        assert_eq!(routing.route(".image.Atlas"), None);
        assert_eq!(routing.route("ns.image."), None);
    }

    #[test]
    fn test_media_asset_id_round_trips() {
        let routing = Routing::default();
        let id = media_asset_id("com.zenithfit", "Atlas");
        assert_eq!(id, "com.zenithfit.image.Atlas");
        assert_eq!(routing.route(&id).as_deref(), Some("images/Atlas.jpg"));
    }

    #[test]
    fn test_custom_config_table() {
        let routing = Routing::new(vec![ConfigFile::new("plans", "plans.json")]);
        assert_eq!(routing.route("plans").as_deref(), Some("plans.json"));
        assert_eq!(routing.route("workouts"), None);
    }

    proptest! {
        #[test]
        fn prop_media_route_stays_under_images(entity in "[A-Za-z0-9_-]{1,24}") {
            let routing = Routing::default();
            let id = media_asset_id("com.zenithfit", &entity);
            let rel = routing.route(&id).unwrap();
            prop_assert!(rel.starts_with("images/"));
            prop_assert!(!rel.contains(".."));
            prop_assert_eq!(rel, format!("images/{}.jpg", entity));
        }

        #[test]
        fn prop_ids_without_marker_never_route_to_images(id in "[A-Za-z0-9._-]{0,32}") {
            prop_assume!(!id.contains(".image."));
            let routing = Routing::new(vec![]);
            prop_assert_eq!(routing.route(&id), None);
        }
    }
}
