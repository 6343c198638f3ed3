//! Saved query results, for looking at another machine's GLX setup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::fbconfig::FbConfigAttr;
use super::{GlxQuery, GlxString, QueryError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Strings that answered when the snapshot was taken
    #[serde(default)]
    pub strings: BTreeMap<GlxString, String>,

    /// `None` when the source had no FBConfig list
    #[serde(default)]
    pub fbconfigs: Option<Vec<FbConfigAttr>>,
}

impl Snapshot {
    /// Capture whatever `query` answers. Failed strings are left out so they
    /// fail again when the snapshot is read back.
    pub fn capture(query: &dyn GlxQuery) -> Result<Self, QueryError> {
        let mut strings = BTreeMap::new();
        for attr in GlxString::ALL {
            match query.string_attribute(attr) {
                Ok(value) => {
                    strings.insert(attr, value);
                }
                Err(e) => tracing::warn!("Not captured: {}", e),
            }
        }

        let fbconfigs = query.fbconfig_attribs()?;
        Ok(Self { strings, fbconfigs })
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self, QueryError> {
        let fail = |reason: String| QueryError::Snapshot {
            path: path.display().to_string(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        Self::from_json(&content).map_err(|e| fail(e.to_string()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::info!("Snapshot written to {}", path.display());
        Ok(())
    }
}

impl GlxQuery for Snapshot {
    fn string_attribute(&self, attr: GlxString) -> Result<String, QueryError> {
        self.strings
            .get(&attr)
            .cloned()
            .ok_or_else(|| QueryError::failed(attr.name(), "not in snapshot"))
    }

    fn fbconfig_attribs(&self) -> Result<Option<Vec<FbConfigAttr>>, QueryError> {
        Ok(self.fbconfigs.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_json() {
        let snapshot = Snapshot::from_json(
            r#"{
                "strings": {
                    "server_vendor": "NVIDIA Corporation",
                    "direct_rendering": "Yes"
                },
                "fbconfigs": [
                    { "fbconfig_id": 33, "visual_id": 43, "doublebuffer": true },
                    { "fbconfig_id": 0 }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            snapshot.string_attribute(GlxString::ServerVendor).unwrap(),
            "NVIDIA Corporation"
        );
        assert!(snapshot.string_attribute(GlxString::OpenglRenderer).is_err());

        let configs = snapshot.fbconfig_attribs().unwrap().unwrap();
        assert_eq!(configs.len(), 2);
        assert!(configs[0].doublebuffer);
        assert!(configs[1].is_sentinel());
    }

    #[test]
    fn test_null_fbconfigs() {
        let snapshot = Snapshot::from_json(r#"{ "fbconfigs": null }"#).unwrap();
        assert!(snapshot.fbconfig_attribs().unwrap().is_none());
        assert!(snapshot.strings.is_empty());
    }

    #[test]
    fn test_capture_skips_failed_strings() {
        let source = Snapshot::from_json(
            r#"{ "strings": { "client_vendor": "Mesa" }, "fbconfigs": [] }"#,
        )
        .unwrap();

        let copy = Snapshot::capture(&source).unwrap();
        assert_eq!(copy.strings.len(), 1);
        assert_eq!(copy.fbconfigs, Some(Vec::new()));
    }
}
