use super::{SoftwareClusterElement, SourceModel};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Serialized form of the system model, as YAML or JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceModelDocument {
    #[serde(default)]
    pub software_clusters: Vec<SoftwareClusterElement>,
}

impl SourceModelDocument {
    pub fn new(software_clusters: Vec<SoftwareClusterElement>) -> Self {
        Self { software_clusters }
    }

    /// Load a model file, picking the format from its extension
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("model file {:?} does not exist", path);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read model file {:?}", path))?;
        let ext = path
            .extension()
            .and_then(|os| os.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let parsed = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&contents)
                .with_context(|| format!("failed to parse YAML model {:?}", path))?,
            "json" => Self::from_json_str(&contents)
                .with_context(|| format!("failed to parse JSON model {:?}", path))?,
            other => anyhow::bail!("unsupported model extension: {other}"),
        };

        tracing::debug!(
            path = %path.display(),
            clusters = parsed.software_clusters.len(),
            "loaded source model"
        );
        Ok(parsed)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }
}

impl SourceModel for SourceModelDocument {
    fn software_clusters(&self) -> &[SoftwareClusterElement] {
        &self.software_clusters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{AddressPayload, AddressSemantics};
    use std::io::Write;

    const MODEL_YAML: &str = r#"
software_clusters:
  - name: ClusterA
    diagnostic_contribution: /Diag/ClusterA
    diagnostic_addresses:
      - semantics: functional-address
        address: { scheme: doip, logical_address: 58368 }
      - semantics: physical-address
        address: { scheme: doip, logical_address: 4660 }
  - name: ClusterB
  - name: ClusterC
    diagnostic_addresses:
      - semantics: physical-address
        address: { scheme: flexray, slot: 12 }
"#;

    #[test]
    fn test_parse_yaml_model() {
        let model = SourceModelDocument::from_yaml_str(MODEL_YAML).unwrap();
        assert_eq!(model.software_clusters.len(), 3);

        let a = &model.software_clusters[0];
        assert_eq!(a.name, "ClusterA");
        assert_eq!(a.diagnostic_addresses.len(), 2);
        assert_eq!(
            a.diagnostic_addresses[1].semantics,
            AddressSemantics::PhysicalAddress
        );
        assert_eq!(
            a.diagnostic_addresses[1].address,
            AddressPayload::Doip {
                logical_address: Some(4660)
            }
        );

        assert!(model.software_clusters[1].diagnostic_addresses.is_empty());
        assert_eq!(
            model.software_clusters[2].diagnostic_addresses[0].address,
            AddressPayload::Unknown
        );
    }

    #[test]
    fn test_incomplete_entries_still_parse() {
        let yaml = r#"
software_clusters:
  - name: ClusterA
    diagnostic_addresses:
      - semantics: physical-address
        address: { scheme: doip, logical_address: 4660 }
  - name: NoLogical
    diagnostic_addresses:
      - semantics: physical-address
        address: { scheme: doip }
  - name: NoIdentifier
    diagnostic_addresses:
      - semantics: physical-address
        address: { scheme: can }
  - name: OtherTag
    diagnostic_addresses:
      - semantics: logical-address
        address: { scheme: doip, logical_address: 7 }
"#;

        let model = SourceModelDocument::from_yaml_str(yaml).unwrap();

        assert_eq!(model.software_clusters.len(), 4);
        assert_eq!(
            model.software_clusters[1].diagnostic_addresses[0].address,
            AddressPayload::Doip {
                logical_address: None
            }
        );
        assert_eq!(
            model.software_clusters[2].diagnostic_addresses[0].address,
            AddressPayload::Can { identifier: None }
        );
        let other = &model.software_clusters[3].diagnostic_addresses[0];
        assert_eq!(other.semantics, AddressSemantics::Other);
        assert!(!other.is_physical());
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"software_clusters":[{{"name":"ClusterA","diagnostic_addresses":[{{"semantics":"physical-address","address":{{"scheme":"doip","logical_address":4660}}}}]}}]}}"#
        )
        .unwrap();

        let model = SourceModelDocument::load(file.path()).unwrap();
        assert_eq!(model.software_clusters().len(), 1);
        assert_eq!(model.software_clusters()[0].name, "ClusterA");
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".arxml").tempfile().unwrap();
        let err = SourceModelDocument::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported model extension"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = SourceModelDocument::load(Path::new("does/not/exist.yaml")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
