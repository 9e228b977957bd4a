use serde::de::DeserializeOwned;
use std::path::Path;

/// Serialization formats a model artifact may be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Json5,
    Toml,
    Yaml,
}

impl ArtifactFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(ArtifactFormat::Json),
            "json5" => Some(ArtifactFormat::Json5),
            "toml" => Some(ArtifactFormat::Toml),
            "yaml" | "yml" => Some(ArtifactFormat::Yaml),
            _ => None,
        }
    }

    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            ArtifactFormat::Json => serde_json::from_str(content)
                .map_err(|e| format!("invalid JSON artifact: {}", e)),
            ArtifactFormat::Json5 => json5::from_str(content)
                .map_err(|e| format!("invalid JSON5 artifact: {}", e)),
            ArtifactFormat::Toml => toml::from_str(content)
                .map_err(|e| format!("invalid TOML artifact: {}", e)),
            ArtifactFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| format!("invalid YAML artifact: {}", e)),
        }
    }
}
