use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vidnote_store::DEFAULT_API_BASE;

pub const DEFAULT_CONFIG_NAME: &str = "vidnote.config.json";

/// Vidnote server configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Address to listen on
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Directory holding one JSON file per markup
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Blob folder for uploaded videos
    #[serde(default = "default_video_folder")]
    pub video_folder: String,

    /// Blob folder for images embedded in timecode bodies
    #[serde(default = "default_image_folder")]
    pub image_folder: String,

    #[serde(default = "default_disk_api_base")]
    pub disk_api_base: String,

    /// Storage backend. Picked from the available secrets when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageKind>,

    /// Largest accepted upload body
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageKind {
    /// Everything in process memory; nothing survives a restart.
    Memory,
    /// Blobs on the cloud disk, markups as JSON files in `dataDir`.
    DiskApi,
}

fn default_bind() -> String {
    "127.0.0.1:3030".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_video_folder() -> String {
    "/timecodes".to_string()
}

fn default_image_folder() -> String {
    "/timecodes-images".to_string()
}

fn default_disk_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_max_upload_bytes() -> usize {
    1024 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            data_dir: default_data_dir(),
            video_folder: default_video_folder(),
            image_folder: default_image_folder(),
            disk_api_base: default_disk_api_base(),
            storage: None,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServerConfig {
    /// Load `vidnote.config.json` from a directory, or defaults when absent.
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            Self::load_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load an explicitly named config file, which must exist.
    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn get_data_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.data_dir)
    }

    pub fn storage_kind(&self, secrets: &Secrets) -> StorageKind {
        match self.storage {
            Some(kind) => kind,
            None if secrets.disk_api_key.is_some() => StorageKind::DiskApi,
            None => StorageKind::Memory,
        }
    }
}

/// Values that only ever come from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Secrets {
    pub admin_password: Option<String>,
    pub disk_api_key: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            admin_password: non_empty("ADMIN_PASSWORD"),
            disk_api_key: non_empty("DISK_API_KEY").or_else(|| non_empty("YANDEX_API_KEY")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "bind": "0.0.0.0:8080",
            "dataDir": "/var/lib/vidnote",
            "videoFolder": "/videos",
            "storage": "disk-api",
            "maxUploadBytes": 1048576
        }"#;

        let config: ServerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert_eq!(config.data_dir, "/var/lib/vidnote");
        assert_eq!(config.video_folder, "/videos");
        assert_eq!(config.image_folder, "/timecodes-images");
        assert_eq!(config.storage, Some(StorageKind::DiskApi));
        assert_eq!(config.max_upload_bytes, 1048576);
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "127.0.0.1:3030");
        assert_eq!(config.disk_api_base, "https://cloud-api.yandex.net/v1/disk");
        assert_eq!(config.storage, None);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ServerConfig::load(dir.path()).unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{"dataDir": "notes"}"#).unwrap();

        let config = ServerConfig::load(dir.path()).unwrap();
        assert_eq!(config.get_data_dir(dir.path()), dir.path().join("notes"));
    }

    #[test]
    fn test_secrets_and_storage_choice() {
        let env: HashMap<&str, &str> = [("ADMIN_PASSWORD", "pw"), ("YANDEX_API_KEY", "k"), ("DISK_API_KEY", "")]
            .into_iter()
            .collect();
        let secrets = Secrets::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(secrets.admin_password.as_deref(), Some("pw"));
        assert_eq!(secrets.disk_api_key.as_deref(), Some("k"));
        assert_eq!(ServerConfig::default().storage_kind(&secrets), StorageKind::DiskApi);
        assert_eq!(
            ServerConfig::default().storage_kind(&Secrets::default()),
            StorageKind::Memory
        );
    }
}
