use std::path::PathBuf;

use serde::Deserialize;

/// Media storage configuration shared by the server and the CLI.
#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Directory holding stored images. Default: "./media".
    #[serde(default = "default_media_root")]
    pub root: PathBuf,
    /// Public origin prepended to media URLs in responses. Default: "http://localhost:3000".
    #[serde(default = "default_media_base_url")]
    pub base_url: String,
    /// Upper bound for a single decoded image in bytes. Default: 5 MiB.
    #[serde(default = "default_max_image_size")]
    pub max_image_size: u64,
}

fn default_media_root() -> PathBuf {
    PathBuf::from("./media")
}
fn default_media_base_url() -> String {
    "http://localhost:3000".into()
}
fn default_max_image_size() -> u64 {
    5 * 1024 * 1024
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            base_url: default_media_base_url(),
            max_image_size: default_max_image_size(),
        }
    }
}

impl MediaConfig {
    /// Absolute URL under which a stored media key is served.
    pub fn url_for(&self, key: &str) -> String {
        format!("{}/media/{}", self.base_url.trim_end_matches('/'), key)
    }
}
