use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_GEO_ENDPOINT: &str = "https://ipapi.co/json/";
pub const DEFAULT_IP_ECHO_ENDPOINT: &str = "https://api.ipify.org?format=json";
pub const DEFAULT_STORAGE_KEY: &str = "footprint-exposure-data";
pub const FORMAT_VERSION: &str = "1.0";

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub geo_endpoint: String,
    pub ip_echo_endpoint: String,
    pub request_timeout: Option<Duration>,
    pub storage_dir: PathBuf,
    pub storage_key: String,
    pub format_version: String,
    pub user_agent: Option<String>,
}

impl TrackerConfig {
    pub fn default_storage_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|dir| dir.join("footprint"))
            .unwrap_or_else(|| PathBuf::from("./data"))
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            geo_endpoint: DEFAULT_GEO_ENDPOINT.to_string(),
            ip_echo_endpoint: DEFAULT_IP_ECHO_ENDPOINT.to_string(),
            request_timeout: None,
            storage_dir: Self::default_storage_dir(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            format_version: FORMAT_VERSION.to_string(),
            user_agent: None,
        }
    }
}
