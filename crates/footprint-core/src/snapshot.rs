use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    pub ip: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub isp: Option<String>,
    pub organization: Option<String>,
    pub connection_type: Option<String>,
    pub postal_code: Option<String>,
    pub timezone: Option<String>,
}

impl NetworkRecord {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsRecord {
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub platform: Option<String>,
    pub browser_name: Option<String>,
    pub browser_version: Option<String>,
    pub primary_language: Option<String>,
    pub languages: Vec<String>,
    pub user_agent: Option<String>,
}

impl OsRecord {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeviceType::Desktop => "Desktop",
            DeviceType::Mobile => "Mobile",
            DeviceType::Tablet => "Tablet",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRecord {
    pub device_type: Option<DeviceType>,
    pub screen_width: Option<u32>,
    pub screen_height: Option<u32>,
    pub available_width: Option<u32>,
    pub available_height: Option<u32>,
    pub color_depth: Option<u32>,
    pub pixel_ratio: Option<f64>,
    /// Minutes to add to local time to get UTC.
    pub timezone_offset: Option<i32>,
    pub timezone: Option<String>,
    pub hardware_concurrency: Option<u32>,
    pub device_memory: Option<f64>,
    pub max_touch_points: Option<u32>,
    pub cookies_enabled: bool,
    pub do_not_track: Option<String>,
}

impl DeviceRecord {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub network: NetworkRecord,
    pub os: OsRecord,
    #[serde(rename = "machine")]
    pub device: DeviceRecord,
    pub timestamp: i64,
}

impl Snapshot {
    pub fn capture(network: NetworkRecord, os: OsRecord, device: DeviceRecord) -> Self {
        Self {
            network,
            os,
            device,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn captured_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for LoadingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoadingState::Idle => "idle",
            LoadingState::Loading => "loading",
            LoadingState::Success => "success",
            LoadingState::Error => "error",
        };
        f.write_str(label)
    }
}
