use serde::{Deserialize, Serialize};

use crate::signatures::{self, BROWSER_SIGNATURES, OS_SIGNATURES};
use crate::snapshot::{DeviceRecord, DeviceType, OsRecord};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandVersion {
    pub brand: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientHints {
    pub platform: Option<String>,
    pub platform_version: Option<String>,
    #[serde(default)]
    pub brands: Vec<BrandVersion>,
    pub mobile: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenMetrics {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub avail_width: Option<u32>,
    pub avail_height: Option<u32>,
    pub color_depth: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostFacts {
    pub user_agent: Option<String>,
    pub client_hints: Option<ClientHints>,
    pub platform: Option<String>,
    pub language: Option<String>,
    pub languages: Vec<String>,
    pub screen: Option<ScreenMetrics>,
    pub pixel_ratio: Option<f64>,
    pub timezone_offset: Option<i32>,
    pub timezone: Option<String>,
    pub hardware_concurrency: Option<u32>,
    pub device_memory: Option<f64>,
    pub max_touch_points: Option<u32>,
    pub cookies_enabled: bool,
    pub do_not_track: Option<String>,
}

pub trait FactSource: Send + Sync {
    fn gather(&self) -> HostFacts;
}

#[derive(Debug, Clone, Default)]
pub struct StaticFactSource {
    facts: HostFacts,
}

impl StaticFactSource {
    pub fn new(facts: HostFacts) -> Self {
        Self { facts }
    }
}

impl FactSource for StaticFactSource {
    fn gather(&self) -> HostFacts {
        self.facts.clone()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn non_zero(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v > 0)
}

fn is_generic_brand(brand: &str) -> bool {
    brand.contains("Not") || brand.contains("Chromium")
}

pub fn collect_os_info(facts: &HostFacts) -> OsRecord {
    let mut os = OsRecord::empty();
    os.user_agent = non_empty(facts.user_agent.as_deref());

    if let Some(hints) = &facts.client_hints {
        os.platform = non_empty(hints.platform.as_deref());
        if let Some(brand) = hints.brands.iter().find(|b| !is_generic_brand(&b.brand)) {
            os.browser_name = non_empty(Some(brand.brand.as_str()));
            os.browser_version = non_empty(Some(brand.version.as_str()));
        }
    }

    if let Some(ua) = os.user_agent.as_deref() {
        if let Some(hit) = signatures::first_match(&OS_SIGNATURES, ua) {
            os.os_name.get_or_insert_with(|| hit.name.to_string());
            if os.os_version.is_none() {
                os.os_version = hit.version;
            }
        }
        if let Some(hit) = signatures::first_match(&BROWSER_SIGNATURES, ua) {
            // A hinted brand like "Google Chrome" only borrows the version of
            // the UA row naming the same browser.
            let same_browser = os
                .browser_name
                .as_deref()
                .map_or(true, |hinted| hinted.contains(hit.name));
            os.browser_name.get_or_insert_with(|| hit.name.to_string());
            if os.browser_version.is_none() && same_browser {
                os.browser_version = hit.version;
            }
        }
    }

    if os.os_name.is_none() {
        if let Some(hints) = &facts.client_hints {
            os.os_name = non_empty(hints.platform.as_deref());
            os.os_version = os
                .os_version
                .take()
                .or_else(|| non_empty(hints.platform_version.as_deref()));
        }
    }

    if os.platform.is_none() {
        os.platform = non_empty(facts.platform.as_deref());
    }

    os.languages = facts
        .languages
        .iter()
        .filter(|lang| !lang.trim().is_empty())
        .cloned()
        .collect();
    os.primary_language = non_empty(facts.language.as_deref()).or_else(|| os.languages.first().cloned());
    if os.languages.is_empty() {
        if let Some(primary) = &os.primary_language {
            os.languages.push(primary.clone());
        }
    }

    os
}

pub fn classify_device(user_agent: Option<&str>, hints: Option<&ClientHints>) -> DeviceType {
    let ua = user_agent.unwrap_or_default();
    let hinted_mobile = hints.and_then(|h| h.mobile).unwrap_or(false);

    if signatures::looks_like_tablet(ua) {
        DeviceType::Tablet
    } else if hinted_mobile || signatures::looks_like_mobile(ua) {
        DeviceType::Mobile
    } else {
        DeviceType::Desktop
    }
}

pub fn collect_device_info(facts: &HostFacts) -> DeviceRecord {
    let mut device = DeviceRecord::empty();

    if let Some(screen) = &facts.screen {
        device.screen_width = non_zero(screen.width);
        device.screen_height = non_zero(screen.height);
        device.available_width = non_zero(screen.avail_width);
        device.available_height = non_zero(screen.avail_height);
        device.color_depth = non_zero(screen.color_depth);
    }

    device.pixel_ratio = Some(facts.pixel_ratio.filter(|r| *r > 0.0).unwrap_or(1.0));
    device.timezone_offset = facts.timezone_offset;
    device.timezone = non_empty(facts.timezone.as_deref());
    device.hardware_concurrency = non_zero(facts.hardware_concurrency);
    device.device_memory = facts.device_memory.filter(|gb| *gb > 0.0);
    device.max_touch_points = Some(facts.max_touch_points.unwrap_or(0));
    device.cookies_enabled = facts.cookies_enabled;
    device.do_not_track = non_empty(facts.do_not_track.as_deref());
    device.device_type = Some(classify_device(
        facts.user_agent.as_deref(),
        facts.client_hints.as_ref(),
    ));

    device
}
