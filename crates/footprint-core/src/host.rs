use std::env;
use std::fs;
use std::thread;

use chrono::Local;
use tracing::debug;

use crate::introspect::{ClientHints, FactSource, HostFacts};

#[derive(Debug, Clone, Default)]
pub struct HostFactSource {
    user_agent: Option<String>,
}

impl HostFactSource {
    pub fn new(user_agent: Option<String>) -> Self {
        Self { user_agent }
    }

    fn platform_name() -> &'static str {
        match env::consts::OS {
            "linux" => "Linux",
            "macos" => "macOS",
            "windows" => "Windows",
            "android" => "Android",
            "ios" => "iOS",
            "freebsd" => "FreeBSD",
            other => other,
        }
    }

    fn platform_version() -> Option<String> {
        let release = fs::read_to_string("/etc/os-release").ok()?;
        release
            .lines()
            .find_map(|line| line.strip_prefix("VERSION_ID="))
            .map(|v| v.trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    }

    fn languages() -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut push = |raw: &str| {
            if let Some(tag) = locale_to_language_tag(raw) {
                if !out.contains(&tag) {
                    out.push(tag);
                }
            }
        };

        if let Ok(list) = env::var("LANGUAGE") {
            list.split(':').for_each(&mut push);
        }
        for key in ["LC_ALL", "LC_MESSAGES", "LANG"] {
            if let Ok(value) = env::var(key) {
                push(&value);
            }
        }
        out
    }

    fn timezone() -> Option<String> {
        if let Ok(tz) = env::var("TZ") {
            let tz = tz.trim_start_matches(':').trim();
            if !tz.is_empty() {
                return Some(tz.to_string());
            }
        }
        if let Ok(name) = fs::read_to_string("/etc/timezone") {
            let name = name.trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
        let target = fs::read_link("/etc/localtime").ok()?;
        let target = target.to_string_lossy();
        target
            .split_once("zoneinfo/")
            .map(|(_, zone)| zone.to_string())
    }

    fn device_memory() -> Option<f64> {
        let meminfo = fs::read_to_string("/proc/meminfo").ok()?;
        let kb = meminfo
            .lines()
            .find_map(|line| line.strip_prefix("MemTotal:"))
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|n| n.parse::<u64>().ok())?;
        Some(round_memory_gb(kb as f64 / (1024.0 * 1024.0)))
    }
}

impl FactSource for HostFactSource {
    fn gather(&self) -> HostFacts {
        let languages = Self::languages();
        let offset_secs = Local::now().offset().local_minus_utc();
        let do_not_track = env::var("DO_NOT_TRACK").ok();

        let facts = HostFacts {
            user_agent: self.user_agent.clone(),
            client_hints: Some(ClientHints {
                platform: Some(Self::platform_name().to_string()),
                platform_version: Self::platform_version(),
                brands: Vec::new(),
                mobile: Some(false),
            }),
            platform: Some(format!("{} {}", Self::platform_name(), env::consts::ARCH)),
            language: languages.first().cloned(),
            languages,
            screen: None,
            pixel_ratio: None,
            timezone_offset: Some(-offset_secs / 60),
            timezone: Self::timezone(),
            hardware_concurrency: thread::available_parallelism()
                .ok()
                .and_then(|n| u32::try_from(n.get()).ok()),
            device_memory: Self::device_memory(),
            max_touch_points: None,
            cookies_enabled: false,
            do_not_track,
        };
        debug!(languages = facts.languages.len(), "gathered host facts");
        facts
    }
}

/// `en_US.UTF-8@euro` becomes `en-US`; the C/POSIX locales carry no language.
pub(crate) fn locale_to_language_tag(raw: &str) -> Option<String> {
    let base = raw
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

pub(crate) fn round_memory_gb(gb: f64) -> f64 {
    if gb <= 0.0 {
        return 0.0;
    }
    2_f64.powi(gb.log2().round() as i32)
}
