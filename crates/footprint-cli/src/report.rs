use anyhow::Result;
use chrono::{Local, TimeZone};
use footprint_core::{LoadingState, TrackerView};

use crate::OutputFormat;

pub fn print_view(view: &TrackerView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view_json(view))?),
        OutputFormat::Human => print!("{}", human_report(view)),
    }
    Ok(())
}

pub(crate) fn view_json(view: &TrackerView) -> serde_json::Value {
    serde_json::json!({
        "state": view.state,
        "isLoading": view.is_loading(),
        "hasError": view.has_error(),
        "hasData": view.has_data(),
        "errorMessage": view.error_message,
        "lastUpdated": view.last_updated,
        "network": view.network,
        "os": view.os,
        "machine": view.device,
    })
}

pub(crate) fn format_timestamp(epoch_ms: i64) -> String {
    Local
        .timestamp_millis_opt(epoch_ms)
        .single()
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S %Z").to_string())
        .unwrap_or_else(|| epoch_ms.to_string())
}

pub(crate) fn or_na<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string())
}

pub(crate) fn status_line(view: &TrackerView) -> String {
    match view.state {
        LoadingState::Idle => "idle (no data collected)".to_string(),
        LoadingState::Loading if view.revalidating => format!(
            "cached from {}, refreshing",
            or_na(view.last_updated.map(format_timestamp))
        ),
        LoadingState::Loading => "collecting...".to_string(),
        LoadingState::Error => format!(
            "error: {}",
            view.error_message.as_deref().unwrap_or("failed to collect data")
        ),
        LoadingState::Success if !view.has_data() => "no data available".to_string(),
        LoadingState::Success => {
            format!("updated {}", or_na(view.last_updated.map(format_timestamp)))
        }
    }
}

pub(crate) fn network_rows(view: &TrackerView) -> Vec<(&'static str, String)> {
    let net = &view.network;
    let coords = match (net.latitude, net.longitude) {
        (Some(lat), Some(lon)) => format!("{lat:.4}, {lon:.4}"),
        _ => "n/a".to_string(),
    };
    vec![
        ("IP", or_na(net.ip.as_deref())),
        ("Country", or_na(net.country.as_deref())),
        ("Region", or_na(net.region.as_deref())),
        ("City", or_na(net.city.as_deref())),
        ("Postal", or_na(net.postal_code.as_deref())),
        ("Coords", coords),
        ("ISP", or_na(net.isp.as_deref())),
        ("Org", or_na(net.organization.as_deref())),
        ("Connection", or_na(net.connection_type.as_deref())),
        ("Timezone", or_na(net.timezone.as_deref())),
    ]
}

pub(crate) fn os_rows(view: &TrackerView) -> Vec<(&'static str, String)> {
    let os = &view.os;
    let join = |name: Option<&str>, version: Option<&str>| match (name, version) {
        (Some(n), Some(v)) => format!("{n} {v}"),
        (Some(n), None) => n.to_string(),
        _ => "n/a".to_string(),
    };
    let languages = if os.languages.is_empty() {
        "n/a".to_string()
    } else {
        os.languages.join(", ")
    };
    vec![
        ("OS", join(os.os_name.as_deref(), os.os_version.as_deref())),
        ("Browser", join(os.browser_name.as_deref(), os.browser_version.as_deref())),
        ("Platform", or_na(os.platform.as_deref())),
        ("Language", or_na(os.primary_language.as_deref())),
        ("Languages", languages),
        ("Agent", or_na(os.user_agent.as_deref())),
    ]
}

pub(crate) fn device_rows(view: &TrackerView) -> Vec<(&'static str, String)> {
    let dev = &view.device;
    let pair = |a: Option<u32>, b: Option<u32>| match (a, b) {
        (Some(a), Some(b)) => format!("{a}x{b}"),
        _ => "n/a".to_string(),
    };
    let offset = dev.timezone_offset.map(|minutes| {
        let east = -minutes;
        let sign = if east < 0 { '-' } else { '+' };
        format!("UTC{sign}{:02}:{:02}", east.abs() / 60, east.abs() % 60)
    });
    vec![
        ("Type", or_na(dev.device_type)),
        ("Screen", pair(dev.screen_width, dev.screen_height)),
        ("Available", pair(dev.available_width, dev.available_height)),
        ("Color", or_na(dev.color_depth.map(|bits| format!("{bits}-bit")))),
        ("Pixel ratio", or_na(dev.pixel_ratio)),
        ("Offset", or_na(offset)),
        ("Timezone", or_na(dev.timezone.as_deref())),
        ("Cores", or_na(dev.hardware_concurrency)),
        ("Memory", or_na(dev.device_memory.map(|gb| format!("{gb} GB")))),
        ("Touch", or_na(dev.max_touch_points)),
        ("Cookies", dev.cookies_enabled.to_string()),
        ("DNT", or_na(dev.do_not_track.as_deref())),
    ]
}

pub(crate) fn shows_records(view: &TrackerView) -> bool {
    view.has_data() || view.revalidating
}

pub(crate) fn human_report(view: &TrackerView) -> String {
    let mut out = format!("=== Digital Footprint ===\nStatus:      {}\n", status_line(view));

    if !shows_records(view) {
        return out;
    }

    for (title, rows) in [
        ("Network", network_rows(view)),
        ("System", os_rows(view)),
        ("Device", device_rows(view)),
    ] {
        out.push_str(&format!("{title}:\n"));
        for (label, value) in rows {
            out.push_str(&format!("  {label:<12} {value}\n"));
        }
    }
    out
}
