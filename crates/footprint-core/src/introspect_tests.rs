use crate::host::{locale_to_language_tag, round_memory_gb};
use crate::introspect::{
    classify_device, collect_device_info, collect_os_info, BrandVersion, ClientHints, HostFacts,
    ScreenMetrics,
};
use crate::snapshot::DeviceType;

const CHROME_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const EDGE_WINDOWS: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.91";
const SAFARI_MAC: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15";
const SAFARI_IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
const SAFARI_IPAD: &str = "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";
const CHROME_ANDROID: &str = "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.6099.144 Mobile Safari/537.36";
const FIREFOX_LINUX: &str = "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";

fn facts_for(ua: &str) -> HostFacts {
    HostFacts {
        user_agent: Some(ua.to_string()),
        ..HostFacts::default()
    }
}

#[test]
fn chrome_on_windows_is_identified() {
    let os = collect_os_info(&facts_for(CHROME_WINDOWS));

    assert_eq!(os.os_name.as_deref(), Some("Windows"));
    assert_eq!(os.os_version.as_deref(), Some("10/11"));
    assert_eq!(os.browser_name.as_deref(), Some("Chrome"));
    assert_eq!(os.browser_version.as_deref(), Some("120.0.0.0"));
    assert_eq!(os.user_agent.as_deref(), Some(CHROME_WINDOWS));
}

#[test]
fn edge_marker_wins_over_chrome_marker() {
    let os = collect_os_info(&facts_for(EDGE_WINDOWS));

    assert_eq!(os.browser_name.as_deref(), Some("Edge"));
    assert_eq!(os.browser_version.as_deref(), Some("120.0.2210.91"));
}

#[test]
fn safari_on_mac_reads_dotted_versions() {
    let os = collect_os_info(&facts_for(SAFARI_MAC));

    assert_eq!(os.os_name.as_deref(), Some("macOS"));
    assert_eq!(os.os_version.as_deref(), Some("10.15.7"));
    assert_eq!(os.browser_name.as_deref(), Some("Safari"));
    assert_eq!(os.browser_version.as_deref(), Some("17.0"));
}

#[test]
fn iphone_is_not_mistaken_for_mac() {
    // Arrange
    let facts = facts_for(SAFARI_IPHONE);

    // Act
    let os = collect_os_info(&facts);
    let device = collect_device_info(&facts);

    // Assert
    assert_eq!(os.os_name.as_deref(), Some("iOS"));
    assert_eq!(os.os_version.as_deref(), Some("17.0"));
    assert_eq!(device.device_type, Some(DeviceType::Mobile));
}

#[test]
fn ipad_is_a_tablet() {
    let facts = facts_for(SAFARI_IPAD);

    let os = collect_os_info(&facts);
    let device = collect_device_info(&facts);

    assert_eq!(os.os_name.as_deref(), Some("iPadOS"));
    assert_eq!(os.os_version.as_deref(), Some("16.6"));
    assert_eq!(device.device_type, Some(DeviceType::Tablet));
}

#[test]
fn android_is_checked_before_linux() {
    let facts = facts_for(CHROME_ANDROID);

    let os = collect_os_info(&facts);

    assert_eq!(os.os_name.as_deref(), Some("Android"));
    assert_eq!(os.os_version.as_deref(), Some("14"));
    assert_eq!(os.browser_name.as_deref(), Some("Chrome"));
    assert_eq!(collect_device_info(&facts).device_type, Some(DeviceType::Mobile));
}

#[test]
fn firefox_on_linux_has_no_os_version() {
    let facts = facts_for(FIREFOX_LINUX);

    let os = collect_os_info(&facts);

    assert_eq!(os.os_name.as_deref(), Some("Linux"));
    assert_eq!(os.os_version, None);
    assert_eq!(os.browser_name.as_deref(), Some("Firefox"));
    assert_eq!(os.browser_version.as_deref(), Some("121.0"));
    assert_eq!(collect_device_info(&facts).device_type, Some(DeviceType::Desktop));
}

#[test]
fn client_hint_brands_skip_generic_entries() {
    // Arrange
    let facts = HostFacts {
        user_agent: Some(CHROME_WINDOWS.to_string()),
        client_hints: Some(ClientHints {
            platform: Some("Windows".to_string()),
            platform_version: None,
            brands: vec![
                BrandVersion {
                    brand: "Not_A Brand".to_string(),
                    version: "8".to_string(),
                },
                BrandVersion {
                    brand: "Chromium".to_string(),
                    version: "120".to_string(),
                },
                BrandVersion {
                    brand: "Google Chrome".to_string(),
                    version: "120".to_string(),
                },
            ],
            mobile: Some(false),
        }),
        platform: Some("Win32".to_string()),
        ..HostFacts::default()
    };

    // Act
    let os = collect_os_info(&facts);

    // Assert
    assert_eq!(os.browser_name.as_deref(), Some("Google Chrome"));
    assert_eq!(os.browser_version.as_deref(), Some("120"));
    assert_eq!(os.platform.as_deref(), Some("Windows"), "hint platform preferred");
    assert_eq!(os.os_name.as_deref(), Some("Windows"));
}

fn versionless_hint(brand: &str) -> ClientHints {
    ClientHints {
        brands: vec![BrandVersion {
            brand: brand.to_string(),
            version: String::new(),
        }],
        ..ClientHints::default()
    }
}

#[test]
fn versionless_brand_ignores_version_of_another_browser() {
    // Arrange
    let facts = HostFacts {
        client_hints: Some(versionless_hint("Google Chrome")),
        ..facts_for(FIREFOX_LINUX)
    };

    // Act
    let os = collect_os_info(&facts);

    // Assert
    assert_eq!(os.browser_name.as_deref(), Some("Google Chrome"));
    assert_eq!(os.browser_version, None);
}

#[test]
fn versionless_brand_borrows_version_of_same_browser() {
    let facts = HostFacts {
        client_hints: Some(versionless_hint("Google Chrome")),
        ..facts_for(CHROME_WINDOWS)
    };

    let os = collect_os_info(&facts);

    assert_eq!(os.browser_name.as_deref(), Some("Google Chrome"));
    assert_eq!(os.browser_version.as_deref(), Some("120.0.0.0"));
}

#[test]
fn hint_platform_names_the_os_when_no_identification_string() {
    let facts = HostFacts {
        client_hints: Some(ClientHints {
            platform: Some("Linux".to_string()),
            platform_version: Some("24.04".to_string()),
            brands: Vec::new(),
            mobile: Some(false),
        }),
        ..HostFacts::default()
    };

    let os = collect_os_info(&facts);

    assert_eq!(os.os_name.as_deref(), Some("Linux"));
    assert_eq!(os.os_version.as_deref(), Some("24.04"));
    assert_eq!(os.browser_name, None);
}

#[test]
fn languages_keep_preference_order() {
    let facts = HostFacts {
        languages: vec!["de-CH".to_string(), "fr".to_string(), "en".to_string()],
        ..HostFacts::default()
    };

    let os = collect_os_info(&facts);

    assert_eq!(os.primary_language.as_deref(), Some("de-CH"));
    assert_eq!(os.languages, vec!["de-CH", "fr", "en"]);
}

#[test]
fn lone_primary_language_becomes_the_list() {
    let facts = HostFacts {
        language: Some("pt-BR".to_string()),
        ..HostFacts::default()
    };

    let os = collect_os_info(&facts);

    assert_eq!(os.languages, vec!["pt-BR"]);
}

#[test]
fn nothing_known_leaves_fields_empty() {
    let facts = HostFacts::default();

    let os = collect_os_info(&facts);
    let device = collect_device_info(&facts);

    assert_eq!(os.os_name, None);
    assert_eq!(os.browser_name, None);
    assert!(os.languages.is_empty());
    assert_eq!(device.screen_width, None);
    assert_eq!(device.hardware_concurrency, None);
    assert_eq!(device.pixel_ratio, Some(1.0));
    assert_eq!(device.max_touch_points, Some(0));
    assert_eq!(device.device_type, Some(DeviceType::Desktop));
    assert!(!device.cookies_enabled);
}

#[test]
fn zero_screen_metrics_are_treated_as_unknown() {
    let facts = HostFacts {
        screen: Some(ScreenMetrics {
            width: Some(2560),
            height: Some(0),
            avail_width: Some(2560),
            avail_height: None,
            color_depth: Some(24),
        }),
        pixel_ratio: Some(2.0),
        hardware_concurrency: Some(0),
        do_not_track: Some(String::new()),
        ..HostFacts::default()
    };

    let device = collect_device_info(&facts);

    assert_eq!(device.screen_width, Some(2560));
    assert_eq!(device.screen_height, None);
    assert_eq!(device.available_height, None);
    assert_eq!(device.color_depth, Some(24));
    assert_eq!(device.pixel_ratio, Some(2.0));
    assert_eq!(device.hardware_concurrency, None);
    assert_eq!(device.do_not_track, None);
}

#[test]
fn mobile_hint_marks_device_mobile() {
    let hints = ClientHints {
        mobile: Some(true),
        ..ClientHints::default()
    };

    assert_eq!(classify_device(Some(CHROME_WINDOWS), Some(&hints)), DeviceType::Mobile);
    assert_eq!(classify_device(None, None), DeviceType::Desktop);
}

#[test]
fn locales_map_to_language_tags() {
    assert_eq!(locale_to_language_tag("en_US.UTF-8").as_deref(), Some("en-US"));
    assert_eq!(locale_to_language_tag("de_DE@euro").as_deref(), Some("de-DE"));
    assert_eq!(locale_to_language_tag("fr").as_deref(), Some("fr"));
    assert_eq!(locale_to_language_tag("C.UTF-8"), None);
    assert_eq!(locale_to_language_tag("POSIX"), None);
    assert_eq!(locale_to_language_tag(""), None);
}

#[test]
fn memory_rounds_to_power_of_two() {
    assert_eq!(round_memory_gb(15.5), 16.0);
    assert_eq!(round_memory_gb(7.6), 8.0);
    assert_eq!(round_memory_gb(0.4), 0.5);
    assert_eq!(round_memory_gb(0.0), 0.0);
}
