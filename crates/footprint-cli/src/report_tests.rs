use crate::report::{device_rows, human_report, status_line, view_json};
use footprint_core::{DeviceRecord, DeviceType, LoadingState, NetworkRecord, TrackerView};

fn populated_view() -> TrackerView {
    TrackerView {
        state: LoadingState::Success,
        network: NetworkRecord {
            ip: Some("203.0.113.5".to_string()),
            country: Some("Wonderland".to_string()),
            latitude: Some(12.5),
            longitude: Some(-3.25),
            ..NetworkRecord::empty()
        },
        device: DeviceRecord {
            device_type: Some(DeviceType::Desktop),
            timezone_offset: Some(-330),
            ..DeviceRecord::empty()
        },
        last_updated: Some(1_760_000_000_000),
        ..TrackerView::default()
    }
}

#[test]
fn json_output_carries_state_and_records() {
    // Arrange
    let view = populated_view();

    // Act
    let value = view_json(&view);

    // Assert
    assert_eq!(value["state"], "success");
    assert_eq!(value["hasData"], true);
    assert_eq!(value["isLoading"], false);
    assert_eq!(value["network"]["ip"], "203.0.113.5");
    assert_eq!(value["machine"]["deviceType"], "Desktop");
    assert_eq!(value["lastUpdated"], 1_760_000_000_000_i64);
}

#[test]
fn success_without_data_says_so() {
    let view = TrackerView {
        state: LoadingState::Success,
        ..TrackerView::default()
    };

    let report = human_report(&view);

    assert!(report.contains("no data available"));
    assert!(!report.contains("Network:"), "panels hidden without data");
}

#[test]
fn error_state_shows_message() {
    let view = TrackerView {
        state: LoadingState::Error,
        error_message: Some("disk full".to_string()),
        ..TrackerView::default()
    };

    assert_eq!(status_line(&view), "error: disk full");
}

#[test]
fn populated_report_lists_all_panels() {
    let report = human_report(&populated_view());

    assert!(report.contains("Network:"));
    assert!(report.contains("System:"));
    assert!(report.contains("Device:"));
    assert!(report.contains("203.0.113.5"));
    assert!(report.contains("12.5000, -3.2500"));
}

#[test]
fn timezone_offset_is_shown_east_positive() {
    let rows = device_rows(&populated_view());

    let offset = rows
        .iter()
        .find(|(label, _)| *label == "Offset")
        .map(|(_, value)| value.as_str());

    assert_eq!(offset, Some("UTC+05:30"));
}

#[test]
fn revalidating_view_keeps_cached_panels() {
    // Arrange
    let view = TrackerView {
        state: LoadingState::Loading,
        revalidating: true,
        ..populated_view()
    };

    // Act
    let report = human_report(&view);

    // Assert
    assert!(status_line(&view).starts_with("cached from"));
    assert!(status_line(&view).ends_with(", refreshing"));
    assert!(report.contains("Network:"));
    assert!(report.contains("203.0.113.5"));
}

#[test]
fn report_lines_end_with_newlines() {
    let report = human_report(&populated_view());

    assert!(report.starts_with("=== Digital Footprint ===\nStatus:"));
    assert!(report.ends_with('\n'));
    assert!(report.contains("Network:\n  IP           203.0.113.5\n"));
}
