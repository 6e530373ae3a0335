use smart_jotter_lib::core::types::{BookingRecord, ConfidenceBand};
use smart_jotter_lib::jotter::record::{
    band_for, build_review_view, field_value, has_vehicle_context, is_actionable,
    missing_required_fields, set_field, BookingField,
};

fn actionable_record() -> BookingRecord {
    BookingRecord {
        customer_name: Some("John Smith".to_string()),
        phone: Some("07712345678".to_string()),
        issue: Some("Engine warning light".to_string()),
        ..BookingRecord::default()
    }
}

#[test]
fn save_edit_trims_and_is_idempotent() {
    let mut record = BookingRecord::default();
    set_field(&mut record, BookingField::CustomerName, "  John Smith  ");
    assert_eq!(field_value(&record, BookingField::CustomerName), Some("John Smith"));

    // Saving the already-trimmed value changes nothing.
    let before = record.clone();
    set_field(&mut record, BookingField::CustomerName, "John Smith");
    assert_eq!(record, before);
}

#[test]
fn saving_whitespace_clears_the_field() {
    let mut record = actionable_record();
    set_field(&mut record, BookingField::Phone, "   ");
    assert_eq!(field_value(&record, BookingField::Phone), None);
    assert!(!is_actionable(&record));
}

#[test]
fn actionable_needs_name_phone_and_issue_only() {
    let mut record = actionable_record();
    assert!(is_actionable(&record));

    // Vehicle context never moves the gate.
    set_field(&mut record, BookingField::Vehicle, "Ford Focus");
    set_field(&mut record, BookingField::Registration, "YA19 ABC");
    assert!(is_actionable(&record));
    set_field(&mut record, BookingField::Vehicle, "");
    set_field(&mut record, BookingField::Registration, "");
    assert!(is_actionable(&record));

    set_field(&mut record, BookingField::Issue, "");
    assert!(!is_actionable(&record));
}

#[test]
fn missing_fields_are_reported_by_display_name() {
    let record = BookingRecord {
        customer_name: Some("".to_string()),
        phone: Some("07712345678".to_string()),
        issue: Some("noise".to_string()),
        ..BookingRecord::default()
    };
    assert!(!is_actionable(&record));
    assert_eq!(missing_required_fields(&record), vec!["customer name"]);
}

#[test]
fn vehicle_context_is_advisory() {
    let mut record = BookingRecord::default();
    assert!(!has_vehicle_context(&record));
    set_field(&mut record, BookingField::Registration, "YA19 ABC");
    assert!(has_vehicle_context(&record));
    set_field(&mut record, BookingField::Registration, "");
    set_field(&mut record, BookingField::Vehicle, "Ford Focus");
    assert!(has_vehicle_context(&record));
}

#[test]
fn confidence_bands_split_at_point_six_and_point_eight() {
    assert_eq!(band_for(1.0), ConfidenceBand::High);
    assert_eq!(band_for(0.8), ConfidenceBand::High);
    assert_eq!(band_for(0.79), ConfidenceBand::Medium);
    assert_eq!(band_for(0.6), ConfidenceBand::Medium);
    assert_eq!(band_for(0.59), ConfidenceBand::Low);
    assert_eq!(band_for(0.0), ConfidenceBand::Low);
}

#[test]
fn missing_confidence_renders_as_no_data_not_low() {
    let mut record = actionable_record();
    record.field_confidence.insert("phone".to_string(), 0.9);

    let view = build_review_view(&record, &Default::default(), None);
    assert_eq!(view.field_bands.get("phone"), Some(&ConfidenceBand::High));
    // No entry at all for fields without a confidence value.
    assert!(!view.field_bands.contains_key("customerName"));
    assert!(view.overall_band.is_none());
}

#[test]
fn review_view_reports_gate_and_missing_fields() {
    let mut record = actionable_record();
    let view = build_review_view(&record, &Default::default(), None);
    assert!(view.actionable);
    assert!(view.missing_required.is_empty());

    set_field(&mut record, BookingField::CustomerName, "");
    set_field(&mut record, BookingField::Phone, "");
    let view = build_review_view(&record, &Default::default(), Some("soft notice"));
    assert!(!view.actionable);
    assert_eq!(view.missing_required, vec!["customer name", "phone"]);
    assert_eq!(view.degraded_reason.as_deref(), Some("soft notice"));
}
