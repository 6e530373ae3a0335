use smart_jotter_lib::jotter::extraction::mock_extract;

const SAMPLE_NOTE: &str =
    "John Smith, 07712345678, Ford Focus 2018, YA19 ABC, Engine warning light";

#[test]
fn extracts_every_field_from_a_full_front_desk_note() {
    let record = mock_extract(SAMPLE_NOTE);

    assert_eq!(record.customer_name.as_deref(), Some("John Smith"));
    assert_eq!(record.phone.as_deref(), Some("07712345678"));
    assert!(record.vehicle.as_deref().unwrap_or("").contains("Ford Focus"));
    assert_eq!(record.year.as_deref(), Some("2018"));
    assert_eq!(record.registration.as_deref(), Some("YA19 ABC"));
    assert!(record.issue.as_deref().unwrap_or("").contains("Engine warning light"));
    assert!(record.is_mock);
    assert_eq!(record.overall_confidence, Some(0.7));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let first = serde_json::to_vec(&mock_extract(SAMPLE_NOTE)).expect("serialize");
    let second = serde_json::to_vec(&mock_extract(SAMPLE_NOTE)).expect("serialize");
    assert_eq!(first, second);
}

#[test]
fn unmatched_fields_stay_empty() {
    let record = mock_extract("please call back tomorrow about the thing");
    assert_eq!(record.customer_name, None);
    assert_eq!(record.phone, None);
    assert_eq!(record.vehicle, None);
    assert_eq!(record.year, None);
    assert_eq!(record.registration, None);
    assert_eq!(record.issue, None);
    assert!(record.field_confidence.is_empty());
    assert!(record.is_mock);
}

#[test]
fn registration_spacing_is_normalised() {
    let record = mock_extract("Sarah Jones, 07700900123, YA19ABC, brake problem");
    assert_eq!(record.registration.as_deref(), Some("YA19 ABC"));
}

#[test]
fn spaced_uk_numbers_are_recognised() {
    let mobile = mock_extract("Sarah Jones, 07700 900123, brake problem");
    assert_eq!(mobile.phone.as_deref(), Some("07700 900123"));

    let landline = mock_extract("Emma Wilson, 01614 960000, exhaust rattle noise");
    assert_eq!(landline.phone.as_deref(), Some("01614 960000"));
}

#[test]
fn issue_comes_from_the_last_segment_with_a_trigger_word() {
    let record = mock_extract("Tom Davies, coolant leak under the car, YA19 ABC");
    assert_eq!(record.issue.as_deref(), Some("coolant leak under the car"));
}

#[test]
fn vehicle_make_is_not_mistaken_for_a_customer_name() {
    let record = mock_extract("Ford Focus 2018, YA19 ABC, Emma Wilson, mot due");
    assert_eq!(record.customer_name.as_deref(), Some("Emma Wilson"));
    assert!(record.vehicle.as_deref().unwrap_or("").contains("Ford Focus"));
}

#[test]
fn vehicle_year_token_is_not_swallowed_into_the_model() {
    let record = mock_extract("Mike Brown, 07811223344, BMW 2020, squealing brakes");
    assert_eq!(record.vehicle.as_deref(), Some("BMW"));
    assert_eq!(record.year.as_deref(), Some("2020"));
}

#[test]
fn matched_fields_carry_the_fixed_mock_confidence() {
    let record = mock_extract(SAMPLE_NOTE);
    for field in ["customerName", "phone", "vehicle", "year", "registration", "issue"] {
        assert_eq!(record.field_confidence.get(field), Some(&0.7), "field {field}");
    }
    assert!(!record.field_confidence.contains_key("notes"));
}
