use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::{BookingRecord, ConfidenceBand, ReviewView};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum BookingField {
    CustomerName,
    Phone,
    Vehicle,
    Year,
    Registration,
    Issue,
    Notes,
}

impl BookingField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CustomerName => "customerName",
            Self::Phone => "phone",
            Self::Vehicle => "vehicle",
            Self::Year => "year",
            Self::Registration => "registration",
            Self::Issue => "issue",
            Self::Notes => "notes",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CustomerName => "customer name",
            Self::Phone => "phone",
            Self::Vehicle => "vehicle",
            Self::Year => "year",
            Self::Registration => "registration",
            Self::Issue => "issue",
            Self::Notes => "notes",
        }
    }
}

pub const REQUIRED_FIELDS: [BookingField; 3] =
    [BookingField::CustomerName, BookingField::Phone, BookingField::Issue];

pub fn field_value<'a>(record: &'a BookingRecord, field: BookingField) -> Option<&'a str> {
    let slot = match field {
        BookingField::CustomerName => &record.customer_name,
        BookingField::Phone => &record.phone,
        BookingField::Vehicle => &record.vehicle,
        BookingField::Year => &record.year,
        BookingField::Registration => &record.registration,
        BookingField::Issue => &record.issue,
        BookingField::Notes => &record.notes,
    };
    slot.as_deref()
}

// Trims on write; an empty trimmed value clears the field rather than storing "".
pub fn set_field(record: &mut BookingRecord, field: BookingField, value: &str) {
    let trimmed = value.trim();
    let next = if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    };
    match field {
        BookingField::CustomerName => record.customer_name = next,
        BookingField::Phone => record.phone = next,
        BookingField::Vehicle => record.vehicle = next,
        BookingField::Year => record.year = next,
        BookingField::Registration => record.registration = next,
        BookingField::Issue => record.issue = next,
        BookingField::Notes => record.notes = next,
    }
}

fn is_filled(record: &BookingRecord, field: BookingField) -> bool {
    field_value(record, field)
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false)
}

pub fn is_actionable(record: &BookingRecord) -> bool {
    REQUIRED_FIELDS
        .iter()
        .all(|field| is_filled(record, *field))
}

pub fn missing_required_fields(record: &BookingRecord) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .filter(|field| !is_filled(record, **field))
        .map(|field| field.display_name())
        .collect()
}

pub fn has_vehicle_context(record: &BookingRecord) -> bool {
    is_filled(record, BookingField::Vehicle) || is_filled(record, BookingField::Registration)
}

pub fn band_for(confidence: f64) -> ConfidenceBand {
    if confidence >= 0.8 {
        ConfidenceBand::High
    } else if confidence >= 0.6 {
        ConfidenceBand::Medium
    } else {
        ConfidenceBand::Low
    }
}

pub fn build_review_view(
    record: &BookingRecord,
    open_editors: &BTreeSet<BookingField>,
    degraded_reason: Option<&str>,
) -> ReviewView {
    let field_bands = record
        .field_confidence
        .iter()
        .map(|(field, confidence)| (field.clone(), band_for(*confidence)))
        .collect();
    ReviewView {
        record: record.clone(),
        actionable: is_actionable(record),
        missing_required: missing_required_fields(record)
            .into_iter()
            .map(str::to_string)
            .collect(),
        has_vehicle_context: has_vehicle_context(record),
        overall_band: record.overall_confidence.map(band_for),
        field_bands,
        open_editors: open_editors
            .iter()
            .map(|field| field.as_str().to_string())
            .collect(),
        degraded_reason: degraded_reason.map(str::to_string),
    }
}
