use std::sync::OnceLock;

use regex::Regex;

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::BookingRecord,
    },
    jotter::prompts::extraction_prompt,
    providers::gemini::{ExtractionOutput, GeminiClient},
};

const MOCK_CONFIDENCE: f64 = 0.7;

const KNOWN_MAKES: [&str; 25] = [
    "ford", "vauxhall", "bmw", "audi", "toyota", "honda", "mercedes", "volkswagen", "nissan",
    "kia", "hyundai", "peugeot", "renault", "skoda", "seat", "mazda", "volvo", "jaguar", "mini",
    "fiat", "citroen", "suzuki", "dacia", "tesla", "lexus",
];

const ISSUE_TRIGGERS: [&str; 26] = [
    "warning", "light", "lights", "problem", "noise", "noisy", "leak", "leaking", "fault",
    "faulty", "mot", "service", "broken", "grinding", "squeal", "squealing", "rattle", "rattling",
    "smoke", "smoking", "overheating", "knocking", "puncture", "brakes", "tyre", "clutch",
];

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Z][a-z]+)\s+([A-Z][a-z]+)\b").expect("name pattern"))
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:07\d{9}|07\d{3}\s\d{6}|0\d{10}|0\d{4}\s\d{6}|0\d{3}\s\d{7})\b")
            .expect("phone pattern")
    })
}

fn plate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b([A-Z]{2}\d{2})\s?([A-Z]{3})\b").expect("plate pattern"))
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("year pattern"))
}

fn vehicle_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let makes = KNOWN_MAKES.join("|");
        Regex::new(&format!(
            r"(?i)\b({makes})\b(?:\s+([A-Za-z0-9][A-Za-z0-9-]*))?"
        ))
        .expect("vehicle pattern")
    })
}

fn is_known_make(word: &str) -> bool {
    let lowered = word.to_ascii_lowercase();
    KNOWN_MAKES.contains(&lowered.as_str())
}

fn find_name(text: &str) -> Option<String> {
    name_re()
        .captures_iter(text)
        .find(|caps| !is_known_make(&caps[1]))
        .map(|caps| caps[0].to_string())
}

fn find_vehicle(text: &str) -> Option<String> {
    let caps = vehicle_re().captures(text)?;
    let make = caps.get(1)?.as_str();
    match caps.get(2) {
        // A trailing year token belongs to the year field, not the model.
        Some(model) if !year_re().is_match(model.as_str()) => {
            Some(format!("{make} {}", model.as_str()))
        }
        _ => Some(make.to_string()),
    }
}

fn find_issue(text: &str) -> Option<String> {
    // Scan comma segments from the end; the first one carrying a trigger word
    // is the reported issue.
    for segment in text.rsplit(',') {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }
        let has_trigger = trimmed
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|word| {
                let lowered = word.to_ascii_lowercase();
                ISSUE_TRIGGERS.contains(&lowered.as_str())
            });
        if has_trigger {
            return Some(trimmed.to_string());
        }
    }
    None
}

// Deterministic fallback extractor. Unmatched fields stay empty; matched
// fields carry the fixed mock confidence.
pub fn mock_extract(text: &str) -> BookingRecord {
    let mut record = BookingRecord {
        is_mock: true,
        overall_confidence: Some(MOCK_CONFIDENCE),
        ..BookingRecord::default()
    };

    record.customer_name = find_name(text);
    record.phone = phone_re().find(text).map(|m| m.as_str().to_string());
    record.registration = plate_re()
        .captures(text)
        .map(|caps| format!("{} {}", &caps[1], &caps[2]));
    record.year = year_re().find(text).map(|m| m.as_str().to_string());
    record.vehicle = find_vehicle(text);
    record.issue = find_issue(text);

    for (field, value) in [
        ("customerName", record.customer_name.is_some()),
        ("phone", record.phone.is_some()),
        ("vehicle", record.vehicle.is_some()),
        ("year", record.year.is_some()),
        ("registration", record.registration.is_some()),
        ("issue", record.issue.is_some()),
    ] {
        if value {
            record.field_confidence.insert(field.to_string(), MOCK_CONFIDENCE);
        }
    }

    record
}

pub fn confidence_from_usage(output_tokens: Option<f64>) -> f64 {
    match output_tokens {
        Some(tokens) => (0.45 + 0.5 * (tokens / 120.0).min(1.0)).clamp(0.0, 1.0),
        None => 0.30,
    }
}

fn normalized(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn record_from_wire(output: ExtractionOutput) -> BookingRecord {
    let ExtractionOutput {
        fields,
        output_tokens,
        ..
    } = output;
    BookingRecord {
        customer_name: normalized(fields.customer_name),
        phone: normalized(fields.phone),
        vehicle: normalized(fields.vehicle),
        year: normalized(fields.year),
        registration: normalized(fields.registration),
        issue: normalized(fields.issue),
        notes: normalized(fields.notes),
        overall_confidence: Some(confidence_from_usage(output_tokens)),
        field_confidence: Default::default(),
        is_mock: false,
    }
}

fn degraded_reason(error: &AppError) -> String {
    match error {
        AppError::ProviderInvalidResponse(_) => {
            "The extraction service returned an unusable answer, so a local read is shown."
                .to_string()
        }
        AppError::ProviderTimeout => {
            "The extraction service took too long, so a local read is shown.".to_string()
        }
        AppError::ProviderAuth => {
            "The extraction service rejected the configured key, so a local read is shown."
                .to_string()
        }
        _ => "The extraction service was unavailable, so a local read is shown.".to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub record: BookingRecord,
    pub degraded_reason: Option<String>,
}

#[derive(Clone)]
pub struct ExtractionAdapter {
    client: GeminiClient,
}

impl ExtractionAdapter {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    // Always produces a record when given non-empty text: any live failure
    // degrades to the local extractor instead of failing the run.
    pub async fn extract(&self, text: &str, api_key: Option<&str>) -> AppResult<ExtractionOutcome> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AppError::InvalidInput(
                "there is no text to extract details from".to_string(),
            ));
        }

        let Some(api_key) = api_key else {
            log::info!("extraction service unconfigured, using local extractor");
            return Ok(ExtractionOutcome {
                record: mock_extract(trimmed),
                degraded_reason: None,
            });
        };

        match self
            .client
            .extract_fields(api_key, &extraction_prompt(trimmed))
            .await
        {
            Ok(output) => Ok(ExtractionOutcome {
                record: record_from_wire(output),
                degraded_reason: None,
            }),
            Err(error) => {
                log::warn!("live extraction failed, falling back: {error}");
                Ok(ExtractionOutcome {
                    record: mock_extract(trimmed),
                    degraded_reason: Some(degraded_reason(&error)),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::confidence_from_usage;

    #[test]
    fn usage_confidence_is_monotonic_and_bounded() {
        let mut last = confidence_from_usage(None);
        assert!((0.0..=1.0).contains(&last));
        for tokens in [0.0, 10.0, 60.0, 120.0, 500.0] {
            let next = confidence_from_usage(Some(tokens));
            assert!((0.0..=1.0).contains(&next));
            assert!(next >= last || tokens == 0.0);
            last = next;
        }
    }

    #[test]
    fn usage_confidence_saturates_past_the_token_knee() {
        assert_eq!(
            confidence_from_usage(Some(120.0)),
            confidence_from_usage(Some(10_000.0))
        );
    }
}
