use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::{DrawingData, RecognitionResult},
    },
    providers::handwriting::HandwritingClient,
    security::keyring::HandwritingKeys,
};

const MOCK_CONFIDENCE: f64 = 0.85;
const LIVE_DEFAULT_CONFIDENCE: f64 = 0.9;

// Rotating stand-in notes so an unconfigured install still exercises the whole
// pipeline with realistic front-desk content.
const MOCK_PHRASES: [&str; 6] = [
    "John Smith, 07712345678, Ford Focus 2018, YA19 ABC, Engine warning light",
    "Sarah Jones, 07700 900123, Vauxhall Corsa 2019, VK19 XYZ, brakes grinding when stopping",
    "Mike Brown, 07811 223344, BMW 320d 2020, MT20 DEF, oil service due and slow puncture",
    "Emma Wilson, 01614 960000, Toyota Yaris 2017, YE17 GHJ, MOT booking plus tyre check",
    "Tom Davies, 07950 112233, Audi A3 2021, AD21 KLM, coolant leak warning on dash",
    "Priya Patel, 07400 556677, Honda Civic 2016, HC16 NPR, rattle noise from exhaust",
];

pub fn decoded_raster(drawing: &DrawingData) -> Option<Vec<u8>> {
    let raster = drawing.image_png.as_deref()?;
    if raster.is_empty() {
        return None;
    }
    base64::engine::general_purpose::STANDARD.decode(raster).ok()
}

// A drawing is submittable when it carries at least one stroke or a raster
// that actually decodes to a non-empty image.
pub fn drawing_has_content(drawing: &DrawingData) -> bool {
    if drawing.has_strokes() {
        return true;
    }
    match decoded_raster(drawing) {
        Some(bytes) => image::load_from_memory(&bytes)
            .map(|decoded| decoded.width() > 0 && decoded.height() > 0)
            .unwrap_or(false),
        None => false,
    }
}

fn size_digest(drawing: &DrawingData) -> u64 {
    let stroke_count = drawing.strokes.len() as u64;
    let point_count: u64 = drawing
        .strokes
        .iter()
        .map(|stroke| stroke.points.len() as u64)
        .sum();
    let raster_len = drawing
        .image_png
        .as_deref()
        .map(|raster| raster.len() as u64)
        .unwrap_or(0);

    let mut hasher = Sha256::new();
    hasher.update(stroke_count.to_le_bytes());
    hasher.update(point_count.to_le_bytes());
    hasher.update(raster_len.to_le_bytes());
    let digest = hasher.finalize();
    u64::from_le_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}

pub fn mock_recognize(drawing: &DrawingData) -> RecognitionResult {
    let phrase = MOCK_PHRASES[(size_digest(drawing) % MOCK_PHRASES.len() as u64) as usize];
    RecognitionResult {
        recognized_text: phrase.to_string(),
        confidence: MOCK_CONFIDENCE,
        is_mock: true,
        error: None,
    }
}

fn short_failure_message(error: &AppError) -> String {
    match error {
        AppError::ProviderAuth => "The handwriting service rejected the configured keys.".to_string(),
        AppError::ProviderRateLimited => "The handwriting service is busy. Try again shortly.".to_string(),
        AppError::ProviderTimeout => "Reading the handwriting took too long. Try again.".to_string(),
        _ => "The handwriting could not be read. Try again or type the note.".to_string(),
    }
}

#[derive(Clone)]
pub struct RecognitionAdapter {
    client: HandwritingClient,
}

impl RecognitionAdapter {
    pub fn new(client: HandwritingClient) -> Self {
        Self { client }
    }

    // Transport failures never escape: they come back inside the result's
    // `error` field. An Err here means a programmer fault (input capture is
    // supposed to gate empty drawings before this point).
    pub async fn recognize(
        &self,
        drawing: &DrawingData,
        keys: Option<&HandwritingKeys>,
    ) -> AppResult<RecognitionResult> {
        if !drawing.has_strokes() && decoded_raster(drawing).is_none() {
            return Err(AppError::Internal(
                "empty drawing reached the recognition adapter".to_string(),
            ));
        }

        let Some(keys) = keys else {
            log::info!("handwriting service unconfigured, using mock recognition");
            return Ok(mock_recognize(drawing));
        };

        match self.client.recognize(keys, drawing).await {
            Ok(export) => Ok(RecognitionResult {
                recognized_text: export.text,
                confidence: export
                    .confidence
                    .unwrap_or(LIVE_DEFAULT_CONFIDENCE)
                    .clamp(0.0, 1.0),
                is_mock: false,
                error: None,
            }),
            Err(error) => {
                log::warn!("handwriting recognition call failed: {error}");
                Ok(RecognitionResult {
                    recognized_text: String::new(),
                    confidence: 0.0,
                    is_mock: false,
                    error: Some(short_failure_message(&error)),
                })
            }
        }
    }
}
