use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::core::{
    errors::{AppError, AppResult},
    types::{
        BookingRecord, DrawingData, InputKind, PipelineError, PipelineStage, SessionSnapshot,
    },
};
use crate::jotter::record::{build_review_view, BookingField};

#[derive(Debug, Clone)]
pub struct InputDraft {
    pub kind: InputKind,
    pub text: String,
    pub drawing: DrawingData,
}

impl Default for InputDraft {
    fn default() -> Self {
        Self {
            kind: InputKind::Text,
            text: String::new(),
            drawing: DrawingData::default(),
        }
    }
}

impl InputDraft {
    // Switching kind discards the data held for the now-inactive kind.
    pub fn set_kind(&mut self, kind: InputKind) {
        if self.kind == kind {
            return;
        }
        self.kind = kind;
        match kind {
            InputKind::Text => self.drawing = DrawingData::default(),
            InputKind::Drawing => self.text.clear(),
        }
    }

    pub fn undo_last_stroke(&mut self) -> usize {
        self.drawing.strokes.pop();
        self.drawing.strokes.len()
    }

    pub fn clear_drawing(&mut self) -> bool {
        let had_content = !self.drawing.strokes.is_empty() || self.drawing.image_png.is_some();
        self.drawing.strokes.clear();
        self.drawing.image_png = None;
        had_content
    }

    pub fn stroke_count(&self) -> usize {
        self.drawing.strokes.len()
    }

    pub fn has_raster(&self) -> bool {
        self.drawing
            .image_png
            .as_deref()
            .map(|raster| !raster.is_empty())
            .unwrap_or(false)
    }
}

pub fn transition_allowed(from: PipelineStage, to: PipelineStage) -> bool {
    use PipelineStage::*;
    matches!(
        (from, to),
        (AwaitingInput, Recognizing)
            | (AwaitingInput, Extracting)
            | (Recognizing, Extracting)
            | (Recognizing, Failed)
            | (Extracting, Reviewing)
            | (Extracting, Failed)
            | (Reviewing, Done)
            | (Reviewing, AwaitingInput)
            | (Failed, AwaitingInput)
    )
}

#[derive(Debug)]
pub struct JotterSession {
    pub id: String,
    pub stage: PipelineStage,
    pub generation: u64,
    pub run_id: Option<String>,
    pub input: InputDraft,
    pub record: Option<BookingRecord>,
    pub open_editors: BTreeSet<BookingField>,
    pub degraded_reason: Option<String>,
    pub last_error: Option<PipelineError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JotterSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            stage: PipelineStage::AwaitingInput,
            generation: 0,
            run_id: None,
            input: InputDraft::default(),
            record: None,
            open_editors: BTreeSet::new(),
            degraded_reason: None,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn advance(&mut self, to: PipelineStage) -> AppResult<()> {
        if !transition_allowed(self.stage, to) {
            return Err(AppError::Internal(format!(
                "illegal stage transition {} -> {}",
                self.stage.as_str(),
                to.as_str()
            )));
        }
        self.stage = to;
        self.touch();
        Ok(())
    }

    // In-flight results are tagged with the generation they started under;
    // bumping it makes any late arrival a no-op.
    pub fn invalidate_inflight(&mut self) {
        self.generation += 1;
        self.run_id = None;
    }

    pub fn fail(&mut self, error: &AppError) -> AppResult<()> {
        self.advance(PipelineStage::Failed)?;
        self.last_error = Some(PipelineError {
            code: error.code().to_string(),
            message: error.to_string(),
        });
        self.run_id = None;
        Ok(())
    }

    pub fn reset_to_input(&mut self, discard_input: bool) {
        self.stage = PipelineStage::AwaitingInput;
        self.record = None;
        self.open_editors.clear();
        self.degraded_reason = None;
        self.last_error = None;
        self.invalidate_inflight();
        if discard_input {
            let kind = self.input.kind;
            self.input = InputDraft::default();
            self.input.kind = kind;
        }
        self.touch();
    }

    pub fn review_view(&self) -> Option<crate::core::types::ReviewView> {
        self.record.as_ref().map(|record| {
            build_review_view(record, &self.open_editors, self.degraded_reason.as_deref())
        })
    }

    pub fn snapshot(&self, max_text_len: usize) -> SessionSnapshot {
        let review = self.review_view();
        SessionSnapshot {
            session_id: self.id.clone(),
            stage: self.stage,
            input_kind: self.input.kind,
            text: self.input.text.clone(),
            text_over_limit: self.input.text.chars().count() > max_text_len,
            stroke_count: self.input.stroke_count(),
            has_raster: self.input.has_raster(),
            review,
            last_error: self.last_error.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
