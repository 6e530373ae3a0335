use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::{
            BeginEditResponse, BookingPrefill, ClearDrawingResponse, DispatchResponse,
            DispatchTarget, DrawingData, InputKind, JotterStageEvent, PipelineStage,
            RecognitionResult, ReviewView, SessionSnapshot, UndoStrokeResponse,
            UpdateDrawingResponse, UpdateTextResponse,
        },
    },
    jotter::{
        extraction::{ExtractionAdapter, ExtractionOutcome},
        recognition::{drawing_has_content, RecognitionAdapter},
        record::{field_value, is_actionable, missing_required_fields, set_field, BookingField},
        session::{InputDraft, JotterSession},
    },
    security::keyring::Credentials,
};

#[derive(Debug, Clone)]
pub struct JotterConfig {
    pub max_text_len: usize,
}

impl Default for JotterConfig {
    fn default() -> Self {
        Self { max_text_len: 1000 }
    }
}

#[derive(Debug, Clone)]
pub struct SubmitTicket {
    pub run_id: String,
    pub generation: u64,
    pub kind: InputKind,
    pub text: String,
    pub drawing: DrawingData,
}

#[derive(Debug, Clone)]
pub enum SubmitDecision {
    Accepted(SubmitTicket),
    Rejected { notice: String },
}

#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    Completed(ReviewView),
    Discarded,
}

#[derive(Clone)]
pub struct JotterEngine {
    config: JotterConfig,
    recognition: RecognitionAdapter,
    extraction: ExtractionAdapter,
    sessions: Arc<Mutex<HashMap<String, JotterSession>>>,
}

impl JotterEngine {
    pub fn new(
        config: JotterConfig,
        recognition: RecognitionAdapter,
        extraction: ExtractionAdapter,
    ) -> Self {
        Self {
            config,
            recognition,
            extraction,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn max_text_len(&self) -> usize {
        self.config.max_text_len
    }

    async fn with_session<T>(
        &self,
        session_id: &str,
        apply: impl FnOnce(&mut JotterSession) -> AppResult<T>,
    ) -> AppResult<T> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| AppError::NotFound(format!("session {session_id}")))?;
        apply(session)
    }

    pub async fn open_session(&self) -> SessionSnapshot {
        let session = JotterSession::new();
        let snapshot = session.snapshot(self.config.max_text_len);
        self.sessions
            .lock()
            .await
            .insert(session.id.clone(), session);
        snapshot
    }

    pub async fn snapshot(&self, session_id: &str) -> AppResult<SessionSnapshot> {
        let max_text_len = self.config.max_text_len;
        self.with_session(session_id, |session| Ok(session.snapshot(max_text_len)))
            .await
    }

    pub async fn close_session(&self, session_id: &str) -> bool {
        self.sessions.lock().await.remove(session_id).is_some()
    }

    pub async fn set_input_mode(
        &self,
        session_id: &str,
        kind: InputKind,
    ) -> AppResult<SessionSnapshot> {
        let max_text_len = self.config.max_text_len;
        self.with_session(session_id, |session| {
            if session.stage == PipelineStage::AwaitingInput {
                session.input.set_kind(kind);
                session.touch();
            }
            Ok(session.snapshot(max_text_len))
        })
        .await
    }

    pub async fn update_text(&self, session_id: &str, text: String) -> AppResult<UpdateTextResponse> {
        let max_text_len = self.config.max_text_len;
        self.with_session(session_id, |session| {
            if session.stage == PipelineStage::AwaitingInput {
                session.input.text = text;
                session.touch();
            }
            let length = session.input.text.chars().count();
            Ok(UpdateTextResponse {
                length,
                over_limit: length > max_text_len,
                remaining: max_text_len as i64 - length as i64,
            })
        })
        .await
    }

    pub async fn update_drawing(
        &self,
        session_id: &str,
        drawing: DrawingData,
    ) -> AppResult<UpdateDrawingResponse> {
        self.with_session(session_id, |session| {
            if session.stage == PipelineStage::AwaitingInput {
                session.input.drawing = drawing;
                session.touch();
            }
            Ok(UpdateDrawingResponse {
                stroke_count: session.input.stroke_count(),
                has_raster: session.input.has_raster(),
            })
        })
        .await
    }

    pub async fn undo_last_stroke(&self, session_id: &str) -> AppResult<UndoStrokeResponse> {
        self.with_session(session_id, |session| {
            if session.stage == PipelineStage::AwaitingInput {
                session.input.undo_last_stroke();
                session.touch();
            }
            Ok(UndoStrokeResponse {
                stroke_count: session.input.stroke_count(),
            })
        })
        .await
    }

    pub async fn clear_drawing(&self, session_id: &str) -> AppResult<ClearDrawingResponse> {
        self.with_session(session_id, |session| {
            let cleared = if session.stage == PipelineStage::AwaitingInput {
                let cleared = session.input.clear_drawing();
                session.touch();
                cleared
            } else {
                false
            };
            Ok(ClearDrawingResponse { cleared })
        })
        .await
    }

    pub async fn submit(&self, session_id: &str) -> AppResult<SubmitDecision> {
        let max_text_len = self.config.max_text_len;
        self.with_session(session_id, |session| {
            match session.stage {
                PipelineStage::Recognizing | PipelineStage::Extracting => {
                    return Ok(SubmitDecision::Rejected {
                        notice: "Still processing the previous note.".to_string(),
                    });
                }
                PipelineStage::Reviewing | PipelineStage::Failed | PipelineStage::Done => {
                    return Ok(SubmitDecision::Rejected {
                        notice: "This note was already processed. Start over to capture a new one."
                            .to_string(),
                    });
                }
                PipelineStage::AwaitingInput => {}
            }

            let (next_stage, text) = match session.input.kind {
                InputKind::Text => {
                    let trimmed = session.input.text.trim();
                    if trimmed.is_empty() {
                        return Ok(SubmitDecision::Rejected {
                            notice: "Nothing to process. Type the booking note first.".to_string(),
                        });
                    }
                    if session.input.text.chars().count() > max_text_len {
                        return Ok(SubmitDecision::Rejected {
                            notice: format!(
                                "The note is over the {max_text_len}-character limit. Shorten it to continue."
                            ),
                        });
                    }
                    (PipelineStage::Extracting, trimmed.to_string())
                }
                InputKind::Drawing => {
                    if !drawing_has_content(&session.input.drawing) {
                        return Ok(SubmitDecision::Rejected {
                            notice: "Nothing to process. Draw the booking note first.".to_string(),
                        });
                    }
                    (PipelineStage::Recognizing, String::new())
                }
            };

            session.advance(next_stage)?;
            session.last_error = None;
            let run_id = Uuid::new_v4().to_string();
            session.run_id = Some(run_id.clone());
            log::info!(
                "run {run_id} started for session {} ({})",
                session.id,
                match session.input.kind {
                    InputKind::Text => "text",
                    InputKind::Drawing => "drawing",
                }
            );
            Ok(SubmitDecision::Accepted(SubmitTicket {
                run_id,
                generation: session.generation,
                kind: session.input.kind,
                text,
                drawing: session.input.drawing.clone(),
            }))
        })
        .await
    }

    pub async fn run_pipeline<F>(
        &self,
        session_id: &str,
        ticket: SubmitTicket,
        credentials: Credentials,
        mut on_stage: F,
    ) -> AppResult<PipelineOutcome>
    where
        F: FnMut(JotterStageEvent) + Send,
    {
        let text = match ticket.kind {
            InputKind::Drawing => {
                on_stage(JotterStageEvent {
                    session_id: session_id.to_string(),
                    run_id: ticket.run_id.clone(),
                    stage: PipelineStage::Recognizing,
                    message: "Reading the handwriting".to_string(),
                });
                let result = match self
                    .recognition
                    .recognize(&ticket.drawing, credentials.handwriting.as_ref())
                    .await
                {
                    Ok(result) => result,
                    Err(error) => {
                        self.fail_run(session_id, &ticket, &error).await;
                        return Err(error);
                    }
                };
                match self.apply_recognition(session_id, &ticket, result).await? {
                    Some(text) => text,
                    None => return Ok(PipelineOutcome::Discarded),
                }
            }
            InputKind::Text => ticket.text.clone(),
        };

        on_stage(JotterStageEvent {
            session_id: session_id.to_string(),
            run_id: ticket.run_id.clone(),
            stage: PipelineStage::Extracting,
            message: "Extracting booking details".to_string(),
        });
        let outcome = match self
            .extraction
            .extract(&text, credentials.extraction.as_deref())
            .await
        {
            Ok(outcome) => outcome,
            Err(error) => {
                self.fail_run(session_id, &ticket, &error).await;
                return Err(error);
            }
        };

        match self.apply_extraction(session_id, &ticket, outcome).await? {
            Some(review) => Ok(PipelineOutcome::Completed(review)),
            None => Ok(PipelineOutcome::Discarded),
        }
    }

    // Applies a recognition result unless the run went stale (reset, start
    // over, or closed session bumped the generation).
    pub async fn apply_recognition(
        &self,
        session_id: &str,
        ticket: &SubmitTicket,
        result: RecognitionResult,
    ) -> AppResult<Option<String>> {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(session_id) else {
            return Ok(None);
        };
        if session.generation != ticket.generation {
            log::debug!("discarding stale recognition result for run {}", ticket.run_id);
            return Ok(None);
        }

        if let Some(message) = result.error {
            let error = AppError::RecognitionFailed(message);
            session.fail(&error)?;
            return Err(error);
        }
        let text = result.recognized_text.trim().to_string();
        if text.is_empty() {
            let error = AppError::RecognitionFailed(
                "Nothing legible was found. Try again or type the note.".to_string(),
            );
            session.fail(&error)?;
            return Err(error);
        }

        session.advance(PipelineStage::Extracting)?;
        Ok(Some(text))
    }

    pub async fn apply_extraction(
        &self,
        session_id: &str,
        ticket: &SubmitTicket,
        outcome: ExtractionOutcome,
    ) -> AppResult<Option<ReviewView>> {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(session_id) else {
            return Ok(None);
        };
        if session.generation != ticket.generation {
            log::debug!("discarding stale extraction result for run {}", ticket.run_id);
            return Ok(None);
        }

        session.advance(PipelineStage::Reviewing)?;
        session.record = Some(outcome.record);
        session.degraded_reason = outcome.degraded_reason;
        session.open_editors.clear();
        session.last_error = None;
        session.run_id = None;
        // The raw input is not retained once review begins.
        let kind = session.input.kind;
        session.input = InputDraft::default();
        session.input.set_kind(kind);
        Ok(session.review_view())
    }

    async fn fail_run(&self, session_id: &str, ticket: &SubmitTicket, error: &AppError) {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(session_id) else {
            return;
        };
        if session.generation != ticket.generation {
            return;
        }
        if let Err(transition_error) = session.fail(error) {
            log::error!("could not mark run {} failed: {transition_error}", ticket.run_id);
        }
    }

    pub async fn begin_edit(
        &self,
        session_id: &str,
        field: BookingField,
    ) -> AppResult<BeginEditResponse> {
        self.with_session(session_id, |session| {
            let record = reviewing_record(session)?;
            let current_value = field_value(record, field).unwrap_or("").to_string();
            session.open_editors.insert(field);
            session.touch();
            Ok(BeginEditResponse {
                field: field.as_str().to_string(),
                current_value,
            })
        })
        .await
    }

    pub async fn save_edit(
        &self,
        session_id: &str,
        field: BookingField,
        value: String,
    ) -> AppResult<ReviewView> {
        self.with_session(session_id, |session| {
            let record = reviewing_record_mut(session)?;
            set_field(record, field, &value);
            session.open_editors.remove(&field);
            session.touch();
            session
                .review_view()
                .ok_or_else(|| AppError::Internal("review view missing after edit".to_string()))
        })
        .await
    }

    pub async fn cancel_edit(
        &self,
        session_id: &str,
        field: BookingField,
    ) -> AppResult<ReviewView> {
        self.with_session(session_id, |session| {
            reviewing_record(session)?;
            session.open_editors.remove(&field);
            session.touch();
            session
                .review_view()
                .ok_or_else(|| AppError::Internal("review view missing after edit".to_string()))
        })
        .await
    }

    pub async fn edit_input(&self, session_id: &str) -> AppResult<SessionSnapshot> {
        let max_text_len = self.config.max_text_len;
        self.with_session(session_id, |session| {
            if session.stage != PipelineStage::Reviewing {
                return Err(AppError::InvalidInput(
                    "there is no reviewed note to go back from".to_string(),
                ));
            }
            session.reset_to_input(false);
            Ok(session.snapshot(max_text_len))
        })
        .await
    }

    pub async fn start_over(&self, session_id: &str) -> AppResult<SessionSnapshot> {
        let max_text_len = self.config.max_text_len;
        self.with_session(session_id, |session| {
            if session.stage != PipelineStage::Failed {
                return Err(AppError::InvalidInput(
                    "start over is only available after a failed run".to_string(),
                ));
            }
            session.reset_to_input(true);
            Ok(session.snapshot(max_text_len))
        })
        .await
    }

    pub async fn dispatch(
        &self,
        session_id: &str,
        target: DispatchTarget,
    ) -> AppResult<DispatchResponse> {
        self.with_session(session_id, |session| {
            if session.stage != PipelineStage::Reviewing {
                return Err(AppError::DispatchFailed(
                    "no reviewed record is ready to send".to_string(),
                ));
            }
            let Some(record) = session.record.as_ref() else {
                return Err(AppError::Internal("reviewing without a record".to_string()));
            };
            if !is_actionable(record) {
                return Err(AppError::DispatchFailed(format!(
                    "missing required fields: {}",
                    missing_required_fields(record).join(", ")
                )));
            }

            let prefill = BookingPrefill {
                customer_name: field_value(record, BookingField::CustomerName)
                    .unwrap_or("")
                    .to_string(),
                phone: field_value(record, BookingField::Phone).unwrap_or("").to_string(),
                vehicle: field_value(record, BookingField::Vehicle).unwrap_or("").to_string(),
                year: field_value(record, BookingField::Year).unwrap_or("").to_string(),
                registration: field_value(record, BookingField::Registration)
                    .unwrap_or("")
                    .to_string(),
                issue: field_value(record, BookingField::Issue).unwrap_or("").to_string(),
            };
            session.advance(PipelineStage::Done)?;
            log::info!("session {} dispatched to {}", session.id, target.as_str());
            Ok(DispatchResponse {
                dispatched: true,
                target,
                prefill,
            })
        })
        .await
    }
}

fn reviewing_record(session: &JotterSession) -> AppResult<&crate::core::types::BookingRecord> {
    if session.stage != PipelineStage::Reviewing {
        return Err(AppError::InvalidInput(
            "no record is open for review".to_string(),
        ));
    }
    session
        .record
        .as_ref()
        .ok_or_else(|| AppError::Internal("reviewing without a record".to_string()))
}

fn reviewing_record_mut(session: &mut JotterSession) -> AppResult<&mut crate::core::types::BookingRecord> {
    if session.stage != PipelineStage::Reviewing {
        return Err(AppError::InvalidInput(
            "no record is open for review".to_string(),
        ));
    }
    session
        .record
        .as_mut()
        .ok_or_else(|| AppError::Internal("reviewing without a record".to_string()))
}
