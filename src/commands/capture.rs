use tauri::{AppHandle, Emitter, State};

use crate::{
    core::{
        errors::AppResult,
        types::{
            ClearDrawingResponse, CloseJotterResponse, DrawingData, GetSessionResponse, InputKind,
            JotterCompleteEvent, JotterErrorEvent, OpenJotterResponse, SetInputModeResponse,
            SubmitInputResponse, UndoStrokeResponse, UpdateDrawingResponse, UpdateTextResponse,
        },
    },
    jotter::orchestrator::{PipelineOutcome, SubmitDecision},
    security::keyring,
    AppState,
};

#[tauri::command]
pub async fn open_jotter(state: State<'_, AppState>) -> AppResult<OpenJotterResponse> {
    Ok(OpenJotterResponse {
        session: state.engine.open_session().await,
    })
}

#[tauri::command]
pub async fn get_session(
    state: State<'_, AppState>,
    session_id: String,
) -> AppResult<GetSessionResponse> {
    Ok(GetSessionResponse {
        session: state.engine.snapshot(&session_id).await?,
    })
}

#[tauri::command]
pub async fn close_jotter(
    state: State<'_, AppState>,
    session_id: String,
) -> AppResult<CloseJotterResponse> {
    Ok(CloseJotterResponse {
        closed: state.engine.close_session(&session_id).await,
    })
}

#[tauri::command]
pub async fn set_input_mode(
    state: State<'_, AppState>,
    session_id: String,
    kind: InputKind,
) -> AppResult<SetInputModeResponse> {
    Ok(SetInputModeResponse {
        session: state.engine.set_input_mode(&session_id, kind).await?,
    })
}

#[tauri::command]
pub async fn update_text(
    state: State<'_, AppState>,
    session_id: String,
    text: String,
) -> AppResult<UpdateTextResponse> {
    state.engine.update_text(&session_id, text).await
}

#[tauri::command]
pub async fn update_drawing(
    state: State<'_, AppState>,
    session_id: String,
    drawing: DrawingData,
) -> AppResult<UpdateDrawingResponse> {
    state.engine.update_drawing(&session_id, drawing).await
}

#[tauri::command]
pub async fn undo_last_stroke(
    state: State<'_, AppState>,
    session_id: String,
) -> AppResult<UndoStrokeResponse> {
    state.engine.undo_last_stroke(&session_id).await
}

#[tauri::command]
pub async fn clear_drawing(
    state: State<'_, AppState>,
    session_id: String,
) -> AppResult<ClearDrawingResponse> {
    state.engine.clear_drawing(&session_id).await
}

#[tauri::command]
pub async fn submit_input(
    app: AppHandle,
    state: State<'_, AppState>,
    session_id: String,
) -> AppResult<SubmitInputResponse> {
    match state.engine.submit(&session_id).await? {
        SubmitDecision::Rejected { notice } => Ok(SubmitInputResponse {
            accepted: false,
            run_id: None,
            notice: Some(notice),
        }),
        SubmitDecision::Accepted(ticket) => {
            let run_id = ticket.run_id.clone();
            let engine = state.engine.clone();
            let app_for_task = app.clone();
            let session_for_task = session_id.clone();
            let run_id_for_task = run_id.clone();

            tauri::async_runtime::spawn(async move {
                // Keychain access stays off the command path.
                let credentials = keyring::load_credentials();
                let stage_app = app_for_task.clone();
                let outcome = engine
                    .run_pipeline(&session_for_task, ticket, credentials, |stage_event| {
                        let _ = stage_app.emit("jotter/stage", stage_event);
                    })
                    .await;

                match outcome {
                    Ok(PipelineOutcome::Completed(review)) => {
                        let _ = app_for_task.emit(
                            "jotter/complete",
                            JotterCompleteEvent {
                                session_id: session_for_task,
                                run_id: run_id_for_task,
                                review,
                            },
                        );
                    }
                    Ok(PipelineOutcome::Discarded) => {}
                    Err(error) => {
                        let _ = app_for_task.emit(
                            "jotter/error",
                            JotterErrorEvent {
                                session_id: session_for_task,
                                run_id: run_id_for_task,
                                code: error.code().to_string(),
                                message: error.to_string(),
                                recoverable: error.recoverable(),
                            },
                        );
                    }
                }
            });

            Ok(SubmitInputResponse {
                accepted: true,
                run_id: Some(run_id),
                notice: None,
            })
        }
    }
}
