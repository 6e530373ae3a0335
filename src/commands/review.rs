use tauri::{AppHandle, Emitter, State};

use crate::{
    core::{
        errors::AppResult,
        types::{
            BeginEditResponse, CancelEditResponse, DispatchResponse, DispatchTarget,
            EditInputResponse, JotterDispatchEvent, SaveEditResponse, StartOverResponse,
        },
    },
    jotter::record::BookingField,
    AppState,
};

#[tauri::command]
pub async fn begin_edit(
    state: State<'_, AppState>,
    session_id: String,
    field: BookingField,
) -> AppResult<BeginEditResponse> {
    state.engine.begin_edit(&session_id, field).await
}

#[tauri::command]
pub async fn save_edit(
    state: State<'_, AppState>,
    session_id: String,
    field: BookingField,
    value: String,
) -> AppResult<SaveEditResponse> {
    Ok(SaveEditResponse {
        review: state.engine.save_edit(&session_id, field, value).await?,
    })
}

#[tauri::command]
pub async fn cancel_edit(
    state: State<'_, AppState>,
    session_id: String,
    field: BookingField,
) -> AppResult<CancelEditResponse> {
    Ok(CancelEditResponse {
        review: state.engine.cancel_edit(&session_id, field).await?,
    })
}

#[tauri::command]
pub async fn edit_input(
    state: State<'_, AppState>,
    session_id: String,
) -> AppResult<EditInputResponse> {
    Ok(EditInputResponse {
        session: state.engine.edit_input(&session_id).await?,
    })
}

#[tauri::command]
pub async fn start_over(
    state: State<'_, AppState>,
    session_id: String,
) -> AppResult<StartOverResponse> {
    Ok(StartOverResponse {
        session: state.engine.start_over(&session_id).await?,
    })
}

async fn dispatch(
    app: AppHandle,
    state: State<'_, AppState>,
    session_id: String,
    target: DispatchTarget,
) -> AppResult<DispatchResponse> {
    let response = state.engine.dispatch(&session_id, target).await?;
    let _ = app.emit(
        "jotter/dispatch",
        JotterDispatchEvent {
            session_id,
            target: response.target,
            prefill: response.prefill.clone(),
        },
    );
    Ok(response)
}

#[tauri::command]
pub async fn create_booking(
    app: AppHandle,
    state: State<'_, AppState>,
    session_id: String,
) -> AppResult<DispatchResponse> {
    dispatch(app, state, session_id, DispatchTarget::Booking).await
}

// Estimates ride the same contract as bookings; only the target tag differs.
#[tauri::command]
pub async fn create_estimate(
    app: AppHandle,
    state: State<'_, AppState>,
    session_id: String,
) -> AppResult<DispatchResponse> {
    dispatch(app, state, session_id, DispatchTarget::Estimate).await
}
