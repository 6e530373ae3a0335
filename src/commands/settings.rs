use tauri::State;

use crate::{
    core::{
        errors::{AppError, AppResult},
        types::{Provider, ProviderStatusResponse, SetProviderKeyResponse},
    },
    security::keyring,
    AppState,
};

#[tauri::command]
pub async fn set_provider_key(
    _state: State<'_, AppState>,
    provider: Provider,
    api_key: String,
    signing_key: Option<String>,
) -> AppResult<SetProviderKeyResponse> {
    if api_key.trim().is_empty() {
        return Err(AppError::InvalidInput("api key cannot be empty".to_string()));
    }
    keyring::set_provider_key(provider, api_key.trim(), signing_key.as_deref())?;
    Ok(SetProviderKeyResponse { stored: true })
}

#[tauri::command]
pub async fn provider_status(_state: State<'_, AppState>) -> AppResult<ProviderStatusResponse> {
    Ok(ProviderStatusResponse {
        handwriting_configured: keyring::provider_configured(Provider::Handwriting),
        extraction_configured: keyring::provider_configured(Provider::Extraction),
    })
}
