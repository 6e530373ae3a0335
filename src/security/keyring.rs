use crate::core::{
    errors::{AppError, AppResult},
    types::Provider,
};

const SERVICE: &str = "smart-jotter";
const HANDWRITING_APP_KEY: &str = "handwriting-application-key";
const HANDWRITING_SIGNING_KEY: &str = "handwriting-signing-key";
const EXTRACTION_API_KEY: &str = "extraction-api-key";

#[derive(Debug, Clone)]
pub struct HandwritingKeys {
    pub application_key: String,
    pub signing_key: String,
}

#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub handwriting: Option<HandwritingKeys>,
    pub extraction: Option<String>,
}

fn store(username: &str, value: &str) -> AppResult<()> {
    let entry = keyring::Entry::new(SERVICE, username)
        .map_err(|err| AppError::Internal(err.to_string()))?;
    entry
        .set_password(value)
        .map_err(|err| AppError::Internal(err.to_string()))
}

fn read(username: &str) -> Option<String> {
    let entry = keyring::Entry::new(SERVICE, username).ok()?;
    entry.get_password().ok()
}

pub fn set_provider_key(
    provider: Provider,
    api_key: &str,
    signing_key: Option<&str>,
) -> AppResult<()> {
    match provider {
        Provider::Handwriting => {
            let signing = signing_key.map(str::trim).filter(|key| !key.is_empty());
            let signing = signing.ok_or_else(|| {
                AppError::InvalidInput(
                    "handwriting provider needs both an application key and a signing key"
                        .to_string(),
                )
            })?;
            store(HANDWRITING_APP_KEY, api_key)?;
            store(HANDWRITING_SIGNING_KEY, signing)
        }
        Provider::Extraction => store(EXTRACTION_API_KEY, api_key),
    }
}

// Missing or unreadable entries select the mock fallback, so lookup never errors.
pub fn load_credentials() -> Credentials {
    let handwriting = match (read(HANDWRITING_APP_KEY), read(HANDWRITING_SIGNING_KEY)) {
        (Some(application_key), Some(signing_key)) => Some(HandwritingKeys {
            application_key,
            signing_key,
        }),
        _ => None,
    };
    Credentials {
        handwriting,
        extraction: read(EXTRACTION_API_KEY),
    }
}

pub fn provider_configured(provider: Provider) -> bool {
    match provider {
        Provider::Handwriting => {
            read(HANDWRITING_APP_KEY).is_some() && read(HANDWRITING_SIGNING_KEY).is_some()
        }
        Provider::Extraction => read(EXTRACTION_API_KEY).is_some(),
    }
}
