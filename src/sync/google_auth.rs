use std::path::PathBuf;
use thiserror::Error;
use yup_oauth2::{InstalledFlowAuthenticator, InstalledFlowReturnMethod};

use crate::storage::config::GoogleConfig;

pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to read client secret {path}: {source}")]
    ClientSecret {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to create token cache directory {path}: {source}")]
    TokenCacheDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to build authenticator: {0}")]
    Builder(std::io::Error),
    #[error("OAuth error: {0}")]
    OAuthError(#[from] yup_oauth2::Error),
    #[error("OAuth flow returned no access token")]
    MissingAccessToken,
}

pub struct GoogleAuthenticator {
    config: GoogleConfig,
}

impl GoogleAuthenticator {
    pub fn new(config: GoogleConfig) -> Self {
        Self { config }
    }

    pub async fn access_token(&self) -> Result<String, AuthError> {
        if let Some(parent) = self.config.token_cache.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AuthError::TokenCacheDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let secret = yup_oauth2::read_application_secret(&self.config.client_secret)
            .await
            .map_err(|source| AuthError::ClientSecret {
                path: self.config.client_secret.clone(),
                source,
            })?;

        let auth = InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::HTTPRedirect)
            .persist_tokens_to_disk(&self.config.token_cache)
            .build()
            .await
            .map_err(AuthError::Builder)?;

        tracing::info!("Requesting Google Calendar token");
        let token = auth.token(&[CALENDAR_SCOPE]).await?;

        token
            .token()
            .map(str::to_string)
            .ok_or(AuthError::MissingAccessToken)
    }
}
