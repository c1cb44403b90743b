//! Access tokens for the Sheets API.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use async_trait::async_trait;
use gcp_auth::CustomServiceAccount;
use gcp_auth::TokenProvider;
use log::info;
use log::warn;

use crate::repository::error::StoreError;

pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Supplies bearer tokens for store requests.
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// A token valid for at least the next request.
    async fn access_token(&self) -> Result<String, StoreError>;

    /// Called after the API rejected a token. The next
    /// [`access_token`](Self::access_token) must not return it again.
    async fn invalidate(&self) {}
}

/// Tokens minted from a service account key file.
///
/// Tokens are cached and renewed shortly before they expire. A rejected
/// token drops the cache by reloading the key file.
pub struct ServiceAccountTokens {
    path: PathBuf,
    account: RwLock<Arc<CustomServiceAccount>>,
}

impl ServiceAccountTokens {
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let account = Self::load(&path)?;
        info!("Loaded Sheets service account from `{}`.", path.display());
        Ok(Self {
            path,
            account: RwLock::new(Arc::new(account)),
        })
    }

    fn load(path: &Path) -> Result<CustomServiceAccount, StoreError> {
        CustomServiceAccount::from_file(path).map_err(|e| StoreError::AuthFailed {
            message: format!("Cannot load service account `{}`: {e}", path.display()),
        })
    }

    fn account(&self) -> Arc<CustomServiceAccount> {
        self.account
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountTokens {
    async fn access_token(&self) -> Result<String, StoreError> {
        let token = self.account().token(&[SHEETS_SCOPE]).await?;
        Ok(token.as_str().to_string())
    }

    async fn invalidate(&self) {
        match Self::load(&self.path) {
            Ok(account) => {
                *self.account.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(account);
            }
            Err(e) => warn!("Keeping cached Sheets token: {e}"),
        }
    }
}
