//! Shared application state

use std::collections::HashMap;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tk_core::TokenLifecycleManager;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A registered demo account
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    password_digest: String,
}

impl Account {
    fn new(username: &str, password: &str) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            username: username.to_string(),
            password_digest: digest(id, password),
        }
    }

    fn verify(&self, password: &str) -> bool {
        self.password_digest == digest(self.id, password)
    }
}

// Salted with the account id; adequate for the in-process demo table only
fn digest(id: Uuid, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// In-process account table used by the demo routes
#[derive(Debug, Default)]
pub struct AccountDirectory {
    accounts: RwLock<HashMap<String, Account>>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account; `None` if the username is taken
    pub async fn register(&self, username: &str, password: &str) -> Option<Account> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(username) {
            return None;
        }
        let account = Account::new(username, password);
        accounts.insert(username.to_string(), account.clone());
        Some(account)
    }

    /// Account matching the credentials
    pub async fn verify(&self, username: &str, password: &str) -> Option<Account> {
        let accounts = self.accounts.read().await;
        accounts
            .get(username)
            .filter(|account| account.verify(password))
            .cloned()
    }
}

/// State shared by every route
pub struct AppState {
    pub manager: Arc<TokenLifecycleManager>,
    pub accounts: AccountDirectory,
}

impl AppState {
    pub fn new(manager: Arc<TokenLifecycleManager>) -> Self {
        Self {
            manager,
            accounts: AccountDirectory::new(),
        }
    }
}
