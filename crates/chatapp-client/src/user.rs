use std::sync::Arc;

use chatapp_api::UserFetchService;
use chatapp_db::Database;
use chatapp_net::NetworkError;
use chatapp_types::User;
use tracing::{error, info, warn};

use crate::alert::AlertState;

pub const EMPTY_USERNAME: &str = "Please enter username!";
pub const EMPTY_PASSWORD: &str = "Please enter password!";

/// The signed-in user, plus the local copy that survives restarts.
pub struct UserViewModel {
    user: Option<User>,
    view_error: Option<NetworkError>,
    service: Arc<dyn UserFetchService>,
    store: Arc<Database>,
    alert: AlertState,
}

impl UserViewModel {
    pub fn new(service: Arc<dyn UserFetchService>, store: Arc<Database>, alert: AlertState) -> Self {
        Self {
            user: None,
            view_error: None,
            service,
            store,
            alert,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn view_error(&self) -> Option<&NetworkError> {
        self.view_error.as_ref()
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    /// Fetch the matching account and remember it locally.
    ///
    /// On failure `user` is left as it was, `view_error` holds the cause
    /// and a toast carries its message. Blank credentials are rejected
    /// before any request is made.
    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        if username.is_empty() {
            self.alert.show_toast(EMPTY_USERNAME);
            return false;
        }
        if password.is_empty() {
            self.alert.show_toast(EMPTY_PASSWORD);
            return false;
        }

        self.alert.show_loader();
        let result = self.service.fetch_user(username, password).await;
        self.alert.hide_loader();

        match result {
            Ok(user) => {
                info!("Logged in as {}", user.username);
                if let Err(e) = self.store(&user) {
                    error!("Failed to store current user: {:#}", e);
                    self.alert.show_toast("Failed to remember user");
                }
                self.user = Some(user);
                self.view_error = None;
                true
            }
            Err(e) => {
                warn!("Login failed for {}: {}", username, e);
                self.alert.show_toast(e.to_string());
                self.view_error = Some(e);
                false
            }
        }
    }

    /// Pick up the user stored by an earlier login.
    pub fn restore_session(&mut self) -> bool {
        match self.store.load_current_user() {
            Ok(Some(user)) => {
                info!("Restored session for {}", user.username);
                self.user = Some(user);
                true
            }
            Ok(None) => false,
            Err(e) => {
                error!("Failed to load stored user: {:#}", e);
                false
            }
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.delete_all_stored_users() {
            error!("Failed to clear stored users: {:#}", e);
        }
        self.user = None;
        self.view_error = None;
    }

    /// Replace the stored user with `user`.
    pub fn store(&self, user: &User) -> anyhow::Result<()> {
        self.store.save_current_user(user)
    }

    pub fn fetch_stored_users(&self) -> anyhow::Result<Vec<User>> {
        self.store.fetch_stored_users()
    }

    pub fn delete_all_stored_users(&self) -> anyhow::Result<usize> {
        self.store.delete_all()
    }

    pub fn delete_stored_user(&self, user: &User) -> anyhow::Result<usize> {
        self.store
            .delete_user(&user.username, &user.password, &user.uuid.to_string())
    }
}
