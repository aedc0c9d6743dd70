use std::sync::Arc;

use chatapp_api::{MessagesFetchService, MessagesStoreService};
use chatapp_net::NetworkError;
use chatapp_types::{Message, Messages};
use tracing::{debug, info, warn};

use crate::alert::AlertState;

pub const SEND_FAILED: &str = "Failed to send message";

/// The open conversation between the current user and one friend.
pub struct MessagesViewModel {
    messages: Option<Messages>,
    view_error: Option<NetworkError>,
    fetch_service: Arc<dyn MessagesFetchService>,
    store_service: Arc<dyn MessagesStoreService>,
    alert: AlertState,
}

impl MessagesViewModel {
    pub fn new(
        fetch_service: Arc<dyn MessagesFetchService>,
        store_service: Arc<dyn MessagesStoreService>,
        alert: AlertState,
    ) -> Self {
        Self {
            messages: None,
            view_error: None,
            fetch_service,
            store_service,
            alert,
        }
    }

    pub fn messages(&self) -> Option<&Messages> {
        self.messages.as_ref()
    }

    pub fn view_error(&self) -> Option<&NetworkError> {
        self.view_error.as_ref()
    }

    pub fn set_messages(&mut self, messages: Option<Messages>) {
        self.messages = messages;
    }

    pub fn clear(&mut self) {
        self.messages = None;
        self.view_error = None;
    }

    pub async fn get_messages(&mut self, username: &str, from_user: &str) {
        match self.fetch_service.fetch_messages(username, from_user).await {
            Ok(messages) => {
                debug!("{} message(s) between {} and {}", messages.len(), username, from_user);
                self.set_messages(Some(messages));
                self.view_error = None;
            }
            Err(e) => self.fail("Failed to retrieve messages", e),
        }
    }

    /// Store `message`, then reload the conversation so the list reflects
    /// what the backend now holds.
    pub async fn send_message(&mut self, username: &str, from_user: &str, message: &Message) -> bool {
        match self.store_service.store_message(username, message).await {
            Ok(true) => {
                info!("Message {} stored", message.id);
                self.get_messages(username, from_user).await;
                true
            }
            Ok(false) => {
                warn!("Message {} was not stored", message.id);
                self.alert.show_toast(SEND_FAILED);
                false
            }
            Err(e) => {
                self.fail("Failed to send message", e);
                false
            }
        }
    }

    /// Build and send a message typed by `username` to `to_user`. Blank
    /// text is ignored.
    pub async fn send_text(&mut self, username: &str, to_user: &str, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let message = Message::new_outgoing(username, to_user, text);
        self.send_message(username, to_user, &message).await
    }

    fn fail(&mut self, what: &str, e: NetworkError) {
        warn!("{}: {}", what, e);
        self.alert.show_toast(e.to_string());
        self.view_error = Some(e);
    }
}
