use std::sync::Arc;

use chatapp_api::FriendsFetchService;
use chatapp_net::NetworkError;
use chatapp_types::Users;
use tracing::{debug, warn};

use crate::alert::AlertState;

pub struct FriendsViewModel {
    friends: Option<Users>,
    view_error: Option<NetworkError>,
    service: Arc<dyn FriendsFetchService>,
    alert: AlertState,
}

impl FriendsViewModel {
    pub fn new(service: Arc<dyn FriendsFetchService>, alert: AlertState) -> Self {
        Self {
            friends: None,
            view_error: None,
            service,
            alert,
        }
    }

    /// `None` until the first successful fetch.
    pub fn friends(&self) -> Option<&Users> {
        self.friends.as_ref()
    }

    pub fn view_error(&self) -> Option<&NetworkError> {
        self.view_error.as_ref()
    }

    /// Replace the list with everyone but the caller. A failed fetch keeps
    /// the previous list.
    pub async fn get_friends(&mut self, username: &str, password: &str) {
        match self.service.fetch_friends(username, password).await {
            Ok(friends) => {
                debug!("{} has {} friend(s)", username, friends.len());
                self.friends = Some(friends);
                self.view_error = None;
            }
            Err(e) => {
                warn!("Failed to retrieve friends: {}", e);
                self.alert.show_toast(e.to_string());
                self.view_error = Some(e);
            }
        }
    }

    pub fn clear(&mut self) {
        self.friends = None;
        self.view_error = None;
    }
}
