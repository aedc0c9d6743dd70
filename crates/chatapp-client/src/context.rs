use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chatapp_api::{
    FixtureFriendsService, FixtureMessagesFetchService, FixtureMessagesStoreService, FixtureUserService,
    FriendsFetchService, HttpFriendsService, HttpMessagesService, HttpUserService, MessagesFetchService,
    MessagesStoreService, UserFetchService,
};
use chatapp_db::Database;
use chatapp_net::{ClientConfig, RequestExecutor};
use tracing::info;

use crate::alert::AlertState;
use crate::friends::FriendsViewModel;
use crate::messages::MessagesViewModel;
use crate::navigation::{MainScreen, Navigation};
use crate::user::UserViewModel;

/// The four backends the view-models talk to.
#[derive(Clone)]
pub struct Services {
    pub user: Arc<dyn UserFetchService>,
    pub friends: Arc<dyn FriendsFetchService>,
    pub messages_fetch: Arc<dyn MessagesFetchService>,
    pub messages_store: Arc<dyn MessagesStoreService>,
}

impl Services {
    pub fn http(executor: &RequestExecutor) -> Self {
        let messages = Arc::new(HttpMessagesService::new(executor.clone()));
        Self {
            user: Arc::new(HttpUserService::new(executor.clone())),
            friends: Arc::new(HttpFriendsService::new(executor.clone())),
            messages_fetch: messages.clone(),
            messages_store: messages,
        }
    }

    /// Sample files under `dir`, with reads and writes going to the
    /// default content files.
    pub fn fixtures(dir: &Path) -> Self {
        Self {
            user: Arc::new(FixtureUserService::new(dir)),
            friends: Arc::new(FixtureFriendsService::new(dir)),
            messages_fetch: Arc::new(FixtureMessagesFetchService::new(dir)),
            messages_store: Arc::new(FixtureMessagesStoreService::new(dir)),
        }
    }
}

/// Everything a front end needs, wired once at start-up.
pub struct AppContext {
    pub alert: AlertState,
    pub navigation: Navigation,
    pub users: UserViewModel,
    pub friends: FriendsViewModel,
    pub messages: MessagesViewModel,
}

impl AppContext {
    /// HTTP services against `config.api_host`, session stored at `db_path`.
    pub fn open(config: ClientConfig, db_path: &Path) -> Result<Self> {
        let executor = RequestExecutor::new(config)?;
        let db = Arc::new(Database::open(db_path)?);
        info!("Client using {}", executor.config().api_host);
        Ok(Self::with_services(Services::http(&executor), db))
    }

    pub fn with_services(services: Services, db: Arc<Database>) -> Self {
        let alert = AlertState::new();
        Self {
            navigation: Navigation::new(),
            users: UserViewModel::new(services.user, db, alert.clone()),
            friends: FriendsViewModel::new(services.friends, alert.clone()),
            messages: MessagesViewModel::new(services.messages_fetch, services.messages_store, alert.clone()),
            alert,
        }
    }

    /// Restore a stored session, if any, and pick the first screen.
    pub fn start(&mut self) -> MainScreen {
        let screen = if self.users.restore_session() {
            MainScreen::Home
        } else {
            MainScreen::Login
        };
        self.navigation.set_main_screen(screen);
        screen
    }

    pub async fn login(&mut self, username: &str, password: &str) -> bool {
        let logged_in = self.users.login(username, password).await;
        if logged_in {
            self.navigation.set_main_screen(MainScreen::Home);
        }
        logged_in
    }

    /// Friends of whoever is signed in. No-op when nobody is.
    pub async fn refresh_friends(&mut self) {
        let Some(user) = self.users.user().cloned() else {
            return;
        };
        self.friends.get_friends(&user.username, &user.password).await;
    }

    pub async fn open_conversation(&mut self, friend: &str) {
        let Some(username) = self.users.user().map(|u| u.username.clone()) else {
            return;
        };
        self.messages.get_messages(&username, friend).await;
    }

    pub async fn send(&mut self, friend: &str, text: &str) -> bool {
        let Some(username) = self.users.user().map(|u| u.username.clone()) else {
            return false;
        };
        self.messages.send_text(&username, friend, text).await
    }

    pub fn logout(&mut self) {
        self.users.logout();
        self.friends.clear();
        self.messages.clear();
        self.alert.set_toast(None);
        self.alert.hide_loader();
        self.navigation.set_main_screen(MainScreen::Login);
    }
}
