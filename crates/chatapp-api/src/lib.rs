pub mod endpoints;
pub mod fixture;
pub mod messages;
pub mod users;

pub use fixture::{
    FixtureFile, FixtureFriendsService, FixtureMessagesFetchService, FixtureMessagesStoreService, FixtureUserService,
};
pub use messages::{HttpMessagesService, MessagesFetchService, MessagesStoreService};
pub use users::{FriendsFetchService, HttpFriendsService, HttpUserService, UserFetchService};
