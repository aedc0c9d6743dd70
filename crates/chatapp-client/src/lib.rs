pub mod alert;
pub mod context;
pub mod friends;
pub mod messages;
pub mod navigation;
pub mod user;

pub use alert::{AlertState, ToastItem};
pub use context::{AppContext, Services};
pub use friends::FriendsViewModel;
pub use messages::MessagesViewModel;
pub use navigation::{MainScreen, Navigation};
pub use user::UserViewModel;
