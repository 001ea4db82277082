pub use super::users::Entity as Users;
pub use super::watch_items::Entity as WatchItems;
