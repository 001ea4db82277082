pub mod prelude;

pub mod users;
pub mod watch_items;
