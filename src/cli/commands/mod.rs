mod init;
mod movers;
mod quote;

pub use init::cmd_init;
pub use movers::cmd_movers;
pub use quote::cmd_quote;
