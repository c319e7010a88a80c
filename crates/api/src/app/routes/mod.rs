pub mod account;
pub mod common;
pub mod system;
pub mod users;
