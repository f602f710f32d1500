pub mod list;
pub mod populate;
