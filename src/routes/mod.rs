pub mod data;
pub mod notify;
