pub mod models;
pub mod receiver;
