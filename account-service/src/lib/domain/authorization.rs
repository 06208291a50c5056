pub mod credential;
pub mod models;
pub mod ports;
pub mod session;
pub mod token;
