pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

pub use domain::account;
pub use domain::authorization;
pub use domain::errors;
pub use outbound::repositories;
