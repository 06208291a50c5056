pub mod claims;
pub mod errors;
pub mod signer;

pub use claims::Claims;
pub use errors::TokenError;
pub use signer::TokenSigner;
