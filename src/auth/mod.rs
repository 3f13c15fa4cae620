//! Authentication: password hashing, token issuance, login callbacks and the
//! bearer-token extractor

pub mod extractor;
pub mod handlers;
pub mod password;
pub mod providers;
pub mod tokens;

pub use extractor::AuthUser;
pub use password::{hash_password, verify_password};
pub use providers::{NoProviderConnector, ProviderConnector};
pub use tokens::{TokenIssuer, TokenPair};
