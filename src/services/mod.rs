pub mod auth;
pub mod tokens;

pub use auth::{AuthError, AuthService};
pub use tokens::{Claims, TokenError, TokenPair, TokenService};
