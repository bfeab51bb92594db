//! Authentication
//!
//! The backend accepts a bearer token. Where that token comes from (the
//! university SAML login) is outside this crate; a [`TokenProvider`] hands
//! the client a token and is asked for a fresh one when the server answers
//! 401.

mod refresh;
mod session;
mod token;

pub use refresh::RefreshEndpointFlow;
pub use session::AuthFlow;
pub use session::SessionTokenProvider;
pub use token::AccessToken;
pub use token::StaticTokenProvider;
pub use token::TokenProvider;
