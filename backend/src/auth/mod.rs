//! Authentication module
//!
//! Stateless cookie sessions: argon2 password hashing, HS256 access/refresh
//! tokens, cookie transport and a request gate.

mod cookie;
mod jwt;
mod middleware;
mod password;
mod session;

pub use cookie::{
    get_cookie, CookieDescriptor, SameSite, TransportBinder, ACCESS_COOKIE_NAME,
    REFRESH_COOKIE_NAME,
};
pub use jwt::{Identity, IdentityClaims, TokenCodec, TokenPurpose, TokenRejection};
pub use middleware::{admin_middleware, AuthGate, AuthUser, MaybeAuthUser};
pub use password::PasswordService;
pub use session::{RefreshError, SessionIssuer, SessionPolicy};
