//! # farmhub-auth
//!
//! Authentication core for Farmhub. Contains the stateless JWT codec,
//! Argon2id password hashing and policy, the CSRF double-submit issuer,
//! the per-(email, IP) login attempt limiter, the rotating refresh token
//! store, the token revocation ledger, the security audit recorder, and
//! the [`session::SessionManager`] that orchestrates them.

pub mod csrf;
pub mod jwt;
pub mod lockout;
pub mod password;
pub mod session;

pub use csrf::CsrfIssuer;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use lockout::LoginAttemptLimiter;
pub use password::{PasswordHasher, PasswordValidator};
pub use session::{ClientInfo, RefreshTokenStore, RevocationLedger, SecurityAudit, SessionManager};
