//! Token domain entities: rotating refresh tokens and the revocation ledger.

pub mod refresh;
pub mod revoked;

pub use refresh::{CreateRefreshToken, RefreshToken};
pub use revoked::{RevokedToken, TokenKind};
