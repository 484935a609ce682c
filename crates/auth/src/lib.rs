//! `tenantdesk-auth` — authentication/authorization boundary.
//!
//! Tokens are minted by a tenant-scoped Cognito app client; this crate only
//! validates them and derives the request principal. It is intentionally
//! decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod token;

pub use authorize::{AuthzError, Principal, authorize};
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use permissions::Permission;
pub use principal::{PrincipalId, TenantMembership};
pub use roles::Role;
pub use token::{Hs256JwtValidator, JwtValidator, TokenError};
