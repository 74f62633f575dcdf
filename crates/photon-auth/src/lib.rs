//! OIDC authentication for Photon clients.
//!
//! [`OidcClient`] talks to the Lightwave identity service: it downloads the
//! service's root certificates and runs the password and refresh-token grants.
//! [`OidcCredentialProvider`] plugs those grants into a Photon client so every
//! request carries a current bearer token.

#![deny(missing_docs)]

pub mod client;
pub mod models;
pub mod provider;

pub use client::{
    translate_oidc_error, OidcClient, OidcClientOptions, RootCertificate, DEFAULT_TOKEN_SCOPE,
};
pub use models::{parse_raw_token_details, parse_token_details, JwtToken, OidcErrorBody, OidcTokens};
pub use provider::{OidcCredentialProvider, DEFAULT_REFRESH_MARGIN};

/// Convenient result alias that reuses the shared Photon error type.
pub type Result<T> = photon_core::Result<T>;
