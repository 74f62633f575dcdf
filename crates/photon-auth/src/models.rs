//! OIDC wire records and JWT claim inspection.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// Tokens issued by the OIDC token endpoint.
#[derive(Debug)]
pub struct OidcTokens {
    /// Bearer token for API calls
    pub access_token: SecretString,
    /// Lifetime of the access token in seconds
    pub expires_in: u64,
    /// Token for the refresh grant; refresh responses usually omit it
    pub refresh_token: Option<SecretString>,
    /// Identity token
    pub id_token: SecretString,
    /// Token type, normally `Bearer`
    pub token_type: String,
}

#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: String,
    #[serde(default)]
    token_type: String,
}

impl From<TokenResponse> for OidcTokens {
    fn from(wire: TokenResponse) -> Self {
        Self {
            access_token: SecretString::from(wire.access_token),
            expires_in: wire.expires_in,
            refresh_token: wire
                .refresh_token
                .filter(|token| !token.is_empty())
                .map(SecretString::from),
            id_token: SecretString::from(wire.id_token),
            token_type: wire.token_type,
        }
    }
}

/// Error body of the OIDC endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OidcErrorBody {
    /// Error code, e.g. `invalid_grant`
    pub error: String,
    /// Human readable description
    #[serde(default)]
    pub error_description: String,
}

/// One entry of the root certificate download.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct EncodedCert {
    pub(crate) encoded: String,
}

/// Claims found in a JWT access or identity token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct JwtToken {
    /// Token identifier
    #[serde(rename = "jti")]
    pub token_id: String,
    /// Signing algorithm (from the header)
    #[serde(rename = "alg")]
    pub algorithm: String,
    /// Subject
    #[serde(rename = "sub")]
    pub subject: String,
    /// Audiences
    #[serde(rename = "aud", deserialize_with = "one_or_many")]
    pub audience: Vec<String>,
    /// Group memberships
    pub groups: Vec<String>,
    /// Issuer
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Issue time, epoch seconds
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Expiry time, epoch seconds
    #[serde(rename = "exp")]
    pub expires: i64,
    /// Granted scope
    pub scope: String,
    /// Token type
    pub token_type: String,
    /// Token class
    pub token_class: String,
    /// Tenant
    pub tenant: String,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values,
    })
}

fn decode_segment(segment: &str) -> Option<serde_json::Map<String, serde_json::Value>> {
    let bytes = URL_SAFE_NO_PAD.decode(segment).ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        serde_json::Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Decode the claims of a JWT without verifying its signature.
///
/// Header and payload are merged; segments that are not base64url JSON objects
/// (such as the signature) are skipped. Claims with unexpected types leave the
/// result at its defaults.
#[must_use]
pub fn parse_token_details(token: &str) -> JwtToken {
    let mut claims = serde_json::Map::new();
    for segment in token.split('.') {
        if let Some(map) = decode_segment(segment) {
            claims.extend(map);
        }
    }
    serde_json::from_value(serde_json::Value::Object(claims)).unwrap_or_default()
}

/// Pretty-print the first decodable JSON segment of a JWT.
///
/// Returns the token unchanged if no segment decodes.
#[must_use]
pub fn parse_raw_token_details(token: &str) -> String {
    token
        .split('.')
        .filter_map(|segment| URL_SAFE_NO_PAD.decode(segment).ok())
        .filter_map(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok())
        .find_map(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| token.to_string())
}
