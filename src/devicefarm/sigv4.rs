//! AWS Signature Version 4 for JSON 1.1 POST requests.
//!
//! Only what Device Farm calls need: a `POST /` with an empty query string
//! and a small fixed header set.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::api::ApiError;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Static AWS credentials.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Credentials {
    /// Read `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and `AWS_SESSION_TOKEN`.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let access_key_id = non_empty("AWS_ACCESS_KEY_ID")
            .ok_or_else(|| ApiError::Credentials("AWS_ACCESS_KEY_ID is not set".to_string()))?;
        let secret_access_key = non_empty("AWS_SECRET_ACCESS_KEY").ok_or_else(|| {
            ApiError::Credentials("AWS_SECRET_ACCESS_KEY is not set".to_string())
        })?;

        Ok(Self {
            access_key_id,
            secret_access_key,
            session_token: non_empty("AWS_SESSION_TOKEN"),
        })
    }
}

/// Headers to attach to a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub amz_date: String,
    pub authorization: String,
    pub security_token: Option<String>,
}

/// What gets signed.
#[derive(Debug, Clone, Copy)]
pub struct RequestToSign<'a> {
    pub host: &'a str,
    pub content_type: &'a str,
    pub target: &'a str,
    pub body: &'a [u8],
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Derive the signing key for a date (YYYYMMDD), region and service.
pub fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// Canonical request and signed-header list, in signing order.
fn canonical_request(
    request: &RequestToSign<'_>,
    amz_date: &str,
    security_token: Option<&str>,
) -> (String, String) {
    let mut headers = vec![
        ("content-type", request.content_type.trim()),
        ("host", request.host.trim()),
        ("x-amz-date", amz_date),
    ];
    if let Some(token) = security_token {
        headers.push(("x-amz-security-token", token.trim()));
    }
    headers.push(("x-amz-target", request.target.trim()));

    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(";");
    let payload_hash = hex::encode(Sha256::digest(request.body));

    let canonical = format!(
        "POST\n/\n\n{}\n{}\n{}",
        canonical_headers, signed_headers, payload_hash
    );
    (canonical, signed_headers)
}

/// Sign a request at `now`.
pub fn sign(
    request: &RequestToSign<'_>,
    credentials: &Credentials,
    region: &str,
    service: &str,
    now: DateTime<Utc>,
) -> SignedHeaders {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();
    let scope = format!("{}/{}/{}/aws4_request", date, region, service);
    let token = credentials.session_token.as_deref();

    let (canonical, signed_headers) = canonical_request(request, &amz_date, token);
    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        hex::encode(Sha256::digest(canonical.as_bytes()))
    );

    let key = signing_key(&credentials.secret_access_key, &date, region, service);
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

    SignedHeaders {
        authorization: format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
        ),
        amz_date,
        security_token: credentials.session_token.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn credentials(token: Option<&str>) -> Credentials {
        Credentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY".to_string(),
            session_token: token.map(str::to_string),
        }
    }

    fn request(body: &[u8]) -> RequestToSign<'_> {
        RequestToSign {
            host: "devicefarm.us-west-2.amazonaws.com",
            content_type: "application/x-amz-json-1.1",
            target: "DeviceFarm_20150623.ListProjects",
            body,
        }
    }

    #[test]
    fn test_signing_key_reference_vector() {
        // Published AWS example for deriving a signing key.
        let key = signing_key(
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            "20120215",
            "us-east-1",
            "iam",
        );
        assert_eq!(
            hex::encode(key),
            "f4780e2d9f65fa895f9c67b32ce1baf0b0d8a43505a000a1a9e090d414db404d"
        );
    }

    #[test]
    fn test_canonical_request_layout() {
        let (canonical, signed) = canonical_request(&request(b"{}"), "20240101T000000Z", None);
        assert_eq!(signed, "content-type;host;x-amz-date;x-amz-target");

        let lines: Vec<&str> = canonical.lines().collect();
        assert_eq!(lines[0], "POST");
        assert_eq!(lines[1], "/");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "content-type:application/x-amz-json-1.1");
        assert_eq!(lines[4], "host:devicefarm.us-west-2.amazonaws.com");
        assert_eq!(lines[5], "x-amz-date:20240101T000000Z");
        assert_eq!(lines[6], "x-amz-target:DeviceFarm_20150623.ListProjects");
        assert_eq!(lines[8], "content-type;host;x-amz-date;x-amz-target");
        assert_eq!(lines[9], hex::encode(Sha256::digest(b"{}")));
    }

    #[test]
    fn test_session_token_is_signed() {
        let (_, signed) =
            canonical_request(&request(b"{}"), "20240101T000000Z", Some("session"));
        assert_eq!(
            signed,
            "content-type;host;x-amz-date;x-amz-security-token;x-amz-target"
        );
    }

    #[test]
    fn test_authorization_header_shape() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap();
        let signed = sign(&request(b"{}"), &credentials(None), "us-west-2", "devicefarm", now);

        assert_eq!(signed.amz_date, "20240305T123000Z");
        assert!(signed.authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20240305/us-west-2/devicefarm/aws4_request, \
             SignedHeaders=content-type;host;x-amz-date;x-amz-target, Signature="
        ));
        let signature = signed.authorization.rsplit('=').next().unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signed.security_token.is_none());
    }

    #[test]
    fn test_signature_depends_on_body() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap();
        let a = sign(&request(b"{}"), &credentials(None), "us-west-2", "devicefarm", now);
        let b = sign(&request(b"{\"nextToken\":\"x\"}"), &credentials(None), "us-west-2", "devicefarm", now);
        assert_ne!(a.authorization, b.authorization);
    }

    #[test]
    fn test_credentials_from_lookup() {
        let creds = Credentials::from_lookup(|key| match key {
            "AWS_ACCESS_KEY_ID" => Some("AKID".to_string()),
            "AWS_SECRET_ACCESS_KEY" => Some("s3cr3t-value".to_string()),
            "AWS_SESSION_TOKEN" => Some(String::new()),
            _ => None,
        })
        .unwrap();
        assert_eq!(creds.access_key_id, "AKID");
        assert!(creds.session_token.is_none());
        assert!(!format!("{:?}", creds).contains("s3cr3t-value"));
    }

    #[test]
    fn test_missing_secret_reported() {
        let err = Credentials::from_lookup(|key| {
            (key == "AWS_ACCESS_KEY_ID").then(|| "AKID".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("AWS_SECRET_ACCESS_KEY"));
    }
}
