//! AWS Signature Version 4
//!
//! Signs a request with an access key pair (and optional session token) for
//! one service in one region. The signing instant is passed in by the caller
//! so signatures are reproducible.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

use crate::credentials::Credentials;

type HmacSha256 = Hmac<Sha256>;

pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Request signer for a single service/region pair
#[derive(Debug, Clone)]
pub struct Signer {
    service: String,
    region: String,
    sign_content_sha256: bool,
}

impl Signer {
    pub fn new(service: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
            sign_content_sha256: false,
        }
    }

    /// Also send and sign `x-amz-content-sha256` (required by OpenSearch Service)
    pub fn sign_content_sha256(mut self) -> Self {
        self.sign_content_sha256 = true;
        self
    }

    /// Compute the headers to add to a request.
    ///
    /// `headers` are the caller's own headers; `content-type` and any
    /// `x-amz-*` among them are covered by the signature. The returned list
    /// holds `x-amz-date`, the optional token and payload hash headers, and
    /// `authorization`.
    pub fn sign(
        &self,
        credentials: &Credentials,
        method: &str,
        url: &Url,
        headers: &[(String, String)],
        body: &[u8],
        now: DateTime<Utc>,
    ) -> Vec<(&'static str, String)> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let payload_hash = hex::encode(Sha256::digest(body));

        let mut added: Vec<(&'static str, String)> = vec![("x-amz-date", amz_date.clone())];
        if let Some(token) = &credentials.session_token {
            added.push(("x-amz-security-token", token.clone()));
        }
        if self.sign_content_sha256 {
            added.push(("x-amz-content-sha256", payload_hash.clone()));
        }

        let mut signed: Vec<(String, String)> = headers
            .iter()
            .filter(|(name, _)| is_signed_header(name))
            .map(|(name, value)| (name.to_ascii_lowercase(), normalize_value(value)))
            .collect();
        signed.push(("host".to_string(), host_header(url)));
        signed.extend(added.iter().map(|(name, value)| (name.to_string(), value.clone())));
        signed.sort_by(|a, b| a.0.cmp(&b.0));

        let signed_headers = signed
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let canonical = canonical_request(method, url, &signed, &signed_headers, &payload_hash);
        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hex::encode(Sha256::digest(canonical.as_bytes()))
        );

        let key = signing_key(
            &credentials.secret_access_key,
            &date,
            &self.region,
            &self.service,
        );
        let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()));

        added.push((
            "authorization",
            format!(
                "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                ALGORITHM, credentials.access_key_id, scope, signed_headers, signature
            ),
        ));
        added
    }
}

fn canonical_request(
    method: &str,
    url: &Url,
    signed: &[(String, String)],
    signed_headers: &str,
    payload_hash: &str,
) -> String {
    let canonical_headers: String = signed
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();

    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method,
        canonical_uri(url),
        canonical_query(url),
        canonical_headers,
        signed_headers,
        payload_hash
    )
}

/// Derive the per-day signing key
pub fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn is_signed_header(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == "content-type" || name.starts_with("x-amz-")
}

fn normalize_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

// The path from `Url` is already percent-encoded once; non-S3 services
// expect each segment encoded a second time.
fn canonical_uri(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() {
        return "/".to_string();
    }
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn canonical_query(url: &Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            (
                urlencoding::encode(&k).into_owned(),
                urlencoding::encode(&v).into_owned(),
            )
        })
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}
