//! S3-compatible blob store client.
//!
//! Talks to the object storage backend over its REST API with AWS Signature
//! V4 request signing and path-style addressing, so it works against any
//! S3-compatible endpoint (the deployment uses Yandex Object Storage).

use super::{BlobStore, PutOptions, Result, StorageError};
use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use sha2::{Digest, Sha256};
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

static KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<Key>([^<]*)</Key>").expect("static pattern"));
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<NextContinuationToken>([^<]*)</NextContinuationToken>").expect("static pattern")
});

#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    endpoint: String,
    host: String,
    bucket: String,
    region: String,
    access_key: String,
    secret_key: String,
}

impl S3BlobStore {
    pub fn new(
        endpoint: &str,
        bucket: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
    ) -> anyhow::Result<Self> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let url = reqwest::Url::parse(&endpoint)?;
        let host = url
            .host_str()
            .ok_or_else(|| anyhow::anyhow!("storage endpoint has no host: {endpoint}"))?
            .to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            host,
            bucket: bucket.to_string(),
            region: region.to_string(),
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        })
    }

    fn encoded_key(key: &str) -> String {
        key.split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, Self::encoded_key(key))
    }

    /// Canonical request / string-to-sign / signature per AWS SigV4.
    /// Returns the value of the `Authorization` header.
    fn sign(
        &self,
        method: &str,
        canonical_uri: &str,
        canonical_query: &str,
        amz_date: &str,
        payload_hash: &str,
        extra_headers: &[(&str, &str)],
    ) -> String {
        let date = &amz_date[..8];

        let mut headers: Vec<(String, String)> = vec![
            ("host".to_string(), self.host.clone()),
            ("x-amz-content-sha256".to_string(), payload_hash.to_string()),
            ("x-amz-date".to_string(), amz_date.to_string()),
        ];
        for (name, value) in extra_headers {
            headers.push((name.to_lowercase(), value.trim().to_string()));
        }
        headers.sort_by(|a, b| a.0.cmp(&b.0));

        let canonical_headers: String = headers
            .iter()
            .map(|(name, value)| format!("{name}:{value}\n"))
            .collect();
        let signed_headers = headers
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(";");

        let canonical_request = format!(
            "{method}\n{canonical_uri}\n{canonical_query}\n{canonical_headers}\n{signed_headers}\n{payload_hash}"
        );

        let scope = format!("{date}/{}/s3/aws4_request", self.region);
        let string_to_sign = format!(
            "AWS4-HMAC-SHA256\n{amz_date}\n{scope}\n{}",
            hex::encode(Sha256::digest(canonical_request.as_bytes()))
        );

        let date_key = hmac_sha256(format!("AWS4{}", self.secret_key).as_bytes(), date.as_bytes());
        let region_key = hmac_sha256(&date_key, self.region.as_bytes());
        let service_key = hmac_sha256(&region_key, b"s3");
        let signing_key = hmac_sha256(&service_key, b"aws4_request");
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));

        format!(
            "AWS4-HMAC-SHA256 Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            self.access_key
        )
    }

    async fn list_page(&self, prefix: &str, token: Option<&str>) -> Result<(Vec<String>, Option<String>)> {
        let canonical_uri = format!("/{}/", self.bucket);
        let mut query_parts: Vec<(String, String)> = Vec::new();
        if let Some(token) = token {
            query_parts.push((
                "continuation-token".to_string(),
                urlencoding::encode(token).into_owned(),
            ));
        }
        query_parts.push(("list-type".to_string(), "2".to_string()));
        query_parts.push(("prefix".to_string(), urlencoding::encode(prefix).into_owned()));
        // Canonical query is sorted by parameter name.
        query_parts.sort();
        let canonical_query = query_parts
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = hex::encode(Sha256::digest(b""));
        let authorization = self.sign("GET", &canonical_uri, &canonical_query, &amz_date, &payload_hash, &[]);

        let url = format!("{}/{}/?{canonical_query}", self.endpoint, self.bucket);
        let response = self
            .client
            .get(&url)
            .header("x-amz-date", &amz_date)
            .header("x-amz-content-sha256", &payload_hash)
            .header("Authorization", authorization)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        if !status.is_success() {
            return Err(StorageError::Backend(format!(
                "list {prefix} failed with {status}: {}",
                truncate(&body)
            )));
        }

        let keys = KEY_RE
            .captures_iter(&body)
            .map(|c| xml_unescape(&c[1]))
            .collect();
        let next = if body.contains("<IsTruncated>true</IsTruncated>") {
            TOKEN_RE.captures(&body).map(|c| xml_unescape(&c[1]))
        } else {
            None
        };
        Ok((keys, next))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let canonical_uri = format!("/{}/{}", self.bucket, Self::encoded_key(key));
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = hex::encode(Sha256::digest(b""));
        let authorization = self.sign("GET", &canonical_uri, "", &amz_date, &payload_hash, &[]);

        let response = self
            .client
            .get(self.object_url(key))
            .header("x-amz-date", &amz_date)
            .header("x-amz-content-sha256", &payload_hash)
            .header("Authorization", authorization)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound {
                key: key.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Backend(format!(
                "get {key} failed with {status}: {}",
                truncate(&body)
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn put(&self, key: &str, body: Vec<u8>, options: PutOptions) -> Result<()> {
        let canonical_uri = format!("/{}/{}", self.bucket, Self::encoded_key(key));
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = hex::encode(Sha256::digest(&body));

        let mut extra_headers: Vec<(&str, &str)> = Vec::new();
        if let Some(content_type) = options.content_type.as_deref() {
            extra_headers.push(("content-type", content_type));
        }
        if options.public {
            extra_headers.push(("x-amz-acl", "public-read"));
        }
        let authorization = self.sign("PUT", &canonical_uri, "", &amz_date, &payload_hash, &extra_headers);

        let mut request = self
            .client
            .put(self.object_url(key))
            .header("x-amz-date", &amz_date)
            .header("x-amz-content-sha256", &payload_hash)
            .header("Authorization", authorization);
        if let Some(content_type) = options.content_type.as_deref() {
            request = request.header("Content-Type", content_type);
        }
        if options.public {
            request = request.header("x-amz-acl", "public-read");
        }

        let response = request
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Backend(format!(
                "put {key} failed with {status}: {}",
                truncate(&body)
            )));
        }
        debug!("stored object at {key}");
        Ok(())
    }

    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let (mut page, next) = self.list_page(prefix, token.as_deref()).await?;
            keys.append(&mut page);
            match next {
                Some(next) => token = Some(next),
                None => break,
            }
        }
        Ok(keys)
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn xml_unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn truncate(body: &str) -> &str {
    let mut end = body.len().min(256);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> S3BlobStore {
        S3BlobStore::new(
            "https://storage.example.net",
            "gamegems",
            "ru-central1",
            "AKIDEXAMPLE",
            "secret",
        )
        .unwrap()
    }

    #[test]
    fn object_url_is_path_style() {
        let store = store();
        assert_eq!(
            store.public_url("NFT/7.json"),
            "https://storage.example.net/gamegems/NFT/7.json"
        );
    }

    #[test]
    fn key_encoding_preserves_slashes() {
        assert_eq!(
            S3BlobStore::encoded_key("nft_data/0xAb c_1.json"),
            "nft_data/0xAb%20c_1.json"
        );
    }

    #[test]
    fn signature_is_stable_for_fixed_inputs() {
        let store = store();
        let payload_hash = hex::encode(Sha256::digest(b""));
        let a = store.sign("GET", "/gamegems/x.json", "", "20260101T000000Z", &payload_hash, &[]);
        let b = store.sign("GET", "/gamegems/x.json", "", "20260101T000000Z", &payload_hash, &[]);
        assert_eq!(a, b);
        assert!(a.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20260101/ru-central1/s3/aws4_request"));
        assert!(a.contains("SignedHeaders=host;x-amz-content-sha256;x-amz-date"));
    }

    #[test]
    fn list_xml_keys_are_extracted() {
        let xml = "<ListBucketResult><Contents><Key>NFT/1.json</Key></Contents>\
                   <Contents><Key>NFT/2&amp;b.json</Key></Contents></ListBucketResult>";
        let keys: Vec<String> = KEY_RE.captures_iter(xml).map(|c| xml_unescape(&c[1])).collect();
        assert_eq!(keys, vec!["NFT/1.json".to_string(), "NFT/2&b.json".to_string()]);
    }
}
