//! HTTP transport: address selection, retries and response capture.

use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use bytes::Bytes;
use osapi_core::Endpoint;
use reqwest::{
    Method, StatusCode,
    header::{CONTENT_TYPE, HeaderMap},
};
use secrecy::{ExposeSecret, SecretString};
use url::Url;
use validator::Validate;

use crate::{Config, Error, Result};

/// One HTTP exchange as it came off the wire.
#[derive(Debug, Clone)]
pub struct RawResponse {
    method: Method,
    url: Url,
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl RawResponse {
    pub fn new(
        method: Method,
        url: Url,
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        Self {
            method,
            url,
            status,
            headers,
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

pub struct Transport {
    http: reqwest::Client,
    addresses: Vec<Url>,
    next: AtomicUsize,
    auth: Option<(String, SecretString)>,
    max_retries: u32,
    retry_on_status: Vec<u16>,
    disable_retry: bool,
}

impl Transport {
    pub fn new(config: &Config) -> Result<Self> {
        config
            .validate()
            .map_err(Error::InvalidConfig)?;

        if let Some(address) = config
            .addresses
            .iter()
            .find(|it| it.cannot_be_a_base())
        {
            return Err(Error::Url(address.clone()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()?;

        let auth = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                Some((
                    username.clone(),
                    SecretString::from(password.expose_secret()),
                ))
            },
            (Some(username), None) => Some((username.clone(), SecretString::from(""))),
            _ => None,
        };

        Ok(Self {
            http,
            addresses: config.addresses.clone(),
            next: AtomicUsize::new(0),
            auth,
            max_retries: config.max_retries,
            retry_on_status: config.retry_on_status.clone(),
            disable_retry: config.disable_retry,
        })
    }

    pub fn addresses(&self) -> &[Url] {
        &self.addresses
    }

    /// Round-robin over the configured addresses.
    fn next_address(&self) -> &Url {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.addresses.len();
        &self.addresses[index]
    }

    /// Appends `path` to `base` (keeping any prefix `base` already has) and
    /// sets the query. Segments are percent-encoded here.
    pub fn url(
        base: &Url,
        path: &[String],
        query: &[(&'static str, String)],
    ) -> Result<Url> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);

        url.path_segments_mut()
            .map_err(|_| Error::Url(base.clone()))?
            .pop_if_empty()
            .extend(path);

        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        Ok(url)
    }

    /// Sends `endpoint` and captures whatever response comes back.
    ///
    /// Connection failures and statuses listed in `retry_on_status` are
    /// retried against the next address. A non-2xx response is still `Ok`
    /// here; turning it into an error is left to the caller.
    #[tracing::instrument(skip(self, endpoint), fields(endpoint = E::NAME))]
    pub async fn perform<E: Endpoint>(
        &self,
        endpoint: &E,
    ) -> Result<RawResponse> {
        endpoint.validate()?;

        let method = match endpoint.method() {
            osapi_core::Method::Get => Method::GET,
            osapi_core::Method::Put => Method::PUT,
            osapi_core::Method::Head => Method::HEAD,
            osapi_core::Method::Delete => Method::DELETE,
        };
        let path = endpoint.path();
        let query = endpoint.query();
        let body = endpoint
            .body()
            .map_err(Error::Encode)?
            .map(Bytes::from);

        let attempts = if self.disable_retry {
            1
        } else {
            self.max_retries + 1
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let url = Self::url(self.next_address(), &path, &query)?;
            tracing::debug!(%method, %url, attempt, "sending request");

            let mut request = self
                .http
                .request(method.clone(), url.clone());
            if let Some(body) = &body {
                request = request
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.clone());
            }
            if let Some((username, password)) = &self.auth {
                request = request.basic_auth(username, Some(password.expose_secret()));
            }

            let retries_left = attempt < attempts;
            match request.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if retries_left && self.retry_on_status.contains(&status.as_u16()) {
                        tracing::warn!(%url, %status, attempt, "retrying request");
                        continue;
                    }

                    let headers = resp.headers().clone();
                    let body = resp.bytes().await?;
                    tracing::debug!(%url, %status, bytes = body.len(), "received response");

                    return Ok(RawResponse::new(method, url, status, headers, body));
                },
                Err(err) if retries_left && (err.is_connect() || err.is_timeout()) => {
                    tracing::warn!(%url, attempt, "retrying request: {}", err);
                },
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test_case::test_case("http://localhost:9200", "http://localhost:9200/logs/_alias/recent"; "bare host")]
    #[test_case::test_case("http://localhost:9200/", "http://localhost:9200/logs/_alias/recent"; "trailing slash")]
    #[test_case::test_case("https://proxy.local/search/", "https://proxy.local/search/logs/_alias/recent"; "path prefix")]
    #[test_case::test_case("http://localhost:9200/?a=b#frag", "http://localhost:9200/logs/_alias/recent"; "query and fragment dropped")]
    fn joins_path_onto_base(
        base: &str,
        expected: &str,
    ) {
        let path = vec!["logs".to_string(), "_alias".into(), "recent".into()];
        assert_eq!(
            Transport::url(&url(base), &path, &[])
                .unwrap()
                .as_str(),
            expected
        );
    }

    #[test]
    fn empty_path_is_root() {
        let joined = Transport::url(&url("http://localhost:9200"), &[], &[]).unwrap();
        assert_eq!(joined.as_str(), "http://localhost:9200/");
    }

    #[test]
    fn segments_are_encoded_and_commas_kept() {
        let path = vec!["logs 1,logs/2".to_string(), "_alias".into()];
        let query = vec![("filter_path", "a,b".to_string())];
        let joined = Transport::url(&url("http://localhost:9200"), &path, &query).unwrap();
        assert_eq!(
            joined.as_str(),
            "http://localhost:9200/logs%201,logs%2F2/_alias?filter_path=a%2Cb"
        );
    }

    #[test]
    fn rejects_empty_addresses() {
        let config = Config::new(vec![]);
        assert!(matches!(
            Transport::new(&config),
            Err(Error::InvalidConfig(..))
        ));
    }

    #[test]
    fn rejects_non_base_addresses() {
        let config = Config::new(vec![url("mailto:ops@example.com")]);
        assert!(matches!(Transport::new(&config), Err(Error::Url(..))));
    }

    #[test]
    fn rotates_addresses() {
        let config = Config::new(vec![url("http://a:9200"), url("http://b:9200")]);
        let transport = Transport::new(&config).unwrap();
        let picked: Vec<_> = (0..4)
            .map(|_| {
                transport
                    .next_address()
                    .host_str()
                    .unwrap()
                    .to_string()
            })
            .collect();
        assert_eq!(picked, vec!["a", "b", "a", "b"]);
    }
}
