//! [`JwkSource`] fetching the JWK set over HTTP.
use async_trait::async_trait;
use eyre::Context as _;
use zkauth_types::jwk::JwkSet;

use super::JwkSource;

/// Fetches the JWK set with a `GET` on a fixed URL.
#[derive(Clone, Debug)]
pub struct HttpJwkSource {
    client: reqwest::Client,
    url: String,
}

impl HttpJwkSource {
    /// Creates a source for `url`.
    pub fn new(url: impl Into<String>) -> eyre::Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("while building http client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl JwkSource for HttpJwkSource {
    async fn fetch_jwk_set(&self) -> eyre::Result<JwkSet> {
        tracing::trace!("GET {}", self.url);
        self.client
            .get(&self.url)
            .send()
            .await
            .context("while requesting JWK set")?
            .error_for_status()
            .context("provider answered with error status")?
            .json::<JwkSet>()
            .await
            .context("while parsing JWK set")
    }
}

#[cfg(test)]
mod tests {
    use zkauth_test::{MockJwkProvider, fixtures};

    use super::*;

    #[tokio::test]
    async fn fetches_from_provider() {
        let provider = MockJwkProvider::start(fixtures::google_jwk_set())
            .await
            .unwrap();
        let source = HttpJwkSource::new(provider.url()).unwrap();
        let set = source.fetch_jwk_set().await.unwrap();
        assert_eq!(set, fixtures::google_jwk_set());
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn error_status_fails() {
        let provider = MockJwkProvider::start(fixtures::google_jwk_set())
            .await
            .unwrap();
        provider.set_failing(true);
        let source = HttpJwkSource::new(provider.url()).unwrap();
        assert!(source.fetch_jwk_set().await.is_err());
    }
}
