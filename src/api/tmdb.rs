use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::api::{MovieApi, MovieDetails};
use crate::app::Result;
use crate::domain::{Movie, MovieId};

/// List endpoints wrap their payload in a results page.
#[derive(Debug, Deserialize)]
struct ResultsPage {
    #[serde(default)]
    results: Vec<Movie>,
}

pub struct TmdbClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // A trailing slash so Url::join keeps the /3 path segment.
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        Ok(Self {
            client,
            base_url: Url::parse(&base)?,
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", &self.api_key);
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl MovieApi for TmdbClient {
    async fn trending(&self) -> Result<Vec<Movie>> {
        let url = self.endpoint("trending/movie/week", &[])?;
        let page: ResultsPage = self.get_json(url).await?;
        Ok(page.results)
    }

    async fn popular(&self) -> Result<Vec<Movie>> {
        let url = self.endpoint("movie/popular", &[])?;
        let page: ResultsPage = self.get_json(url).await?;
        Ok(page.results)
    }

    async fn search(&self, query: &str) -> Result<Vec<Movie>> {
        let url = self.endpoint("search/movie", &[("query", query)])?;
        let page: ResultsPage = self.get_json(url).await?;
        Ok(page.results)
    }

    async fn details(&self, id: MovieId) -> Result<MovieDetails> {
        let url = self.endpoint(
            &format!("movie/{}", id),
            &[("append_to_response", "videos")],
        )?;
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> TmdbClient {
        TmdbClient::new(
            "test-key",
            "https://api.themoviedb.org/3",
            Duration::from_secs(10),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = client().endpoint("trending/movie/week", &[]).unwrap();
        assert_eq!(url.path(), "/3/trending/movie/week");
        assert!(url.query().unwrap().contains("api_key=test-key"));
    }

    #[test]
    fn test_endpoint_encodes_query() {
        let url = client()
            .endpoint("search/movie", &[("query", "blade runner")])
            .unwrap();
        assert!(url.query().unwrap().contains("query=blade+runner"));
    }

    #[test]
    fn test_results_page_decodes() {
        let json = r#"{"page": 1, "results": [{"id": 603, "title": "The Matrix"}], "total_pages": 1}"#;
        let page: ResultsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].id, 603);
    }

    #[test]
    fn test_results_page_tolerates_missing_results() {
        let page: ResultsPage = serde_json::from_str("{}").unwrap();
        assert!(page.results.is_empty());
    }
}
