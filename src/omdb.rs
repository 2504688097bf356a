use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

pub const API_KEY: &str = "333b4073";
pub const API_BASE_URL: &str = "https://www.omdbapi.com/";

/// Poster source substituted whenever the provider reports no poster.
pub const FALLBACK_POSTER: &str =
    "https://via.placeholder.com/300x450/1a1f3a/ffd700?text=No+Poster+Available";

/// Errors raised by the OMDb client.
#[derive(Debug, Error)]
pub enum OmdbError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The provider answered but flagged the lookup as failed.
    #[error("provider error: {0}")]
    Provider(String),
}

/// OMDb operations, behind a trait so tests can substitute a fake provider.
#[async_trait]
pub trait OmdbApi: Send + Sync {
    /// Search for titles matching `query`, in provider order. An empty vec
    /// means the provider explicitly reported no matches.
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, OmdbError>;

    /// Fetch the full record for one title, full-length plot variant.
    async fn detail(&self, imdb_id: &str) -> Result<MovieDetail, OmdbError>;
}

/// One row of a search response, decoded and scrubbed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResultItem {
    pub title: String,
    /// Free text; a series may carry a range like "2019–2021".
    pub year: String,
    /// Opaque lookup key for the detail endpoint.
    pub imdb_id: String,
    /// `None` when the provider sent its "N/A" sentinel.
    pub poster: Option<String>,
}

impl SearchResultItem {
    fn from_raw(raw: RawSearchItem) -> Self {
        Self {
            title: scrub(&raw.title),
            year: scrub(&raw.year),
            imdb_id: scrub(&raw.imdb_id),
            poster: not_available(raw.poster).map(|v| scrub(&v)),
        }
    }

    /// Poster source with the placeholder substituted for absent posters.
    pub fn poster_src(&self) -> &str {
        self.poster.as_deref().unwrap_or(FALLBACK_POSTER)
    }
}

/// Full record for one title. Eleven fields, every one rendered by the
/// detail overlay; `None` marks the provider's "N/A" sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieDetail {
    pub title: String,
    pub year: String,
    pub poster: Option<String>,
    pub genre: Option<String>,
    pub director: Option<String>,
    pub actors: Option<String>,
    pub plot: Option<String>,
    pub imdb_rating: Option<String>,
    pub runtime: Option<String>,
    pub rated: Option<String>,
    pub released: Option<String>,
}

impl MovieDetail {
    fn from_raw(raw: RawDetail) -> Self {
        Self {
            title: scrub(&raw.title),
            year: scrub(&raw.year),
            poster: not_available(raw.poster).map(|v| scrub(&v)),
            genre: not_available(raw.genre).map(|v| scrub(&v)),
            director: not_available(raw.director).map(|v| scrub(&v)),
            actors: not_available(raw.actors).map(|v| scrub(&v)),
            plot: not_available(raw.plot).map(|v| scrub_plot(&v)),
            imdb_rating: not_available(raw.imdb_rating).map(|v| scrub(&v)),
            runtime: not_available(raw.runtime).map(|v| scrub(&v)),
            rated: not_available(raw.rated).map(|v| scrub(&v)),
            released: not_available(raw.released).map(|v| scrub(&v)),
        }
    }

    /// Poster source with the placeholder substituted for absent posters.
    pub fn poster_src(&self) -> &str {
        self.poster.as_deref().unwrap_or(FALLBACK_POSTER)
    }
}

/// HTTP client for the OMDb API. Key and base URL are fixed at build time.
#[derive(Debug, Clone)]
pub struct OmdbClient {
    client: Client,
    api_key: String,
}

impl OmdbClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            api_key: API_KEY.to_string(),
        }
    }

    async fn get_body(&self, url: &str) -> Result<String, OmdbError> {
        let res = self.client.get(url).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(OmdbError::Status(status));
        }
        Ok(res.text().await?)
    }
}

impl Default for OmdbClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OmdbApi for OmdbClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, OmdbError> {
        let url = search_url(&self.api_key, query);
        let body = self.get_body(&url).await?;
        parse_search_body(&body)
    }

    async fn detail(&self, imdb_id: &str) -> Result<MovieDetail, OmdbError> {
        let url = detail_url(&self.api_key, imdb_id);
        let body = self.get_body(&url).await?;
        parse_detail_body(&body)
    }
}

fn search_url(api_key: &str, query: &str) -> String {
    format!(
        "{API_BASE_URL}?apikey={api_key}&s={}",
        urlencoding::encode(query)
    )
}

fn detail_url(api_key: &str, imdb_id: &str) -> String {
    format!(
        "{API_BASE_URL}?apikey={api_key}&i={}&plot=full",
        urlencoding::encode(imdb_id)
    )
}

/// A search response that is anything but `Response: "True"` is the
/// provider's "no matches" signal and decodes to an empty list.
fn parse_search_body(body: &str) -> Result<Vec<SearchResultItem>, OmdbError> {
    let envelope: SearchEnvelope = serde_json::from_str(body)?;
    if envelope.response != "True" {
        return Ok(Vec::new());
    }
    Ok(envelope
        .search
        .into_iter()
        .map(SearchResultItem::from_raw)
        .collect())
}

fn parse_detail_body(body: &str) -> Result<MovieDetail, OmdbError> {
    let raw: RawDetail = serde_json::from_str(body)?;
    if raw.response != "True" {
        return Err(OmdbError::Provider(
            raw.error.unwrap_or_else(|| "lookup failed".to_string()),
        ));
    }
    Ok(MovieDetail::from_raw(raw))
}

// ── Wire shapes (provider casing, case-sensitive) ──

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<RawSearchItem>,
}

#[derive(Debug, Deserialize)]
struct RawSearchItem {
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

#[derive(Debug, Deserialize)]
struct RawDetail {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
    #[serde(rename = "Genre", default)]
    genre: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "Rated", default)]
    rated: String,
    #[serde(rename = "Released", default)]
    released: String,
}

// ── Decode helpers ──

/// Map the provider's "N/A" sentinel (and a missing field) to `None`.
fn not_available(field: String) -> Option<String> {
    if field == "N/A" || field.is_empty() {
        None
    } else {
        Some(field)
    }
}

/// Replace control characters with spaces so upstream text cannot corrupt
/// the terminal. Single-line fields only; the plot keeps its newlines.
fn scrub(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

fn scrub_plot(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() && c != '\n' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TWO_RESULTS: &str = r#"{
        "Search": [
            {"Title": "Blade Runner", "Year": "1982", "imdbID": "tt0083658", "Type": "movie", "Poster": "https://m.media-amazon.com/images/M/br.jpg"},
            {"Title": "Blade Runner 2049", "Year": "2017", "imdbID": "tt1856101", "Type": "movie", "Poster": "N/A"}
        ],
        "totalResults": "2",
        "Response": "True"
    }"#;

    const NOT_FOUND: &str = r#"{"Response": "False", "Error": "Movie not found!"}"#;

    const DETAIL_OK: &str = r#"{
        "Title": "Blade Runner",
        "Year": "1982",
        "Rated": "R",
        "Released": "25 Jun 1982",
        "Runtime": "117 min",
        "Genre": "N/A",
        "Director": "Ridley Scott",
        "Writer": "Hampton Fancher, David Webb Peoples",
        "Actors": "Harrison Ford, Rutger Hauer, Sean Young",
        "Plot": "A blade runner must pursue and terminate four replicants.",
        "Poster": "N/A",
        "imdbRating": "8.1",
        "imdbID": "tt0083658",
        "Response": "True"
    }"#;

    #[test]
    fn test_search_body_decodes_in_provider_order() {
        let items = parse_search_body(TWO_RESULTS).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Blade Runner");
        assert_eq!(items[0].imdb_id, "tt0083658");
        assert_eq!(items[1].title, "Blade Runner 2049");
        assert_eq!(items[1].year, "2017");
    }

    #[test]
    fn test_search_body_with_false_response_is_empty() {
        let items = parse_search_body(NOT_FOUND).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_search_body_without_response_flag_is_empty() {
        let items = parse_search_body(r#"{"Search": []}"#).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_garbage_search_body_is_a_decode_error() {
        assert!(matches!(
            parse_search_body("not json"),
            Err(OmdbError::Decode(_))
        ));
    }

    #[test]
    fn test_sentinel_poster_renders_the_fallback_url() {
        let items = parse_search_body(TWO_RESULTS).unwrap();
        assert_eq!(items[0].poster_src(), "https://m.media-amazon.com/images/M/br.jpg");
        assert_eq!(items[1].poster, None);
        assert_eq!(items[1].poster_src(), FALLBACK_POSTER);
    }

    #[test]
    fn test_detail_body_maps_sentinels_to_none() {
        let detail = parse_detail_body(DETAIL_OK).unwrap();
        assert_eq!(detail.title, "Blade Runner");
        assert_eq!(detail.year, "1982");
        assert_eq!(detail.genre, None);
        assert_eq!(detail.director.as_deref(), Some("Ridley Scott"));
        assert_eq!(detail.runtime.as_deref(), Some("117 min"));
        assert_eq!(detail.rated.as_deref(), Some("R"));
        assert_eq!(detail.imdb_rating.as_deref(), Some("8.1"));
        assert_eq!(detail.poster_src(), FALLBACK_POSTER);
    }

    #[test]
    fn test_detail_body_false_response_is_provider_error() {
        let body = r#"{"Response": "False", "Error": "Incorrect IMDb ID."}"#;
        match parse_detail_body(body) {
            Err(OmdbError::Provider(reason)) => assert_eq!(reason, "Incorrect IMDb ID."),
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[test]
    fn test_detail_body_missing_response_is_provider_error() {
        assert!(matches!(
            parse_detail_body("{}"),
            Err(OmdbError::Provider(_))
        ));
    }

    #[test]
    fn test_search_url_percent_encodes_the_query() {
        let url = search_url("key", "spider man & co");
        assert_eq!(
            url,
            "https://www.omdbapi.com/?apikey=key&s=spider%20man%20%26%20co"
        );
    }

    #[test]
    fn test_detail_url_requests_the_full_plot() {
        let url = detail_url("key", "tt0083658");
        assert_eq!(url, "https://www.omdbapi.com/?apikey=key&i=tt0083658&plot=full");
    }

    #[test]
    fn test_scrub_replaces_control_characters() {
        assert_eq!(scrub("evil\x1b[2Jtitle\r\n"), "evil [2Jtitle  ");
        assert_eq!(scrub("plain title"), "plain title");
    }

    #[test]
    fn test_scrub_plot_keeps_newlines() {
        assert_eq!(scrub_plot("line one\nline\ttwo"), "line one\nline two");
    }

    proptest! {
        #[test]
        fn test_encoded_query_has_no_url_metacharacters(query in ".*") {
            let url = search_url("key", &query);
            let encoded = url.split_once("&s=").unwrap().1;
            prop_assert!(!encoded.contains(' '));
            prop_assert!(!encoded.contains('&'));
            prop_assert!(!encoded.contains('?'));
            prop_assert!(!encoded.contains('#'));
        }

        #[test]
        fn test_scrubbed_text_has_no_control_characters(text in ".*") {
            prop_assert!(scrub(&text).chars().all(|c| !c.is_control()));
        }

        #[test]
        fn test_poster_src_never_yields_the_sentinel(poster in ".*") {
            let item = SearchResultItem::from_raw(RawSearchItem {
                title: "t".to_string(),
                year: "2000".to_string(),
                imdb_id: "tt1".to_string(),
                poster,
            });
            prop_assert_ne!(item.poster_src(), "N/A");
            prop_assert!(!item.poster_src().is_empty());
        }
    }
}
