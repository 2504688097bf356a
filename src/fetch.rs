use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::omdb::{MovieDetail, OmdbApi, OmdbError, SearchResultItem};

/// Messages sent from fetch tasks back to the UI loop.
///
/// Every message carries the sequence number of the request that produced
/// it, so the receiver can discard completions that arrive after a newer
/// request has been issued.
#[derive(Debug)]
pub enum FetchMessage {
    /// A search request finished, successfully or not.
    SearchFinished {
        seq: u64,
        /// The query as submitted, echoed back for the no-matches banner.
        query: String,
        result: Result<Vec<SearchResultItem>, OmdbError>,
    },

    /// A detail request finished, successfully or not.
    DetailFinished {
        seq: u64,
        result: Result<MovieDetail, OmdbError>,
    },
}

/// Spawns one task per request and reports completions over a channel.
///
/// The UI loop never awaits a fetch directly; it polls the receiver each
/// frame, so the terminal stays responsive while requests are in flight.
pub struct Fetcher {
    api: Arc<dyn OmdbApi>,
    tx: UnboundedSender<FetchMessage>,
}

impl Fetcher {
    pub fn new(api: Arc<dyn OmdbApi>) -> (Self, UnboundedReceiver<FetchMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { api, tx }, rx)
    }

    pub fn spawn_search(&self, seq: u64, query: &str) {
        debug!(seq, query, "spawning search request");
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let query = query.to_string();
        tokio::spawn(async move {
            let result = api.search(&query).await;
            // Send fails only when the UI loop is already gone.
            let _ = tx.send(FetchMessage::SearchFinished { seq, query, result });
        });
    }

    pub fn spawn_detail(&self, seq: u64, imdb_id: &str) {
        debug!(seq, imdb_id, "spawning detail request");
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        let imdb_id = imdb_id.to_string();
        tokio::spawn(async move {
            let result = api.detail(&imdb_id).await;
            let _ = tx.send(FetchMessage::DetailFinished { seq, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct CannedApi;

    #[async_trait]
    impl OmdbApi for CannedApi {
        async fn search(&self, query: &str) -> Result<Vec<SearchResultItem>, OmdbError> {
            if query == "nothing" {
                return Ok(Vec::new());
            }
            Ok(vec![SearchResultItem {
                title: format!("{query} result"),
                year: "2001".to_string(),
                imdb_id: "tt0000001".to_string(),
                poster: None,
            }])
        }

        async fn detail(&self, imdb_id: &str) -> Result<MovieDetail, OmdbError> {
            if imdb_id == "tt-broken" {
                return Err(OmdbError::Provider("Incorrect IMDb ID.".to_string()));
            }
            Ok(MovieDetail {
                title: "Canned".to_string(),
                year: "2001".to_string(),
                poster: None,
                genre: None,
                director: None,
                actors: None,
                plot: None,
                imdb_rating: None,
                runtime: None,
                rated: None,
                released: None,
            })
        }
    }

    #[tokio::test]
    async fn test_search_completion_carries_seq_and_query() {
        let (fetcher, mut rx) = Fetcher::new(Arc::new(CannedApi));
        fetcher.spawn_search(7, "heat");

        match rx.recv().await {
            Some(FetchMessage::SearchFinished { seq, query, result }) => {
                assert_eq!(seq, 7);
                assert_eq!(query, "heat");
                assert_eq!(result.unwrap()[0].title, "heat result");
            }
            other => panic!("expected SearchFinished, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_search_completion_is_delivered() {
        let (fetcher, mut rx) = Fetcher::new(Arc::new(CannedApi));
        fetcher.spawn_search(1, "nothing");

        match rx.recv().await {
            Some(FetchMessage::SearchFinished { result, .. }) => {
                assert!(result.unwrap().is_empty());
            }
            other => panic!("expected SearchFinished, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_detail_completion_carries_seq_and_error() {
        let (fetcher, mut rx) = Fetcher::new(Arc::new(CannedApi));
        fetcher.spawn_detail(3, "tt-broken");

        match rx.recv().await {
            Some(FetchMessage::DetailFinished { seq, result }) => {
                assert_eq!(seq, 3);
                assert!(matches!(result, Err(OmdbError::Provider(_))));
            }
            other => panic!("expected DetailFinished, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_each_complete() {
        let (fetcher, mut rx) = Fetcher::new(Arc::new(CannedApi));
        fetcher.spawn_search(1, "alpha");
        fetcher.spawn_search(2, "beta");

        let mut seen = Vec::new();
        for _ in 0..2 {
            match rx.recv().await {
                Some(FetchMessage::SearchFinished { seq, .. }) => seen.push(seq),
                other => panic!("expected SearchFinished, got {other:?}"),
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2]);
    }
}
