//! Content API client with per-request memoization
//!
//! Source text never changes, so every successful response is kept for the
//! lifetime of the process. Failures are not cached and never retried here;
//! the caller decides whether to ask again.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::FetchError;
use super::types::{Chapter, Verse};

pub const API_BASE: &str = "https://api.alquran.cloud/v1";

/// Where JSON documents come from
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<Value, FetchError>;
}

/// Fetches documents from the public content API over HTTPS
pub struct HttpSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("recite-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        crate::log_fetch_request!("get_json", url = %url);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct ChapterBody {
    ayahs: Vec<AyahBody>,
}

#[derive(Deserialize)]
struct AyahBody {
    #[serde(rename = "numberInSurah")]
    number_in_surah: u16,
    text: String,
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Result<T, FetchError> {
    serde_json::from_value::<Envelope<T>>(value)
        .map(|envelope| envelope.data)
        .map_err(|e| FetchError::Malformed(format!("{what}: {e}")))
}

/// Memoizing gateway over a [`ContentSource`]
#[derive(Clone)]
pub struct QuranClient {
    source: Arc<dyn ContentSource>,
    responses: Arc<RwLock<HashMap<String, Value>>>,
}

impl QuranClient {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source,
            responses: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn get_cached(&self, path: String) -> Result<Value, FetchError> {
        if let Some(value) = self.responses.read().await.get(&path) {
            tracing::trace!(path = %path, "Content cache hit");
            return Ok(value.clone());
        }

        let result = self.source.get_json(&path).await;
        crate::log_fetch_result!(path.as_str(), result);
        let value = result?;
        self.responses.write().await.insert(path, value.clone());
        Ok(value)
    }

    pub async fn fetch_chapter_list(&self) -> Result<Vec<Chapter>, FetchError> {
        let value = self.get_cached("/surah".to_string()).await?;
        let chapters: Vec<Chapter> = decode(value, "chapter list")?;
        tracing::debug!(count = chapters.len(), "Chapter list ready");
        Ok(chapters)
    }

    /// Original text merged with `translation_id`, matched on verse number
    pub async fn fetch_verses(&self, chapter: u16, translation_id: &str) -> Result<Vec<Verse>, FetchError> {
        let (text, translation) = futures::try_join!(
            self.get_cached(format!("/surah/{chapter}")),
            self.get_cached(format!("/surah/{chapter}/{translation_id}")),
        )?;
        let text: ChapterBody = decode(text, "chapter text")?;
        let translation: ChapterBody = decode(translation, "translation")?;

        let mut translated: HashMap<u16, String> = translation
            .ayahs
            .into_iter()
            .map(|a| (a.number_in_surah, a.text))
            .collect();

        let verses = text
            .ayahs
            .into_iter()
            .map(|a| Verse {
                chapter,
                number: a.number_in_surah,
                translation: translated.remove(&a.number_in_surah),
                text: a.text,
            })
            .collect::<Vec<_>>();

        if verses.is_empty() {
            return Err(FetchError::Malformed(format!("chapter {chapter} has no verses")));
        }
        tracing::debug!(chapter, translation_id, count = verses.len(), "Verses ready");
        Ok(verses)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source that counts requests per path
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub responses: Mutex<HashMap<String, Result<Value, FetchError>>>,
        pub calls: AtomicUsize,
        pub requested: Mutex<Vec<String>>,
    }

    impl FakeSource {
        pub fn with(entries: Vec<(&str, Result<Value, FetchError>)>) -> Arc<Self> {
            let source = Self::default();
            for (path, response) in entries {
                source.responses.lock().insert(path.to_string(), response);
            }
            Arc::new(source)
        }
    }

    #[async_trait]
    impl ContentSource for FakeSource {
        async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().push(path.to_string());
            self.responses
                .lock()
                .get(path)
                .cloned()
                .unwrap_or(Err(FetchError::Status(404)))
        }
    }

    pub(crate) fn chapter_list_json() -> Value {
        json!({
            "code": 200,
            "data": [
                {"number": 1, "name": "الفاتحة", "englishName": "Al-Faatiha",
                 "englishNameTranslation": "The Opening", "numberOfAyahs": 7, "revelationType": "Meccan"},
                {"number": 2, "name": "البقرة", "englishName": "Al-Baqara",
                 "englishNameTranslation": "The Cow", "numberOfAyahs": 286, "revelationType": "Medinan"}
            ]
        })
    }

    pub(crate) fn ayahs_json(texts: &[&str]) -> Value {
        let ayahs: Vec<Value> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| json!({"number": i + 1, "numberInSurah": i + 1, "text": t}))
            .collect();
        json!({"code": 200, "data": {"number": 1, "englishName": "Al-Faatiha", "ayahs": ayahs}})
    }

    #[tokio::test]
    async fn chapter_list_is_memoized() {
        let source = FakeSource::with(vec![("/surah", Ok(chapter_list_json()))]);
        let client = QuranClient::new(source.clone());

        let first = client.fetch_chapter_list().await.unwrap();
        let second = client.fetch_chapter_list().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[1].english_name, "Al-Baqara");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn verses_merge_translation_by_number() {
        let source = FakeSource::with(vec![
            ("/surah/1", Ok(ayahs_json(&["a1", "a2", "a3"]))),
            ("/surah/1/en.sahih", Ok(ayahs_json(&["t1", "t2"]))),
        ]);
        let client = QuranClient::new(source.clone());

        let verses = client.fetch_verses(1, "en.sahih").await.unwrap();
        assert_eq!(verses.len(), 3);
        assert_eq!(verses[0].text, "a1");
        assert_eq!(verses[1].translation.as_deref(), Some("t2"));
        assert_eq!(verses[2].translation, None);
        assert!(verses.iter().all(|v| v.chapter == 1));
    }

    #[tokio::test]
    async fn memo_is_per_argument_tuple() {
        let source = FakeSource::with(vec![
            ("/surah/1", Ok(ayahs_json(&["a1"]))),
            ("/surah/1/en.sahih", Ok(ayahs_json(&["t1"]))),
            ("/surah/1/en.pickthall", Ok(ayahs_json(&["p1"]))),
        ]);
        let client = QuranClient::new(source.clone());

        client.fetch_verses(1, "en.sahih").await.unwrap();
        client.fetch_verses(1, "en.sahih").await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        let other = client.fetch_verses(1, "en.pickthall").await.unwrap();
        assert_eq!(other[0].translation.as_deref(), Some("p1"));
        // original text is shared between translations
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let source = FakeSource::with(vec![("/surah", Err(FetchError::Network("offline".into())))]);
        let client = QuranClient::new(source.clone());

        let err = client.fetch_chapter_list().await.unwrap_err();
        assert_eq!(err, FetchError::Network("offline".into()));

        source.responses.lock().insert("/surah".into(), Ok(chapter_list_json()));
        assert_eq!(client.fetch_chapter_list().await.unwrap().len(), 2);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unexpected_shape_is_malformed() {
        let source = FakeSource::with(vec![("/surah", Ok(json!({"code": 200, "data": "nope"})))]);
        let client = QuranClient::new(source);
        assert!(matches!(
            client.fetch_chapter_list().await,
            Err(FetchError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn missing_translation_surfaces_status() {
        let source = FakeSource::with(vec![("/surah/1", Ok(ayahs_json(&["a1"])))]);
        let client = QuranClient::new(source);
        assert_eq!(
            client.fetch_verses(1, "xx.none").await.unwrap_err(),
            FetchError::Status(404)
        );
    }
}
