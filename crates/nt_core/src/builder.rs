use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::article::Article;
use crate::collection::ArticleCollection;
use crate::config::{BuilderConfig, ErrorPolicy};
use crate::dates;
use crate::error::ExtractionError;
use crate::language::{LanguageDetector, WhatlangDetector};
use crate::Result;

/// An article as handed over by the scraping pipeline, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub meta_data: Option<Map<String, Value>>,
    /// Id the record carries in an external document store, if any.
    #[serde(default)]
    pub doc_id: Option<i64>,
}

/// Normalizes a URL for hashing: trims it and drops the fragment.
/// Strings that do not parse as URLs are only trimmed.
pub fn canonical_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => trimmed.to_string(),
    }
}

/// Stable identity of an article: UUID v3 of its canonical URL.
pub fn article_uid(url: &str) -> Uuid {
    Uuid::new_v3(&Uuid::NAMESPACE_URL, canonical_url(url).as_bytes())
}

/// Builds canonical [`Article`]s from [`RawArticle`]s.
pub struct ArticleBuilder {
    config: BuilderConfig,
    detector: Box<dyn LanguageDetector>,
}

impl Default for ArticleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArticleBuilder {
    pub fn new() -> Self {
        Self {
            config: BuilderConfig::default(),
            detector: Box::new(WhatlangDetector::new()),
        }
    }

    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_detector(mut self, detector: Box<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn build(&self, raw: &RawArticle, source: &str) -> Result<Article> {
        self.build_at(raw, source, Utc::now())
    }

    /// Builds an article, stamping `fetched_on` and `last_updated` with `now`.
    ///
    /// Under [`ErrorPolicy::Degrade`] this never fails: fields that cannot be
    /// extracted are logged and left at their defaults.
    pub fn build_at(&self, raw: &RawArticle, source: &str, now: DateTime<Utc>) -> Result<Article> {
        if raw.url.trim().is_empty() {
            warn!("Building article from {} without a URL", source);
        }
        let identity = article_uid(&raw.url).to_string();

        let title = raw
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.config.placeholder_title.clone());

        let mut article = Article {
            id: identity.clone(),
            uid: identity,
            doc_id: raw.doc_id,
            fetched_on: Some(now),
            last_updated: Some(now),
            article_url: Some(raw.url.clone()),
            article_source: Some(source.to_string()),
            source_url: Some(source.to_string()),
            title: Some(title),
            text: raw.text.clone(),
            authors: raw.authors.clone().unwrap_or_default(),
            summary: raw.summary.clone(),
            keywords: raw.keywords.clone().unwrap_or_default(),
            language: self.detect_language(raw.text.as_deref()),
            metadata: raw.meta_data.clone(),
            ..Default::default()
        };

        match publish_date(raw) {
            Ok(date) => article.publish_date = date,
            Err(e) => self.recover(&raw.url, e)?,
        }
        match category(raw) {
            Ok(category) => article.category = category,
            Err(e) => self.recover(&raw.url, e)?,
        }

        debug!("Built article {} ({}) from {}", article.id, raw.url, source);
        Ok(article)
    }

    /// Builds a batch. Records that fail under [`ErrorPolicy::Abort`] are
    /// logged and skipped; the rest of the batch is kept.
    pub fn build_collection<'a>(
        &self,
        raws: impl IntoIterator<Item = &'a RawArticle>,
        source: &str,
    ) -> ArticleCollection {
        let mut articles = ArticleCollection::new();
        let mut skipped = 0usize;
        for raw in raws {
            match self.build(raw, source) {
                Ok(article) => articles.append(article),
                Err(e) => {
                    error!("Skipping article {}: {}", raw.url, e);
                    skipped += 1;
                }
            }
        }
        info!("Built {} articles from {} ({} skipped)", articles.len(), source, skipped);
        articles
    }

    fn detect_language(&self, text: Option<&str>) -> String {
        text.and_then(|t| self.detector.detect(t))
            .unwrap_or_else(|| self.config.default_language.clone())
    }

    fn recover(&self, url: &str, err: ExtractionError) -> Result<()> {
        match self.config.on_error {
            ErrorPolicy::Degrade => {
                error!("Error building article {}: {}", url, err);
                Ok(())
            }
            ErrorPolicy::Abort => Err(err.into()),
        }
    }
}

fn publish_date(raw: &RawArticle) -> std::result::Result<Option<DateTime<Utc>>, ExtractionError> {
    match raw.publish_date.as_deref() {
        Some(value) => dates::parse_timestamp(value).map_err(ExtractionError::PublishDate),
        None => Ok(None),
    }
}

fn category(raw: &RawArticle) -> std::result::Result<Option<String>, ExtractionError> {
    match raw.meta_data.as_ref().and_then(|meta| meta.get("category")) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(category)) if category.trim().is_empty() => Ok(None),
        Some(Value::String(category)) => Ok(Some(category.clone())),
        Some(_) => Err(ExtractionError::Metadata {
            field: "category".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use chrono::TimeZone;
    use serde_json::json;

    struct FixedDetector(Option<&'static str>);

    impl LanguageDetector for FixedDetector {
        fn detect(&self, _text: &str) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    fn builder(detected: Option<&'static str>) -> ArticleBuilder {
        ArticleBuilder::new().with_detector(Box::new(FixedDetector(detected)))
    }

    fn raw(url: &str) -> RawArticle {
        RawArticle {
            url: url.to_string(),
            title: Some("Budget passes".to_string()),
            text: Some("The senate passed the budget.".to_string()),
            authors: Some(vec!["Ana Pérez".to_string()]),
            publish_date: Some("2024-03-01 09:15:00".to_string()),
            keywords: Some(vec!["budget".to_string()]),
            summary: Some("Budget passed.".to_string()),
            meta_data: json!({"category": "politics"}).as_object().cloned(),
            doc_id: None,
        }
    }

    #[test]
    fn test_identity_is_deterministic() {
        let builder = builder(Some("en"));
        let first = builder.build(&raw("http://example.com/a"), "example").unwrap();
        let second = builder.build(&raw("http://example.com/a"), "example").unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.uid, second.uid);
        assert_eq!(first.id, first.uid);
        assert_eq!(Uuid::parse_str(&first.id).unwrap().get_version_num(), 3);
    }

    #[test]
    fn test_identity_ignores_fragment_and_whitespace() {
        assert_eq!(
            article_uid("http://example.com/a"),
            article_uid("  http://example.com/a#comments ")
        );
        assert_ne!(article_uid("http://example.com/a"), article_uid("http://example.com/b"));
    }

    #[test]
    fn test_builds_all_fields() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();
        let article = builder(Some("es"))
            .build_at(&raw("http://example.com/politics/budget"), "example", now)
            .unwrap();

        assert_eq!(article.title.as_deref(), Some("Budget passes"));
        assert_eq!(article.authors, vec!["Ana Pérez"]);
        assert_eq!(article.language, "es");
        assert_eq!(article.category.as_deref(), Some("politics"));
        assert_eq!(article.source_url.as_deref(), Some("example"));
        assert_eq!(article.fetched_on, Some(now));
        assert_eq!(article.last_updated, Some(now));
        assert_eq!(
            article.publish_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap())
        );
        assert!(article.related.is_empty() && article.similars.is_empty());
        assert!(article.topics.is_empty());
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let bare = RawArticle {
            url: "http://example.com/a".to_string(),
            ..Default::default()
        };
        let article = builder(None).build(&bare, "example").unwrap();

        assert_eq!(article.title.as_deref(), Some("untitled"));
        assert!(article.authors.is_empty());
        assert!(article.keywords.is_empty());
        assert_eq!(article.language, "en");
        assert_eq!(article.category, None);
        assert_eq!(article.publish_date, None);
        assert_eq!(article.doc_id, None);
    }

    #[test]
    fn test_empty_category_is_unset() {
        let mut blank = raw("http://example.com/a");
        blank.meta_data = json!({"category": ""}).as_object().cloned();
        let article = builder(Some("en")).build(&blank, "example").unwrap();
        assert_eq!(article.category, None);
    }

    #[test]
    fn test_title_kept_verbatim() {
        let mut padded = raw("http://example.com/a");
        padded.title = Some("  Budget passes ".to_string());
        let article = builder(Some("en")).build(&padded, "example").unwrap();
        assert_eq!(article.title.as_deref(), Some("  Budget passes "));

        padded.title = Some("   ".to_string());
        let article = builder(Some("en")).build(&padded, "example").unwrap();
        assert_eq!(article.title.as_deref(), Some("untitled"));
    }

    #[test]
    fn test_carries_document_id() {
        let stored = RawArticle { doc_id: Some(42), ..raw("http://example.com/a") };
        let raws = vec![stored, raw("http://example.com/b")];
        let articles = builder(Some("en")).build_collection(&raws, "example");

        assert_eq!(articles[0].doc_id, Some(42));
        assert_eq!(articles[1].doc_id, None);
    }

    #[test]
    fn test_config_accessor_reflects_overrides() {
        let builder = builder(None).with_config(
            BuilderConfig::new()
                .with_placeholder_title("sin título")
                .with_error_policy(ErrorPolicy::Abort),
        );
        assert_eq!(builder.config().placeholder_title, "sin título");
        assert_eq!(builder.config().on_error, ErrorPolicy::Abort);
        assert_eq!(builder.config().default_language, "en");

        let bare = RawArticle { url: "http://example.com/a".to_string(), ..Default::default() };
        let article = builder.build(&bare, "example").unwrap();
        assert_eq!(article.title.as_deref(), Some("sin título"));
    }

    #[test]
    fn test_detector_failure_uses_configured_default() {
        let builder = builder(None).with_config(BuilderConfig::new().with_default_language("es"));
        let article = builder.build(&raw("http://example.com/a"), "example").unwrap();
        assert_eq!(article.language, "es");
    }

    #[test]
    fn test_degraded_build_keeps_other_fields() {
        let mut bad = raw("http://example.com/a");
        bad.publish_date = Some("yesterday-ish".to_string());
        bad.meta_data = json!({"category": 12}).as_object().cloned();

        let article = builder(Some("en")).build(&bad, "example").unwrap();
        assert_eq!(article.publish_date, None);
        assert_eq!(article.category, None);
        assert_eq!(article.title.as_deref(), Some("Budget passes"));
        assert_eq!(article.id, article_uid("http://example.com/a").to_string());
    }

    #[test]
    fn test_abort_policy_surfaces_error() {
        let mut bad = raw("http://example.com/a");
        bad.publish_date = Some("yesterday-ish".to_string());
        let builder = builder(Some("en"))
            .with_config(BuilderConfig::new().with_error_policy(ErrorPolicy::Abort));

        let err = builder.build(&bad, "example").unwrap_err();
        assert!(matches!(
            err,
            Error::Extraction(ExtractionError::PublishDate(ref value)) if value == "yesterday-ish"
        ));
    }

    #[test]
    fn test_build_collection_skips_only_failures() {
        let mut bad = raw("http://example.com/b");
        bad.meta_data = json!({"category": ["x"]}).as_object().cloned();
        let raws = vec![raw("http://example.com/a"), bad, raw("http://example.com/c")];

        let degrade = builder(Some("en")).build_collection(&raws, "example");
        assert_eq!(degrade.len(), 3);

        let abort = builder(Some("en"))
            .with_config(BuilderConfig::new().with_error_policy(ErrorPolicy::Abort))
            .build_collection(&raws, "example");
        assert_eq!(abort.len(), 2);
        assert!(abort.get(&article_uid("http://example.com/b").to_string()).is_none());
    }
}
