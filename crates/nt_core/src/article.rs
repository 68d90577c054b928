use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::dates;
use crate::entity::{Entity, EntityCollection};
use crate::{Error, Result};

pub const DEFAULT_LANGUAGE: &str = "en";

/// Externally assigned cluster key. Documents carry either numbers or labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClusterKey {
    Id(i64),
    Label(String),
}

impl fmt::Display for ClusterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterKey::Id(id) => write!(f, "{}", id),
            ClusterKey::Label(label) => write!(f, "{}", label),
        }
    }
}

impl From<i64> for ClusterKey {
    fn from(id: i64) -> Self {
        ClusterKey::Id(id)
    }
}

impl From<&str> for ClusterKey {
    fn from(label: &str) -> Self {
        ClusterKey::Label(label.to_string())
    }
}

/// One ingested news article with its extracted entities and enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub uid: String,
    #[serde(default)]
    pub doc_id: Option<i64>,
    #[serde(default, with = "dates::lenient")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, with = "dates::lenient")]
    pub fetched_on: Option<DateTime<Utc>>,
    #[serde(default, with = "dates::lenient")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cluster: Option<ClusterKey>,
    #[serde(default)]
    pub factual: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: EntityCollection,
    #[serde(default)]
    pub article_url: Option<String>,
    #[serde(default)]
    pub article_source: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub similars: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub related: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default = "default_language", deserialize_with = "language_or_default")]
    pub language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub combined: Option<String>,
    #[serde(default)]
    pub cluster_centroid: Option<i64>,
}

impl Default for Article {
    fn default() -> Self {
        Self {
            id: String::new(),
            uid: String::new(),
            doc_id: None,
            publish_date: None,
            category: None,
            fetched_on: None,
            last_updated: None,
            cluster: None,
            factual: None,
            sentiment: None,
            entities: EntityCollection::new(),
            article_url: None,
            article_source: None,
            title: None,
            text: None,
            authors: Vec::new(),
            summary: None,
            similars: Vec::new(),
            related: Vec::new(),
            topics: Vec::new(),
            source_url: None,
            language: default_language(),
            keywords: Vec::new(),
            metadata: None,
            combined: None,
            cluster_centroid: None,
        }
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn language_or_default<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_language))
}

/// Names of the persisted Article fields, used to validate merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArticleField {
    Id,
    Uid,
    DocId,
    PublishDate,
    Category,
    FetchedOn,
    LastUpdated,
    Cluster,
    Factual,
    Sentiment,
    Entities,
    ArticleUrl,
    ArticleSource,
    Title,
    Text,
    Authors,
    Summary,
    Similars,
    Related,
    Topics,
    SourceUrl,
    Language,
    Keywords,
    Metadata,
    Combined,
    ClusterCentroid,
}

impl ArticleField {
    pub const ALL: [ArticleField; 26] = [
        ArticleField::Id,
        ArticleField::Uid,
        ArticleField::DocId,
        ArticleField::PublishDate,
        ArticleField::Category,
        ArticleField::FetchedOn,
        ArticleField::LastUpdated,
        ArticleField::Cluster,
        ArticleField::Factual,
        ArticleField::Sentiment,
        ArticleField::Entities,
        ArticleField::ArticleUrl,
        ArticleField::ArticleSource,
        ArticleField::Title,
        ArticleField::Text,
        ArticleField::Authors,
        ArticleField::Summary,
        ArticleField::Similars,
        ArticleField::Related,
        ArticleField::Topics,
        ArticleField::SourceUrl,
        ArticleField::Language,
        ArticleField::Keywords,
        ArticleField::Metadata,
        ArticleField::Combined,
        ArticleField::ClusterCentroid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleField::Id => "id",
            ArticleField::Uid => "uid",
            ArticleField::DocId => "doc_id",
            ArticleField::PublishDate => "publish_date",
            ArticleField::Category => "category",
            ArticleField::FetchedOn => "fetched_on",
            ArticleField::LastUpdated => "last_updated",
            ArticleField::Cluster => "cluster",
            ArticleField::Factual => "factual",
            ArticleField::Sentiment => "sentiment",
            ArticleField::Entities => "entities",
            ArticleField::ArticleUrl => "article_url",
            ArticleField::ArticleSource => "article_source",
            ArticleField::Title => "title",
            ArticleField::Text => "text",
            ArticleField::Authors => "authors",
            ArticleField::Summary => "summary",
            ArticleField::Similars => "similars",
            ArticleField::Related => "related",
            ArticleField::Topics => "topics",
            ArticleField::SourceUrl => "source_url",
            ArticleField::Language => "language",
            ArticleField::Keywords => "keywords",
            ArticleField::Metadata => "metadata",
            ArticleField::Combined => "combined",
            ArticleField::ClusterCentroid => "cluster_centroid",
        }
    }
}

impl FromStr for ArticleField {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        ArticleField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == name)
            .ok_or_else(|| Error::InvalidField(name.to_string()))
    }
}

impl fmt::Display for ArticleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn decode<T: DeserializeOwned>(field: ArticleField, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::SchemaViolation {
        field: field.to_string(),
        message: e.to_string(),
    })
}

fn decode_timestamp(field: ArticleField, value: Value) -> Result<Option<DateTime<Utc>>> {
    match decode::<Option<String>>(field, value)? {
        Some(raw) => dates::parse_timestamp(&raw).map_err(|bad| Error::SchemaViolation {
            field: field.to_string(),
            message: format!("unparsable timestamp '{}'", bad),
        }),
        None => Ok(None),
    }
}

fn decode_list(field: ArticleField, value: Value) -> Result<Vec<String>> {
    Ok(decode::<Option<Vec<String>>>(field, value)?.unwrap_or_default())
}

impl Article {
    /// Writes one decoded value into the named field.
    fn set_field(&mut self, field: ArticleField, value: Value) -> Result<()> {
        match field {
            ArticleField::Id => {
                self.id = decode::<Option<String>>(field, value)?.unwrap_or_default();
            }
            ArticleField::Uid => {
                self.uid = decode::<Option<String>>(field, value)?.unwrap_or_default();
            }
            ArticleField::DocId => self.doc_id = decode(field, value)?,
            ArticleField::PublishDate => self.publish_date = decode_timestamp(field, value)?,
            ArticleField::Category => self.category = decode(field, value)?,
            ArticleField::FetchedOn => self.fetched_on = decode_timestamp(field, value)?,
            ArticleField::LastUpdated => self.last_updated = decode_timestamp(field, value)?,
            ArticleField::Cluster => self.cluster = decode(field, value)?,
            ArticleField::Factual => self.factual = decode(field, value)?,
            ArticleField::Sentiment => self.sentiment = decode(field, value)?,
            ArticleField::Entities => {
                let entities = decode::<Option<Vec<Entity>>>(field, value)?.unwrap_or_default();
                self.entities = entities.into_iter().collect();
            }
            ArticleField::ArticleUrl => self.article_url = decode(field, value)?,
            ArticleField::ArticleSource => self.article_source = decode(field, value)?,
            ArticleField::Title => self.title = decode(field, value)?,
            ArticleField::Text => self.text = decode(field, value)?,
            ArticleField::Authors => self.authors = decode_list(field, value)?,
            ArticleField::Summary => self.summary = decode(field, value)?,
            ArticleField::Similars => self.similars = decode_list(field, value)?,
            ArticleField::Related => self.related = decode_list(field, value)?,
            ArticleField::Topics => self.topics = decode_list(field, value)?,
            ArticleField::SourceUrl => self.source_url = decode(field, value)?,
            ArticleField::Language => {
                self.language =
                    decode::<Option<String>>(field, value)?.unwrap_or_else(default_language);
            }
            ArticleField::Keywords => self.keywords = decode_list(field, value)?,
            ArticleField::Metadata => self.metadata = decode(field, value)?,
            ArticleField::Combined => self.combined = decode(field, value)?,
            ArticleField::ClusterCentroid => self.cluster_centroid = decode(field, value)?,
        }
        Ok(())
    }

    /// Merges a field-name → value document into this article.
    ///
    /// The merge is all-or-nothing: an unknown field name fails with
    /// [`Error::InvalidField`], a value of the wrong shape with
    /// [`Error::SchemaViolation`], and in both cases the article keeps every
    /// value it had before the call.
    pub fn update(&mut self, fields: Map<String, Value>) -> Result<()> {
        let mut staged = self.clone();
        for (name, value) in fields {
            let field: ArticleField = name.parse()?;
            staged.set_field(field, value)?;
        }
        *self = staged;
        Ok(())
    }

    /// Copies every field that is set on `other` into this article.
    ///
    /// `language` counts as set only when it differs from
    /// [`DEFAULT_LANGUAGE`], so a sparse enrichment built from
    /// `Article::default()` keeps the detected language.
    pub fn update_from(&mut self, other: &Article) {
        fn take<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
            if source.is_some() {
                target.clone_from(source);
            }
        }
        fn take_list<T: Clone>(target: &mut Vec<T>, source: &[T]) {
            if !source.is_empty() {
                *target = source.to_vec();
            }
        }

        if !other.id.is_empty() {
            self.id.clone_from(&other.id);
        }
        if !other.uid.is_empty() {
            self.uid.clone_from(&other.uid);
        }
        take(&mut self.doc_id, &other.doc_id);
        take(&mut self.publish_date, &other.publish_date);
        take(&mut self.category, &other.category);
        take(&mut self.fetched_on, &other.fetched_on);
        take(&mut self.last_updated, &other.last_updated);
        take(&mut self.cluster, &other.cluster);
        take(&mut self.factual, &other.factual);
        take(&mut self.sentiment, &other.sentiment);
        if !other.entities.is_empty() {
            self.entities = other.entities.clone();
        }
        take(&mut self.article_url, &other.article_url);
        take(&mut self.article_source, &other.article_source);
        take(&mut self.title, &other.title);
        take(&mut self.text, &other.text);
        take_list(&mut self.authors, &other.authors);
        take(&mut self.summary, &other.summary);
        take_list(&mut self.similars, &other.similars);
        take_list(&mut self.related, &other.related);
        take_list(&mut self.topics, &other.topics);
        take(&mut self.source_url, &other.source_url);
        if other.language != DEFAULT_LANGUAGE {
            self.language.clone_from(&other.language);
        }
        take_list(&mut self.keywords, &other.keywords);
        take(&mut self.metadata, &other.metadata);
        take(&mut self.combined, &other.combined);
        take(&mut self.cluster_centroid, &other.cluster_centroid);
    }

    pub fn entities(&self) -> &EntityCollection {
        &self.entities
    }

    pub fn set_entities(&mut self, entities: EntityCollection) {
        self.entities = entities;
    }

    pub fn entities_by_type(&self, entity_type: &str) -> Vec<&Entity> {
        self.entities.get_by_type(entity_type)
    }

    /// Links of every entity of `entity_type`, concatenated in entity order.
    pub fn get_entity_links(&self, entity_type: &str) -> Vec<&str> {
        self.entities
            .iter()
            .filter(|e| e.entity_type() == entity_type)
            .flat_map(|e| e.links().iter().map(String::as_str))
            .collect()
    }

    pub fn get_all_entity_types(&self) -> BTreeSet<&str> {
        self.entities.types()
    }

    pub fn set_sentiment(&mut self, sentiment: impl Into<String>) {
        self.sentiment = Some(sentiment.into());
    }

    pub fn set_factual(&mut self, factual: impl Into<String>) {
        self.factual = Some(factual.into());
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = Some(summary.into());
    }

    pub fn set_topics(&mut self, topics: Vec<String>) {
        self.topics = topics;
    }

    pub fn set_cluster(&mut self, cluster: Option<ClusterKey>) {
        self.cluster = cluster;
    }

    pub fn add_topic(&mut self, topic: impl Into<String>) {
        self.topics.push(topic.into());
    }

    pub fn add_related(&mut self, article_id: impl Into<String>) {
        self.related.push(article_id.into());
    }

    pub fn add_similar(&mut self, article_id: impl Into<String>) {
        self.similars.push(article_id.into());
    }

    /// Sets `category` from the path segment before the last one in
    /// `article_url`, e.g. `politics` for `https://site/politics/story-1`.
    pub fn extract_category(&mut self) -> Result<&str> {
        let raw = self
            .article_url
            .as_deref()
            .ok_or_else(|| Error::MissingField("article_url".to_string()))?;
        let url = Url::parse(raw).map_err(|e| Error::InvalidUrl(format!("{}: {}", raw, e)))?;
        let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();

        let category = match segments.len() {
            n if n >= 2 && !segments[n - 2].is_empty() => segments[n - 2].to_string(),
            _ => return Err(Error::InvalidUrl(format!("no category segment in {}", raw))),
        };
        Ok(self.category.insert(category).as_str())
    }

    pub fn word_count(&self) -> usize {
        self.text.as_deref().map(|t| t.split_whitespace().count()).unwrap_or(0)
    }

    pub fn pill(&self) -> SimilarPill {
        SimilarPill::from(self)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Compact view of an article used in similarity and related listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarPill {
    pub id: String,
    pub uid: String,
    pub title: Option<String>,
    pub text: Option<String>,
    pub summary: Option<String>,
    pub related: Vec<String>,
    pub similars: Vec<String>,
}

impl From<&Article> for SimilarPill {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            uid: article.uid.clone(),
            title: article.title.clone(),
            text: article.text.clone(),
            summary: article.summary.clone(),
            related: article.related.clone(),
            similars: article.similars.clone(),
        }
    }
}
