pub mod article;
pub mod builder;
pub mod clustering;
pub mod collection;
pub mod config;
pub mod dates;
pub mod entity;
pub mod error;
pub mod language;
pub mod storage;

pub use article::{Article, ArticleField, ClusterKey, SimilarPill};
pub use builder::{article_uid, canonical_url, ArticleBuilder, RawArticle};
pub use clustering::{cluster_sizes, group_by_cluster, unique_clusters, ClusterGroups};
pub use collection::{ArticleCollection, ArticleStatus};
pub use config::{BuilderConfig, ErrorPolicy};
pub use entity::{Entity, EntityCollection};
pub use error::{Error, ExtractionError};
pub use language::{LanguageDetector, WhatlangDetector};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::{
        Article, ArticleBuilder, ArticleCollection, ClusterKey, Entity, EntityCollection, Error,
        RawArticle, Result,
    };
}
