use std::collections::BTreeSet;

use nt_core::prelude::*;
use nt_core::{group_by_cluster, unique_clusters, BuilderConfig, LanguageDetector};
use serde_json::json;

struct KeywordDetector;

impl LanguageDetector for KeywordDetector {
    fn detect(&self, text: &str) -> Option<String> {
        if text.contains("le ") {
            Some("fr".to_string())
        } else if text.is_empty() {
            None
        } else {
            Some("en".to_string())
        }
    }
}

fn raw(url: &str, text: &str) -> RawArticle {
    RawArticle {
        url: url.to_string(),
        title: Some(format!("Story at {}", url)),
        text: Some(text.to_string()),
        meta_data: json!({"category": "world"}).as_object().cloned(),
        ..Default::default()
    }
}

fn ingest() -> ArticleCollection {
    let builder = ArticleBuilder::new()
        .with_config(BuilderConfig::default())
        .with_detector(Box::new(KeywordDetector));
    let raws = vec![
        raw("https://news.example.com/world/one", "The minister spoke."),
        raw("https://news.example.com/world/two", "Markets rallied."),
        raw("https://news.example.com/world/three", "le président a parlé."),
    ];
    builder.build_collection(&raws, "example")
}

#[test]
fn test_ingest_enrich_save_load() {
    let mut articles = ingest();
    assert_eq!(articles.len(), 3);

    let ids: Vec<String> = articles.iter().map(|a| a.id.clone()).collect();
    for (i, id) in ids.iter().enumerate() {
        let article = articles.get_mut(id).unwrap();
        article.set_cluster(Some(ClusterKey::Id(if i < 2 { 1 } else { 2 })));
        article.entities.add(Entity::new("PERSON", "Alice", ["u1"]));
        article.set_sentiment("neutral");
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("articles.json");
    articles.save(&path).unwrap();

    let loaded = ArticleCollection::load(&path).unwrap();
    assert_eq!(loaded.len(), articles.len());
    let original_ids: BTreeSet<&str> = articles.iter().map(|a| a.id.as_str()).collect();
    let loaded_ids: BTreeSet<&str> = loaded.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(original_ids, loaded_ids);
    assert_eq!(loaded, articles);

    let groups = group_by_cluster(&loaded);
    assert_eq!(groups[&Some(ClusterKey::Id(1))].len(), 2);
    assert_eq!(groups[&Some(ClusterKey::Id(2))].len(), 1);
    assert_eq!(unique_clusters(&loaded).len(), 2);

    let french = loaded.filter(|a| a.language == "fr");
    assert_eq!(french.len(), 1);
    assert_eq!(loaded.len(), 3);
}

#[test]
fn test_reingest_is_idempotent_by_id() {
    let first = ingest();
    let second = ingest();
    let first_ids: Vec<&str> = first.iter().map(|a| a.id.as_str()).collect();
    let second_ids: Vec<&str> = second.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(first_ids, second_ids);
}

#[test]
fn test_extend_from_path_appends() {
    let articles = ingest();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("articles.json");
    articles.save(&path).unwrap();

    let mut combined = ingest();
    combined.extend_from_path(&path).unwrap();
    assert_eq!(combined.len(), 6);
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ArticleCollection::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_persisted_field_names() {
    let articles = ingest();
    let mut buffer = Vec::new();
    articles.to_writer(&mut buffer).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
    let first = json[0].as_object().unwrap();

    for field in nt_core::ArticleField::ALL {
        assert!(first.contains_key(field.as_str()), "missing {}", field);
    }
    assert_eq!(first.len(), nt_core::ArticleField::ALL.len());
    assert_eq!(first["category"], "world");
    assert_eq!(first["language"], "en");
}
