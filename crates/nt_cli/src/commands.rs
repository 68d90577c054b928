use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use nt_core::{
    group_by_cluster, unique_clusters, ArticleBuilder, ArticleCollection, ArticleStatus,
    BuilderConfig, Error, RawArticle, Result,
};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub new: usize,
    pub updated: usize,
    pub unchanged: usize,
}

/// Builds every raw record in `raw_path` and merges it into the document at
/// `out`, creating the document when it does not exist yet.
pub fn ingest(
    raw_path: &Path,
    source: &str,
    out: &Path,
    config: BuilderConfig,
) -> Result<IngestSummary> {
    let raws: Vec<RawArticle> = serde_json::from_reader(BufReader::new(File::open(raw_path)?))?;
    info!("🦗 Read {} raw articles from {}", raws.len(), raw_path.display());

    let mut articles = if out.exists() {
        ArticleCollection::load(out)?
    } else {
        ArticleCollection::new()
    };

    let built = ArticleBuilder::new().with_config(config).build_collection(&raws, source);
    let mut summary = IngestSummary::default();
    for article in built {
        match articles.upsert(article) {
            ArticleStatus::New => summary.new += 1,
            ArticleStatus::Updated => summary.updated += 1,
            ArticleStatus::Unchanged => summary.unchanged += 1,
        }
    }

    articles.save(out)?;
    info!(
        "💾 Saved {} articles to {} (🆕 {} 📝 {} ⏭️ {})",
        articles.len(),
        out.display(),
        summary.new,
        summary.updated,
        summary.unchanged
    );
    Ok(summary)
}

pub fn clusters<W: Write>(doc: &Path, mut out: W) -> Result<()> {
    let articles = ArticleCollection::load(doc)?;
    for (key, members) in group_by_cluster(&articles) {
        let label = key.map(|k| k.to_string()).unwrap_or_else(|| "unassigned".to_string());
        writeln!(out, "{}: {} articles", label, members.len())?;
        for article in members {
            writeln!(out, "  - {} {}", article.id, article.title.as_deref().unwrap_or_default())?;
        }
    }
    let keys: Vec<String> = unique_clusters(&articles)
        .into_iter()
        .flatten()
        .map(|k| k.to_string())
        .collect();
    writeln!(out, "clusters: [{}]", keys.join(", "))?;
    Ok(())
}

/// Prints articles in `language`, or saves them to `save_to` when given.
pub fn filter<W: Write>(
    doc: &Path,
    language: &str,
    save_to: Option<PathBuf>,
    mut out: W,
) -> Result<usize> {
    let articles = ArticleCollection::load(doc)?;
    let matching = articles.filter(|a| a.language == language);
    info!("🔍 {} of {} articles are in '{}'", matching.len(), articles.len(), language);

    match save_to {
        Some(path) => matching.save(path)?,
        None => {
            for article in &matching {
                writeln!(out, "{}\t{}", article.id, article.title.as_deref().unwrap_or_default())?;
            }
        }
    }
    Ok(matching.len())
}

pub fn show<W: Write>(doc: &Path, id: &str, mut out: W) -> Result<()> {
    let articles = ArticleCollection::load(doc)?;
    let article = articles
        .get(id)
        .ok_or_else(|| Error::NotFound(format!("article {}", id)))?;
    writeln!(out, "{}", serde_json::to_string_pretty(article)?)?;
    Ok(())
}

pub fn links<W: Write>(doc: &Path, id: &str, entity_type: &str, mut out: W) -> Result<()> {
    let articles = ArticleCollection::load(doc)?;
    let article = articles
        .get(id)
        .ok_or_else(|| Error::NotFound(format!("article {}", id)))?;
    for link in article.get_entity_links(entity_type) {
        writeln!(out, "{}", link)?;
    }
    Ok(())
}
