//! Flat JSON document persistence: one array, one object per article.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::article::Article;
use crate::Result;

pub fn write_document<W: Write>(articles: &[Article], writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer(&mut writer, articles)?;
    writer.flush()?;
    Ok(())
}

pub fn read_document<R: Read>(reader: R) -> Result<Vec<Article>> {
    Ok(serde_json::from_reader(BufReader::new(reader))?)
}

pub fn save_to_path(articles: &[Article], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_document(articles, File::create(path)?)?;
    debug!("Saved {} articles to {}", articles.len(), path.display());
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<Vec<Article>> {
    let articles = read_document(File::open(path)?)?;
    debug!("Loaded {} articles from {}", articles.len(), path.display());
    Ok(articles)
}
