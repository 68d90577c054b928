use std::ops::Index;
use std::path::Path;

use crate::article::Article;
use crate::{storage, Error, Result};

/// Outcome of [`ArticleCollection::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleStatus {
    New,
    Updated,
    Unchanged,
}

/// Ordered, non-unique store of articles.
///
/// Lookups scan linearly and return the first match. Nothing stops two
/// articles with the same id from living side by side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleCollection {
    articles: Vec<Article>,
}

impl ArticleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, article: Article) {
        self.articles.push(article);
    }

    pub fn add(&mut self, article: Article) {
        self.append(article);
    }

    /// Stores a freshly built article, merging it into the first stored
    /// article with the same id. A merge keeps the stored enrichment and the
    /// original `fetched_on`.
    pub fn upsert(&mut self, article: Article) -> ArticleStatus {
        let Some(existing) = self.get_mut(&article.id) else {
            self.append(article);
            return ArticleStatus::New;
        };
        if existing.text == article.text && existing.title == article.title {
            return ArticleStatus::Unchanged;
        }
        let fetched_on = existing.fetched_on.or(article.fetched_on);
        existing.update_from(&article);
        existing.language = article.language;
        existing.fetched_on = fetched_on;
        ArticleStatus::Updated
    }

    pub fn get(&self, id: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Article> {
        self.articles.iter_mut().find(|a| a.id == id)
    }

    pub fn get_by_source(&self, source: &str) -> Vec<&Article> {
        self.articles
            .iter()
            .filter(|a| a.source_url.as_deref() == Some(source))
            .collect()
    }

    /// Removes the first article equal to `article`.
    /// Fails with [`Error::NotFound`] when no such article is stored.
    pub fn remove(&mut self, article: &Article) -> Result<Article> {
        let position = self
            .articles
            .iter()
            .position(|a| a == article)
            .ok_or_else(|| Error::NotFound(format!("article {}", article.id)))?;
        Ok(self.articles.remove(position))
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<Article> {
        let position = self.articles.iter().position(|a| a.id == id)?;
        Some(self.articles.remove(position))
    }

    /// Returns a new collection holding copies of the matching articles.
    pub fn filter<F>(&self, predicate: F) -> ArticleCollection
    where
        F: Fn(&Article) -> bool,
    {
        self.articles.iter().filter(|a| predicate(a)).cloned().collect()
    }

    pub fn size(&self) -> usize {
        self.articles.len()
    }

    pub fn count(&self) -> usize {
        self.articles.len()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Article> {
        self.articles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Article> {
        self.articles.iter_mut()
    }

    pub fn as_slice(&self) -> &[Article] {
        &self.articles
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        storage::save_to_path(&self.articles, path.as_ref())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            articles: storage::load_from_path(path.as_ref())?,
        })
    }

    /// Appends every article stored at `path` to this collection.
    pub fn extend_from_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.articles.extend(storage::load_from_path(path.as_ref())?);
        Ok(())
    }

    pub fn to_writer<W: std::io::Write>(&self, writer: W) -> Result<()> {
        storage::write_document(&self.articles, writer)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(Self {
            articles: storage::read_document(reader)?,
        })
    }
}

impl Index<usize> for ArticleCollection {
    type Output = Article;

    fn index(&self, index: usize) -> &Article {
        &self.articles[index]
    }
}

impl From<Vec<Article>> for ArticleCollection {
    fn from(articles: Vec<Article>) -> Self {
        Self { articles }
    }
}

impl FromIterator<Article> for ArticleCollection {
    fn from_iter<I: IntoIterator<Item = Article>>(iter: I) -> Self {
        Self {
            articles: iter.into_iter().collect(),
        }
    }
}

impl Extend<Article> for ArticleCollection {
    fn extend<I: IntoIterator<Item = Article>>(&mut self, iter: I) {
        self.articles.extend(iter);
    }
}

impl IntoIterator for ArticleCollection {
    type Item = Article;
    type IntoIter = std::vec::IntoIter<Article>;

    fn into_iter(self) -> Self::IntoIter {
        self.articles.into_iter()
    }
}

impl<'a> IntoIterator for &'a ArticleCollection {
    type Item = &'a Article;
    type IntoIter = std::slice::Iter<'a, Article>;

    fn into_iter(self) -> Self::IntoIter {
        self.articles.iter()
    }
}
