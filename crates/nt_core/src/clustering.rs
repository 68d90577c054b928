use std::collections::{BTreeMap, BTreeSet};

use crate::article::{Article, ClusterKey};

/// Articles bucketed by cluster; `None` holds the unassigned ones.
pub type ClusterGroups<'a> = BTreeMap<Option<ClusterKey>, Vec<&'a Article>>;

/// Partitions `articles` by cluster, keeping input order inside each bucket.
pub fn group_by_cluster<'a, I>(articles: I) -> ClusterGroups<'a>
where
    I: IntoIterator<Item = &'a Article>,
{
    let mut groups = ClusterGroups::new();
    for article in articles {
        groups.entry(article.cluster.clone()).or_default().push(article);
    }
    groups
}

pub fn unique_clusters<'a, I>(articles: I) -> BTreeSet<Option<ClusterKey>>
where
    I: IntoIterator<Item = &'a Article>,
{
    articles.into_iter().map(|a| a.cluster.clone()).collect()
}

/// Number of articles per cluster.
pub fn cluster_sizes<'a, I>(articles: I) -> BTreeMap<Option<ClusterKey>, usize>
where
    I: IntoIterator<Item = &'a Article>,
{
    let mut sizes = BTreeMap::new();
    for article in articles {
        *sizes.entry(article.cluster.clone()).or_insert(0) += 1;
    }
    sizes
}
