use std::collections::BTreeMap;

use serde::Deserialize;

/// Root of `health-data-topics.json`. Only the `health` section is read;
/// WONDER publishes health surveillance data exclusively.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Taxonomy {
    #[serde(default)]
    pub health: Vec<CategoryGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryGroup {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub topics: Vec<TopicEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicEntry {
    #[serde(default)]
    pub name: String,
}

impl Taxonomy {
    /// Flattens the category tree into topic name -> category name.
    /// Topics without a name are skipped.
    pub fn topic_categories(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for group in &self.health {
            for topic in &group.topics {
                if !topic.name.is_empty() {
                    map.insert(topic.name.clone(), group.category.clone());
                }
            }
        }
        map
    }
}
