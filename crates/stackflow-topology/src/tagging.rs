use stackflow_cloud::ResourceGraph;
use stackflow_core::NormalizedConfig;
use std::collections::BTreeMap;

/// `Application` and `Environment`, plus the stage's custom tag
pub fn tag_set(config: &NormalizedConfig) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    tags.insert("Application".to_string(), config.app_name.clone());
    tags.insert("Environment".to_string(), config.stage.clone());
    if let Some(tag) = &config.custom_tag
        && !tag.key.is_empty()
    {
        tags.insert(tag.key.clone(), tag.value.clone());
    }
    tags
}

pub fn apply(graph: &mut ResourceGraph, tags: &BTreeMap<String, String>) {
    graph.apply_tags(tags);
}
