use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{DatasetMapping, UnmappedDataset};
use crate::domain::dataset_ordinal;

/// The persisted classification document, `topics_mapping.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicsMapping {
    pub description: String,
    pub generated_by: String,
    pub generated_at: String,
    pub total_mapped: usize,
    pub total_unmapped: usize,
    pub mappings: Vec<DatasetMapping>,
    pub unmapped: Vec<UnmappedDataset>,
}

/// Assembles the classification document with both sections sorted by the
/// numeric part of the dataset id, so D9 precedes D27 precedes D176.
pub fn build_topics_mapping(
    mut mappings: Vec<DatasetMapping>,
    mut unmapped: Vec<UnmappedDataset>,
) -> TopicsMapping {
    mappings.sort_by_key(|mapping| dataset_ordinal(&mapping.dataset_id));
    unmapped.sort_by_key(|entry| dataset_ordinal(&entry.dataset_id));
    TopicsMapping {
        description: "CDC Wonder dataset to health topic mappings".to_string(),
        generated_by: format!("wonder-registry/{}", env!("CARGO_PKG_VERSION")),
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_mapped: mappings.len(),
        total_unmapped: unmapped.len(),
        mappings,
        unmapped,
    }
}

/// Classification counts per topic plus the unmapped datasets needing review.
pub fn render_summary(mappings: &[DatasetMapping], unmapped: &[UnmappedDataset]) -> String {
    // Count per topic, keeping first-encounter order for equal counts.
    let mut counts: Vec<(String, usize)> = Vec::new();
    for mapping in mappings {
        match counts
            .iter_mut()
            .find(|(topic, _)| topic == &mapping.topic)
        {
            Some((_, count)) => *count += 1,
            None => counts.push((mapping.topic.clone(), 1)),
        }
    }
    counts.sort_by_key(|(_, count)| Reverse(*count));

    let mut out = String::new();
    push_line(&mut out, "");
    push_line(&mut out, &"=".repeat(60));
    push_line(&mut out, "CDC Wonder Dataset Classification Summary");
    push_line(&mut out, &"=".repeat(60));
    for (topic, count) in &counts {
        push_line(&mut out, &format!("  {topic}: {count} datasets"));
    }
    push_line(
        &mut out,
        &format!("\nTotal classified: {} datasets", mappings.len()),
    );
    push_line(
        &mut out,
        &format!("Total unmapped: {} datasets", unmapped.len()),
    );
    push_line(&mut out, &"=".repeat(60));

    if !unmapped.is_empty() {
        let mut review: Vec<&UnmappedDataset> = unmapped.iter().collect();
        review.sort_by_key(|entry| dataset_ordinal(&entry.dataset_id));

        push_line(&mut out, "");
        push_line(&mut out, &"=".repeat(60));
        push_line(&mut out, "UNMAPPED DATASETS - Require Manual Review");
        push_line(&mut out, &"=".repeat(60));
        for entry in review {
            push_line(
                &mut out,
                &format!("\n  {}: {}", entry.dataset_id, entry.page_name),
            );
            push_line(&mut out, &format!("    URL: {}", entry.final_url));
            push_line(&mut out, &format!("    Reason: {}", entry.reason));
        }
        push_line(&mut out, "");
        push_line(&mut out, &"=".repeat(60));
    }

    out
}

/// Every mapped dataset grouped under its topic, topics alphabetical,
/// datasets in id order within each topic.
pub fn render_by_topic(document: &TopicsMapping) -> String {
    let mut by_topic: BTreeMap<&str, Vec<&DatasetMapping>> = BTreeMap::new();
    for mapping in &document.mappings {
        by_topic.entry(&mapping.topic).or_default().push(mapping);
    }
    for datasets in by_topic.values_mut() {
        datasets.sort_by_key(|mapping| dataset_ordinal(&mapping.dataset_id));
    }

    let mut out = String::new();
    push_line(&mut out, "");
    push_line(&mut out, &"=".repeat(70));
    push_line(
        &mut out,
        "CDC Wonder Datasets by Health Topic (sorted D1-D250)",
    );
    push_line(&mut out, &"=".repeat(70));

    for (topic, datasets) in &by_topic {
        push_line(
            &mut out,
            &format!("\n### {topic} ({} datasets)", datasets.len()),
        );
        push_line(&mut out, &"-".repeat(50));
        for mapping in datasets {
            let years = if mapping.years.is_empty() {
                String::new()
            } else {
                format!(" ({})", mapping.years)
            };
            push_line(
                &mut out,
                &format!("  {}: {}{years}", mapping.dataset_id, mapping.page_name),
            );
        }
    }

    if !document.unmapped.is_empty() {
        let mut review: Vec<&UnmappedDataset> = document.unmapped.iter().collect();
        review.sort_by_key(|entry| dataset_ordinal(&entry.dataset_id));

        push_line(
            &mut out,
            &format!("\n### UNMAPPED ({} datasets)", review.len()),
        );
        push_line(&mut out, &"-".repeat(50));
        for entry in review {
            push_line(
                &mut out,
                &format!("  {}: {}", entry.dataset_id, entry.page_name),
            );
        }
    }

    push_line(&mut out, "");
    push_line(&mut out, &"=".repeat(70));
    push_line(
        &mut out,
        &format!(
            "Total: {} mapped, {} unmapped",
            document.total_mapped, document.total_unmapped
        ),
    );
    push_line(&mut out, &"=".repeat(70));

    out
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}
