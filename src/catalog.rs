use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::DatasetProbe;
use crate::taxonomy::Taxonomy;

/// One classification rule: patterns tried against the lowercased page name,
/// and the rationale recorded when any of them hits.
pub struct TopicRule {
    pub topic: &'static str,
    pub patterns: &'static [&'static str],
    pub reason_template: &'static str,
}

/// Order matters: more specific rules come before general ones. For example,
/// "Maternal & Child Health" (fetal, lbd) is checked before "Mortality" so
/// fetal-death datasets are not classified as general mortality. The first
/// matching pattern wins.
///
/// To extend: add new patterns or new rules as datasets appear.
pub static TOPIC_RULES: [TopicRule; 9] = [
    TopicRule {
        topic: "Maternal & Child Health",
        // fetal deaths, Linked Birth/Infant Death
        patterns: &[r"fetal", r"lbd", r"infant"],
        reason_template: "Dataset '{dataset_id}' maps to 'Maternal & Child Health' because its \
            page name '{page_name}' contains fetal death or linked birth/infant death \
            (LBD) patterns. LBD datasets link infant death records to corresponding \
            birth certificates for analysis of infant mortality risk factors.",
    },
    TopicRule {
        topic: "Population Estimates",
        // birth-death-migration projections are demographics, not mortality
        patterns: &[
            r"bridged-race",
            r"single-race",
            r"population-projection",
            r"birth-death-migration",
        ],
        reason_template: "Dataset '{dataset_id}' maps to 'Population Estimates' because its page \
            name '{page_name}' contains population estimation patterns. Bridged-race \
            and single-race datasets provide demographic population estimates used \
            as denominators for calculating health rates.",
    },
    TopicRule {
        topic: "Birth & Natality",
        patterns: &[r"natality"],
        reason_template: "Dataset '{dataset_id}' maps to 'Birth & Natality' because its page name \
            '{page_name}' contains natality/birth-related keywords. Natality datasets \
            provide birth statistics including birth rates, birth weights, maternal \
            characteristics, and prenatal care information.",
    },
    TopicRule {
        topic: "Cancer",
        patterns: &[r"cancer", r"cancermort", r"cancermir", r"cancernpcr"],
        reason_template: "Dataset '{dataset_id}' maps to 'Cancer' because its page name \
            '{page_name}' contains cancer-related keywords. These datasets cover \
            cancer incidence rates, cancer mortality, survival statistics, and \
            data from the National Program of Cancer Registries (NPCR).",
    },
    TopicRule {
        topic: "Infectious Diseases",
        // tb needs a boundary (tb-v2023, tb.html) so "stb" pages do not hit
        patterns: &[r"aids", r"tb(?:-|$|v)", r"std", r"tuberculosis"],
        reason_template: "Dataset '{dataset_id}' maps to 'Infectious Diseases' because its page \
            name '{page_name}' contains patterns for AIDS, tuberculosis (TB), or \
            sexually transmitted diseases (STD). These are key infectious disease \
            surveillance datasets tracking reportable conditions.",
    },
    TopicRule {
        topic: "Vaccinations & Immunizations",
        patterns: &[r"vaers", r"vaccine", r"immunization"],
        reason_template: "Dataset '{dataset_id}' maps to 'Vaccinations & Immunizations' because \
            its page name '{page_name}' contains VAERS or vaccine-related keywords. \
            VAERS (Vaccine Adverse Event Reporting System) tracks reported adverse \
            events following vaccination.",
    },
    TopicRule {
        topic: "Environmental Health",
        patterns: &[
            r"nasa",
            r"nldas",
            r"heatwave",
            r"nca",
            r"insolar",
            r"precipitation",
            r"pm(?:2\.5|25)?",
            r"lst",
        ],
        reason_template: "Dataset '{dataset_id}' maps to 'Environmental Health' because its page \
            name '{page_name}' contains environmental/climate data patterns. These \
            datasets from NASA and NCA provide environmental exposure data including \
            air quality (PM2.5), temperature, precipitation, and heat wave metrics.",
    },
    TopicRule {
        topic: "Notifiable Conditions",
        patterns: &[r"nndss"],
        reason_template: "Dataset '{dataset_id}' maps to 'Notifiable Conditions' because its page \
            name '{page_name}' contains NNDSS (National Notifiable Diseases \
            Surveillance System). This system tracks diseases required by law to be \
            reported to public health authorities.",
    },
    TopicRule {
        topic: "Mortality",
        // checked last so the specific rules above claim their datasets first
        patterns: &[r"cmf", r"ucd", r"mcd", r"mortality"],
        reason_template: "Dataset '{dataset_id}' maps to 'Mortality' because its page name \
            '{page_name}' matches mortality-related patterns (CMF=Compressed Mortality \
            File, UCD=Underlying Cause of Death, MCD=Multiple Cause of Death). These \
            datasets track death rates and causes of death across populations.",
    },
];

/// A probed dataset that matched a topic rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMapping {
    pub dataset_id: String,
    pub page_name: String,
    pub final_url: String,
    pub topic: String,
    pub category: String,
    pub reason: String,
    pub years: String,
}

/// A resolved dataset no rule claimed. Kept for manual review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnmappedDataset {
    pub dataset_id: String,
    pub page_name: String,
    pub final_url: String,
    pub reason: String,
}

/// Classifies one dataset row by page name. Returns None when no rule matches.
pub fn classify(
    row: &DatasetProbe,
    topic_categories: &BTreeMap<String, String>,
) -> Option<DatasetMapping> {
    let page_name = row.page_name.to_lowercase();
    for rule in &TOPIC_RULES {
        for pattern in rule.patterns {
            if Regex::new(pattern).unwrap().is_match(&page_name) {
                let category = topic_categories
                    .get(rule.topic)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string());
                let reason = rule
                    .reason_template
                    .replace("{dataset_id}", &row.id)
                    .replace("{page_name}", &row.page_name);
                return Some(DatasetMapping {
                    dataset_id: row.id.clone(),
                    page_name: row.page_name.clone(),
                    final_url: row.final_url.clone(),
                    topic: rule.topic.to_string(),
                    category,
                    reason,
                    years: row.years.clone(),
                });
            }
        }
    }
    None
}

/// Runs every resolved dataset row through the rule table. Rows that never
/// resolved to a static page are skipped entirely.
pub fn catalog_datasets(
    rows: &[DatasetProbe],
    taxonomy: &Taxonomy,
) -> (Vec<DatasetMapping>, Vec<UnmappedDataset>) {
    let topic_categories = taxonomy.topic_categories();
    let mut mappings = Vec::new();
    let mut unmapped = Vec::new();

    for row in rows.iter().filter(|row| row.is_resolved()) {
        match classify(row, &topic_categories) {
            Some(mapping) => mappings.push(mapping),
            None => unmapped.push(UnmappedDataset {
                dataset_id: row.id.clone(),
                page_name: row.page_name.clone(),
                final_url: row.final_url.clone(),
                reason: unmapped_reason(&row.id, &row.page_name),
            }),
        }
    }

    (mappings, unmapped)
}

fn unmapped_reason(dataset_id: &str, page_name: &str) -> String {
    format!(
        "Dataset '{dataset_id}' with page '{page_name}' could not be mapped \
        to any topic. None of the defined search patterns matched the page name. \
        Consider adding a new pattern to TOPIC_RULES if this dataset \
        belongs to an existing topic, or create a new topic category."
    )
}
