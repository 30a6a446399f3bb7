//! Usage analytics derived purely from stored metadata (§4.1 `usage_analytics`).

use std::collections::BTreeMap;

use pa_contracts::document::Document;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageAnalytics {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_drug: BTreeMap<String, usize>,
    pub cross_workflow_count: usize,
    pub quality_bands: BTreeMap<String, usize>,
}

fn quality_band(reference_count: usize) -> &'static str {
    match reference_count {
        0 | 1 => "single_reference",
        2..=4 => "multi_reference",
        _ => "highly_referenced",
    }
}

pub fn usage_analytics(documents: &[Document]) -> UsageAnalytics {
    let mut analytics = UsageAnalytics {
        total: documents.len(),
        ..Default::default()
    };

    for doc in documents {
        *analytics.by_type.entry(doc.metadata.document_type.as_tag()).or_insert(0) += 1;

        for drug in &doc.metadata.drug_names_context {
            *analytics.by_drug.entry(drug.clone()).or_insert(0) += 1;
        }

        let reference_count = doc.metadata.reference_count();
        if reference_count >= 2 {
            analytics.cross_workflow_count += 1;
        }
        *analytics
            .quality_bands
            .entry(quality_band(reference_count).to_string())
            .or_insert(0) += 1;
    }

    analytics
}
