//! In-memory inverted index over endpoint records with per-field weighting.
//!
//! An index is immutable once built and is valid only for the corpus
//! snapshot it was built from. The fingerprint (title + document count +
//! first endpoint id) only looks at those three: two corpora that agree on
//! all three but differ further down share a fingerprint. Callers that edit
//! a corpus in place must invalidate the cached entry.
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::model::{ApiCorpus, EndpointField, EndpointRecord};
use crate::tokenize::tokenize;

/// Short hex digest identifying a corpus snapshot; the index cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(corpus: &ApiCorpus) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(corpus.title.as_bytes());
        hasher.update(b"|");
        hasher.update(corpus.endpoints.len().to_string().as_bytes());
        hasher.update(b"|");
        if let Some(first) = corpus.endpoints.first() {
            hasher.update(first.id.as_bytes());
        }
        let hash = format!("{:x}", hasher.finalize());
        Self(hash[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Multipliers applied to term frequency per source field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldWeights {
    pub name: f64,
    pub path: f64,
    pub method: f64,
    pub folder: f64,
    pub description: f64,
    pub parameter_name: f64,
    pub parameter_description: f64,
    pub request_body: f64,
    pub response: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            name: 3.0,
            path: 2.5,
            method: 2.0,
            folder: 2.0,
            description: 1.5,
            parameter_name: 2.0,
            parameter_description: 1.0,
            request_body: 1.5,
            response: 1.0,
        }
    }
}

impl FieldWeights {
    fn weight(&self, field: EndpointField) -> f64 {
        match field {
            EndpointField::Name => self.name,
            EndpointField::Path => self.path,
            EndpointField::Method => self.method,
            EndpointField::Folder => self.folder,
            EndpointField::Description => self.description,
            EndpointField::ParameterName => self.parameter_name,
            EndpointField::ParameterDescription => self.parameter_description,
            EndpointField::RequestBody => self.request_body,
            EndpointField::Response => self.response,
        }
    }
}

/// Term statistics for a single endpoint.
#[derive(Debug, Clone, Default)]
pub struct DocumentStats {
    pub endpoint_id: String,
    /// Weighted term frequency.
    pub term_freqs: HashMap<String, f64>,
    /// Fields each term was seen in, in field declaration order.
    pub term_fields: HashMap<String, Vec<EndpointField>>,
    /// Sum of all weighted frequencies.
    pub length: f64,
}

impl DocumentStats {
    fn add(&mut self, text: &str, field: EndpointField, weights: &FieldWeights) {
        let weight = weights.weight(field);
        for term in tokenize(text) {
            *self.term_freqs.entry(term.clone()).or_insert(0.0) += weight;
            self.length += weight;
            let fields = self.term_fields.entry(term).or_default();
            if let Err(pos) = fields.binary_search(&field) {
                fields.insert(pos, field);
            }
        }
    }

    pub fn term_freq(&self, term: &str) -> f64 {
        self.term_freqs.get(term).copied().unwrap_or(0.0)
    }
}

#[derive(Debug)]
pub struct RelevanceIndex {
    fingerprint: Fingerprint,
    documents: Vec<DocumentStats>,
    avg_doc_len: f64,
    idf: HashMap<String, f64>,
    built_at: Instant,
}

impl RelevanceIndex {
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Per-document statistics, in corpus order.
    pub fn documents(&self) -> &[DocumentStats] {
        &self.documents
    }

    pub fn doc_count(&self) -> usize {
        self.documents.len()
    }

    pub fn avg_doc_len(&self) -> f64 {
        self.avg_doc_len
    }

    /// Inverse document frequency; 0 for terms absent from the corpus.
    pub fn idf(&self, term: &str) -> f64 {
        self.idf.get(term).copied().unwrap_or(0.0)
    }

    pub fn term_count(&self) -> usize {
        self.idf.len()
    }

    pub fn built_at(&self) -> Instant {
        self.built_at
    }
}

pub fn build_index(corpus: &ApiCorpus) -> RelevanceIndex {
    build_index_with(corpus, &FieldWeights::default())
}

pub fn build_index_with(corpus: &ApiCorpus, weights: &FieldWeights) -> RelevanceIndex {
    let started = Instant::now();
    let fingerprint = Fingerprint::of(corpus);

    let documents: Vec<DocumentStats> = corpus
        .endpoints
        .iter()
        .map(|endpoint| index_endpoint(endpoint, weights))
        .collect();

    let n = documents.len();
    let avg_doc_len = if n == 0 {
        1.0
    } else {
        documents.iter().map(|d| d.length).sum::<f64>() / n as f64
    };

    let mut doc_freqs: HashMap<&str, usize> = HashMap::new();
    for doc in &documents {
        for term in doc.term_freqs.keys() {
            *doc_freqs.entry(term.as_str()).or_insert(0) += 1;
        }
    }
    let idf: HashMap<String, f64> = doc_freqs
        .into_iter()
        .map(|(term, df)| (term.to_string(), inverse_document_frequency(n, df)))
        .collect();

    debug!(
        fingerprint = %fingerprint,
        documents = n,
        terms = idf.len(),
        avg_doc_len,
        elapsed_us = started.elapsed().as_micros() as u64,
        "relevance index built"
    );

    RelevanceIndex {
        fingerprint,
        documents,
        avg_doc_len,
        idf,
        built_at: Instant::now(),
    }
}

/// `ln((N - df + 0.5) / (df + 0.5) + 1)`; never negative.
pub fn inverse_document_frequency(n: usize, df: usize) -> f64 {
    let n = n as f64;
    let df = df as f64;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

fn index_endpoint(endpoint: &EndpointRecord, weights: &FieldWeights) -> DocumentStats {
    let mut doc = DocumentStats {
        endpoint_id: endpoint.id.clone(),
        ..DocumentStats::default()
    };

    doc.add(&endpoint.name, EndpointField::Name, weights);
    doc.add(&endpoint.path, EndpointField::Path, weights);
    for segment in endpoint.path.split('/').filter(|s| !s.is_empty()) {
        doc.add(segment, EndpointField::Path, weights);
    }
    doc.add(endpoint.method.as_str(), EndpointField::Method, weights);
    if let Some(folder) = &endpoint.folder {
        doc.add(folder, EndpointField::Folder, weights);
    }
    doc.add(&endpoint.description, EndpointField::Description, weights);
    for param in &endpoint.parameters {
        doc.add(&param.name, EndpointField::ParameterName, weights);
        doc.add(&param.description, EndpointField::ParameterDescription, weights);
    }
    doc.add(&endpoint.request_body, EndpointField::RequestBody, weights);
    for response in &endpoint.responses {
        doc.add(&response.status, EndpointField::Response, weights);
        doc.add(&response.description, EndpointField::Response, weights);
    }

    doc
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::model::{HttpMethod, ParameterLocation};

    fn vocabulary(index: &RelevanceIndex) -> HashSet<&str> {
        index
            .documents()
            .iter()
            .flat_map(|d| d.term_freqs.keys().map(String::as_str))
            .collect()
    }

    fn corpus() -> ApiCorpus {
        ApiCorpus::new(
            "Shop",
            vec![
                EndpointRecord::new("e1", "Create Order", HttpMethod::Post, "/orders")
                    .with_folder("Orders")
                    .with_description("Places a new order for the current customer")
                    .with_request_body(r#"{ "sku": "string", "quantity": 1 }"#)
                    .with_response("201", "Created"),
                EndpointRecord::new("e2", "Get Order", HttpMethod::Get, "/orders/{orderId}")
                    .with_parameter("orderId", "Identifier of the order", ParameterLocation::Path)
                    .with_response("404", "Order not found"),
                EndpointRecord::new("e3", "List Products", HttpMethod::Get, "/products"),
            ],
        )
    }

    #[test]
    fn empty_corpus_defaults() {
        let index = build_index(&ApiCorpus::new("empty", Vec::new()));
        assert_eq!(index.doc_count(), 0);
        assert_eq!(index.avg_doc_len(), 1.0);
        assert_eq!(index.term_count(), 0);
    }

    #[test]
    fn name_terms_carry_name_weight() {
        let index = build_index(&corpus());
        let doc = &index.documents()[2];
        assert_eq!(doc.endpoint_id, "e3");
        // "list" appears only in the name.
        assert_eq!(doc.term_freq("list"), FieldWeights::default().name);
        assert_eq!(doc.term_fields["list"], vec![EndpointField::Name]);
    }

    #[test]
    fn path_segments_are_indexed_twice() {
        let index = build_index(&corpus());
        let doc = &index.documents()[2];
        // "product" comes from the name (3.0), the full path (2.5) and the segment (2.5).
        assert_eq!(doc.term_freq("product"), 3.0 + 2.5 + 2.5);
        assert_eq!(
            doc.term_fields["product"],
            vec![EndpointField::Name, EndpointField::Path]
        );
    }

    #[test]
    fn document_length_is_sum_of_weights() {
        let index = build_index(&corpus());
        for doc in index.documents() {
            let sum: f64 = doc.term_freqs.values().sum();
            assert!((doc.length - sum).abs() < 1e-9);
        }
        let avg = index.documents().iter().map(|d| d.length).sum::<f64>() / 3.0;
        assert!((index.avg_doc_len() - avg).abs() < 1e-9);
    }

    #[test]
    fn status_codes_are_terms() {
        let index = build_index(&corpus());
        assert!(index.documents()[1].term_freq("404") > 0.0);
        assert_eq!(
            index.documents()[1].term_fields["404"],
            vec![EndpointField::Response]
        );
    }

    #[test]
    fn idf_is_non_negative_and_rarer_is_higher() {
        let index = build_index(&corpus());
        for term in vocabulary(&index) {
            assert!(index.idf(term) >= 0.0, "negative idf for {term}");
        }
        // "order" is in two documents, "product" in one.
        assert!(index.idf("product") > index.idf("order"));
        assert_eq!(index.idf("missing"), 0.0);
    }

    #[test]
    fn idf_formula() {
        let expected = ((3.0 - 1.0 + 0.5) / (1.0 + 0.5) + 1.0_f64).ln();
        assert!((inverse_document_frequency(3, 1) - expected).abs() < 1e-12);
        assert!(inverse_document_frequency(3, 3) > 0.0);
    }

    #[test]
    fn fingerprint_tracks_title_count_and_first_id() {
        let base = corpus();
        let same = corpus();
        assert_eq!(Fingerprint::of(&base), Fingerprint::of(&same));

        let mut renamed = corpus();
        renamed.title = "Other".to_string();
        assert_ne!(Fingerprint::of(&base), Fingerprint::of(&renamed));

        let mut shorter = corpus();
        shorter.endpoints.pop();
        assert_ne!(Fingerprint::of(&base), Fingerprint::of(&shorter));

        let mut reordered = corpus();
        reordered.endpoints.swap(0, 1);
        assert_ne!(Fingerprint::of(&base), Fingerprint::of(&reordered));
    }

    #[test]
    fn fingerprint_ignores_later_documents() {
        let base = corpus();
        let mut edited = corpus();
        edited.endpoints[2].name = "Something else".to_string();
        assert_eq!(Fingerprint::of(&base), Fingerprint::of(&edited));
    }
}
