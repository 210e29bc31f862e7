//! Lexical query analysis: raw chat text → intent, method/status/path hints,
//! keywords and entity terms.
//!
//! `analyze` is pure and total. Empty or junk input yields intent `general`
//! with empty keyword and entity lists.
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::MethodHint;

const MAX_KEYWORDS: usize = 10;

static EXPLICIT_METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(get|post|put|patch|delete)\s*/").expect("valid regex")
});
static STATUS_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([1-5][0-9]{2})\b").expect("valid regex"));
static ENDPOINT_HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:^|[\s`'"(])(/[\w{:][\w\-{}:./]*)"#).expect("valid regex")
});
static AUTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(auth|authentication|authenticate|authorization|authorize|login|log in|sign in|token|tokens|api key|api keys|apikey|oauth|oauth2|bearer|jwt|credential|credentials)\b",
    )
    .expect("valid regex")
});
static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(code|snippet|snippets|implement|implementation|sdk|curl|javascript|typescript|python|java|golang|rust|axios|generate|write a|write me)\b",
    )
    .expect("valid regex")
});
static SCHEMA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(schema|schemas|structure|field|fields|model|models|shape|payload|body|properties|property|format|type|types)\b",
    )
    .expect("valid regex")
});
static COMPARE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(vs|versus|difference|differences|differ|compare|comparing|comparison)\b")
        .expect("valid regex")
});
static RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(run|execute|call|try|invoke|send|hit)\b").expect("valid regex")
});

const GLOBAL_PHRASES: &[&str] = &[
    "all endpoints",
    "all the endpoints",
    "every endpoint",
    "list endpoints",
    "list all",
    "how many endpoints",
    "what endpoints",
    "which endpoints",
    "available endpoints",
    "summarize",
    "summarise",
    "summary",
    "overview",
    "entire api",
    "whole api",
    "what can this api do",
];

const VERB_METHODS: &[(&str, MethodHint)] = &[
    ("create", MethodHint::Post),
    ("add", MethodHint::Post),
    ("new", MethodHint::Post),
    ("submit", MethodHint::Post),
    ("register", MethodHint::Post),
    ("insert", MethodHint::Post),
    ("post", MethodHint::Post),
    ("get", MethodHint::Get),
    ("fetch", MethodHint::Get),
    ("retrieve", MethodHint::Get),
    ("read", MethodHint::Get),
    ("list", MethodHint::Get),
    ("show", MethodHint::Get),
    ("find", MethodHint::Get),
    ("search", MethodHint::Get),
    ("lookup", MethodHint::Get),
    ("update", MethodHint::Put),
    ("replace", MethodHint::Put),
    ("modify", MethodHint::Put),
    ("edit", MethodHint::Put),
    ("put", MethodHint::Put),
    ("patch", MethodHint::Patch),
    ("partial", MethodHint::Patch),
    ("partially", MethodHint::Patch),
    ("delete", MethodHint::Delete),
    ("remove", MethodHint::Delete),
    ("destroy", MethodHint::Delete),
    ("erase", MethodHint::Delete),
];

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "then", "else", "of", "to", "in", "on", "at",
    "by", "for", "with", "from", "into", "about", "as", "is", "are", "was", "were", "be",
    "been", "being", "do", "does", "did", "done", "have", "has", "had", "can", "could",
    "should", "would", "will", "shall", "may", "might", "must", "i", "me", "my", "we", "our",
    "you", "your", "it", "its", "this", "that", "these", "those", "there", "here", "what",
    "which", "who", "whom", "how", "why", "when", "where", "all", "any", "some", "each",
    "every", "no", "not", "so", "too", "very", "just", "also", "please", "tell", "explain",
    "show", "give", "need", "want", "use", "using", "like", "get", "api", "endpoint",
    "endpoints", "them", "they", "us",
];

const ENTITY_VOCABULARY: &[&str] = &[
    "user", "account", "profile", "customer", "member", "team", "organization", "org",
    "group", "role", "permission", "session", "token", "credential", "key", "order",
    "product", "item", "cart", "checkout", "payment", "invoice", "subscription", "plan",
    "price", "refund", "charge", "card", "wallet", "transaction", "balance", "shipment",
    "address", "inventory", "store", "pet", "category", "tag", "review", "comment",
    "message", "notification", "webhook", "event", "file", "upload", "image", "document",
    "attachment", "project", "task", "ticket", "issue", "repository", "repo", "branch",
    "commit", "workspace", "channel", "report", "metric", "log", "job", "setting", "config",
    "device", "booking", "reservation", "article", "contact", "lead", "campaign",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    FindEndpoint,
    UnderstandAuth,
    UnderstandSchema,
    RunRequest,
    DebugError,
    GenerateCode,
    CompareEndpoints,
    ListEndpoints,
    General,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FindEndpoint => "find_endpoint",
            Self::UnderstandAuth => "understand_auth",
            Self::UnderstandSchema => "understand_schema",
            Self::RunRequest => "run_request",
            Self::DebugError => "debug_error",
            Self::GenerateCode => "generate_code",
            Self::CompareEndpoints => "compare_endpoints",
            Self::ListEndpoints => "list_endpoints",
            Self::General => "general",
        }
    }

    /// Intents that usually concern one concrete endpoint.
    fn targets_single_endpoint(self) -> bool {
        matches!(self, Self::FindEndpoint | Self::RunRequest | Self::GenerateCode)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedQuery {
    pub original: String,
    pub normalized: String,
    pub intent: Intent,
    pub method_hint: MethodHint,
    /// Up to ten distinct tokens, longest first.
    pub keywords: Vec<String>,
    pub entity_terms: BTreeSet<String>,
    pub status_code_hint: Option<u16>,
    pub endpoint_hint: Option<String>,
    pub is_global_query: bool,
    pub is_single_endpoint_query: bool,
}

pub fn analyze(text: &str) -> AnalyzedQuery {
    let normalized = normalize(text);

    let is_global_query = GLOBAL_PHRASES.iter().any(|p| normalized.contains(p));
    let method_hint = detect_method(text, &normalized);
    let status_code_hint = detect_status_code(&normalized);
    let endpoint_hint = detect_endpoint_hint(text);
    let keywords = extract_keywords(&normalized);
    let entity_terms = extract_entities(&keywords, endpoint_hint.as_deref());

    let intent = classify(
        &normalized,
        status_code_hint,
        is_global_query,
        method_hint,
        &entity_terms,
    );
    let is_single_endpoint_query = intent.targets_single_endpoint() && endpoint_hint.is_some();

    AnalyzedQuery {
        original: text.to_string(),
        normalized,
        intent,
        method_hint,
        keywords,
        entity_terms,
        status_code_hint,
        endpoint_hint,
        is_global_query,
        is_single_endpoint_query,
    }
}

/// Lowercase, blank out everything but alphanumerics, whitespace and `/-.`,
/// collapse whitespace.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || matches!(c, '/' | '-' | '.') {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn detect_method(original: &str, normalized: &str) -> MethodHint {
    if let Some(caps) = EXPLICIT_METHOD_RE.captures(original) {
        if let Ok(hint) = caps[1].parse::<MethodHint>() {
            return hint;
        }
    }
    normalized
        .split_whitespace()
        .find_map(|word| {
            VERB_METHODS
                .iter()
                .find(|(verb, _)| *verb == word)
                .map(|(_, method)| *method)
        })
        .unwrap_or(MethodHint::Any)
}

fn detect_status_code(normalized: &str) -> Option<u16> {
    STATUS_CODE_RE
        .captures(normalized)
        .and_then(|caps| caps[1].parse::<u16>().ok())
}

fn detect_endpoint_hint(original: &str) -> Option<String> {
    ENDPOINT_HINT_RE.captures(original).map(|caps| {
        caps[1]
            .trim_end_matches(|c: char| matches!(c, '.' | ':' | '-'))
            .to_string()
    })
}

fn extract_keywords(normalized: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keywords: Vec<String> = normalized
        .split_whitespace()
        .filter(|word| word.chars().count() >= 2)
        .filter(|word| !STOPWORDS.contains(word))
        .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
        .filter(|word| seen.insert(*word))
        .map(str::to_string)
        .collect();
    // Stable sort keeps first-occurrence order among equal lengths.
    keywords.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    keywords.truncate(MAX_KEYWORDS);
    keywords
}

fn extract_entities(keywords: &[String], endpoint_hint: Option<&str>) -> BTreeSet<String> {
    let mut entities = BTreeSet::new();
    for keyword in keywords {
        if ENTITY_VOCABULARY.contains(&keyword.as_str()) {
            entities.insert(keyword.clone());
        } else if let Some(singular) = keyword.strip_suffix('s') {
            if ENTITY_VOCABULARY.contains(&singular) {
                entities.insert(singular.to_string());
            }
        }
    }
    if let Some(hint) = endpoint_hint {
        for segment in hint.split('/') {
            let segment = segment.trim();
            if segment.is_empty() || (segment.starts_with('{') && segment.ends_with('}')) {
                continue;
            }
            entities.insert(segment.to_lowercase());
        }
    }
    entities
}

fn classify(
    normalized: &str,
    status_code_hint: Option<u16>,
    is_global_query: bool,
    method_hint: MethodHint,
    entity_terms: &BTreeSet<String>,
) -> Intent {
    if AUTH_RE.is_match(normalized) {
        Intent::UnderstandAuth
    } else if status_code_hint.is_some() {
        Intent::DebugError
    } else if CODE_RE.is_match(normalized) {
        Intent::GenerateCode
    } else if is_global_query {
        Intent::ListEndpoints
    } else if !method_hint.is_any() && !entity_terms.is_empty() {
        Intent::FindEndpoint
    } else if SCHEMA_RE.is_match(normalized) {
        Intent::UnderstandSchema
    } else if COMPARE_RE.is_match(normalized) {
        Intent::CompareEndpoints
    } else if RUN_RE.is_match(normalized) {
        Intent::RunRequest
    } else {
        Intent::General
    }
}
