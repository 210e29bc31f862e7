//! Keyword filter over an already-rendered API description.
//!
//! Used when only flat markdown is available. The text is split into a
//! header and one block per endpoint heading (`### GET /path`). Blocks are
//! scored by plain substring hits of query keywords, and at most
//! `max_blocks` of them are kept. The caller never gets back less than it
//! needs: small or unrecognised inputs are returned unchanged, and a query
//! with no lexical overlap gets an evenly spaced sample instead of a prefix.
use std::collections::HashSet;

use tracing::debug;

pub const DEFAULT_MAX_BLOCKS: usize = 30;
pub const DEFAULT_HEADING_MARKER: &str = "### ";

/// Method tokens the markdown renderer writes after the heading marker.
const HEADING_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

const HEADING_HIT: u32 = 3;
const BODY_HIT: u32 = 1;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her", "was",
    "one", "our", "out", "has", "have", "how", "what", "when", "where", "which", "who", "why",
    "with", "this", "that", "from", "they", "will", "would", "there", "their", "does", "did",
    "about", "into", "your", "show", "tell", "give", "please", "want", "need", "endpoint",
    "endpoints", "api",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Few enough blocks (or none recognised); text returned as-is.
    PassThrough,
    /// Only blocks with a keyword hit were kept.
    Matched,
    /// No block matched; an evenly spaced sample was kept.
    Sampled,
}

#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub text: String,
    pub mode: FilterMode,
    pub total_blocks: usize,
    pub kept_blocks: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFilter {
    pub max_blocks: usize,
    pub heading_marker: String,
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self {
            max_blocks: DEFAULT_MAX_BLOCKS,
            heading_marker: DEFAULT_HEADING_MARKER.to_string(),
        }
    }
}

struct Segmented<'t> {
    header: Vec<&'t str>,
    blocks: Vec<Vec<&'t str>>,
}

impl KeywordFilter {
    pub fn filter(&self, rendered: &str, query: &str) -> String {
        self.apply(rendered, query).text
    }

    pub fn apply(&self, rendered: &str, query: &str) -> FilterOutcome {
        let max_blocks = self.max_blocks.max(1);
        let segmented = self.segment(rendered);
        let total = segmented.blocks.len();

        if total == 0 || total <= max_blocks {
            debug!(total_blocks = total, "keyword filter pass-through");
            return FilterOutcome {
                text: rendered.to_string(),
                mode: FilterMode::PassThrough,
                total_blocks: total,
                kept_blocks: total,
            };
        }

        let keywords = extract_keywords(query);
        let scores: Vec<u32> = segmented
            .blocks
            .iter()
            .map(|block| score_block(block, &keywords))
            .collect();

        let mut ranked: Vec<usize> = (0..total).collect();
        ranked.sort_by(|a, b| scores[*b].cmp(&scores[*a]));
        ranked.truncate(max_blocks);

        let (selected, mode) = if ranked.iter().any(|&i| scores[i] > 0) {
            let matched: Vec<usize> = ranked.into_iter().filter(|&i| scores[i] > 0).collect();
            (matched, FilterMode::Matched)
        } else {
            let stride = (total / max_blocks).max(1);
            let sampled: Vec<usize> = (0..total).step_by(stride).take(max_blocks).collect();
            (sampled, FilterMode::Sampled)
        };

        debug!(
            keywords = keywords.len(),
            total_blocks = total,
            kept_blocks = selected.len(),
            mode = ?mode,
            "keyword filter applied"
        );

        let note = match mode {
            FilterMode::Sampled => format!(
                "> Showing {} of {} endpoints, sampled evenly across the API because no endpoint matched the question directly.",
                selected.len(),
                total
            ),
            _ => format!(
                "> Showing {} of {} endpoints, selected by relevance to the question. Ask about a specific endpoint to see others.",
                selected.len(),
                total
            ),
        };

        let mut parts: Vec<String> = Vec::with_capacity(selected.len() + 2);
        let header = segmented.header.join("\n");
        let header = header.trim_end();
        if !header.trim().is_empty() {
            parts.push(header.to_string());
        }
        parts.push(note);
        for &i in &selected {
            parts.push(segmented.blocks[i].join("\n").trim_end().to_string());
        }

        FilterOutcome {
            text: parts.join("\n\n"),
            mode,
            total_blocks: total,
            kept_blocks: selected.len(),
        }
    }

    /// Number of endpoint blocks the text splits into.
    pub fn count_blocks(&self, rendered: &str) -> usize {
        self.segment(rendered).blocks.len()
    }

    fn segment<'t>(&self, rendered: &'t str) -> Segmented<'t> {
        let mut header = Vec::new();
        let mut blocks: Vec<Vec<&'t str>> = Vec::new();
        for line in rendered.lines() {
            if self.is_endpoint_heading(line) {
                blocks.push(vec![line]);
            } else if let Some(block) = blocks.last_mut() {
                block.push(line);
            } else {
                header.push(line);
            }
        }
        Segmented { header, blocks }
    }

    fn is_endpoint_heading(&self, line: &str) -> bool {
        line.strip_prefix(self.heading_marker.as_str())
            .and_then(|rest| rest.split_whitespace().next())
            .is_some_and(|token| HEADING_METHODS.contains(&token))
    }
}

/// Filter `rendered` with the default block ceiling and heading marker.
pub fn filter_rendered(rendered: &str, query: &str) -> String {
    KeywordFilter::default().filter(rendered, query)
}

fn extract_keywords(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    query
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || matches!(c, '/' | '-' | '_')))
        .filter(|word| word.chars().count() > 2)
        .filter(|word| !STOPWORDS.contains(word))
        .filter(|word| seen.insert(word.to_string()))
        .map(str::to_string)
        .collect()
}

fn score_block(block: &[&str], keywords: &[String]) -> u32 {
    let Some((heading, rest)) = block.split_first() else {
        return 0;
    };
    let heading = heading.to_lowercase();
    let body = rest.join("\n").to_lowercase();
    keywords
        .iter()
        .map(|keyword| {
            let mut points = 0;
            if heading.contains(keyword.as_str()) {
                points += HEADING_HIT;
            }
            if body.contains(keyword.as_str()) {
                points += BODY_HIT;
            }
            points
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "# Inventory API\n\nBase URL: https://inventory.example.com\n";

    fn rendered(blocks: &[String]) -> String {
        let mut out = HEADER.to_string();
        for block in blocks {
            out.push('\n');
            out.push_str(block);
            out.push('\n');
        }
        out
    }

    fn resource_block(i: usize) -> String {
        format!("### GET /resource{i}\n\nFetches resource number {i}.")
    }

    fn headings(text: &str) -> Vec<&str> {
        text.lines().filter(|l| l.starts_with("### ")).collect()
    }

    #[test]
    fn small_corpus_passes_through() {
        let blocks: Vec<String> = (0..30).map(resource_block).collect();
        let text = rendered(&blocks);
        let outcome = KeywordFilter::default().apply(&text, "zebra migration patterns");
        assert_eq!(outcome.mode, FilterMode::PassThrough);
        assert_eq!(outcome.text, text);
        assert_eq!(outcome.total_blocks, 30);
    }

    #[test]
    fn unrecognised_structure_passes_through() {
        let text = "Just some notes\n## GET is not a heading here\n### Overview\n".repeat(50);
        assert_eq!(filter_rendered(&text, "overview"), text);
    }

    #[test]
    fn only_method_headings_split_blocks() {
        let text = "# API\n### Overview\nintro\n### GET /a\nbody a\n### Notes\nstill a\n### POST /b\nbody b";
        let filter = KeywordFilter::default();
        let segmented = filter.segment(text);
        assert_eq!(segmented.header, vec!["# API", "### Overview", "intro"]);
        assert_eq!(segmented.blocks.len(), 2);
        assert_eq!(segmented.blocks[0], vec!["### GET /a", "body a", "### Notes", "still a"]);
        assert_eq!(filter.count_blocks(text), 2);
    }

    #[test]
    fn no_overlap_samples_evenly() {
        let blocks: Vec<String> = (0..90).map(resource_block).collect();
        let text = rendered(&blocks);
        let outcome = KeywordFilter::default().apply(&text, "zebra migration patterns");

        assert_eq!(outcome.mode, FilterMode::Sampled);
        assert_eq!(outcome.kept_blocks, 30);
        let expected: Vec<String> = (0..30).map(|i| format!("### GET /resource{}", i * 3)).collect();
        assert_eq!(headings(&outcome.text), expected);
        assert!(outcome.text.starts_with("# Inventory API"));
        assert!(outcome.text.contains("Showing 30 of 90 endpoints"));
    }

    #[test]
    fn matched_blocks_ranked_and_trimmed() {
        let mut blocks: Vec<String> = (0..40).map(resource_block).collect();
        blocks[5] = "### GET /invoices\n\nLists invoices for the account.".to_string();
        blocks[17] = "### POST /payments\n\nPays one of the open invoices.".to_string();
        let text = rendered(&blocks);

        let outcome = KeywordFilter::default().apply(&text, "Show me invoices, please");
        assert_eq!(outcome.mode, FilterMode::Matched);
        assert_eq!(headings(&outcome.text), vec!["### GET /invoices", "### POST /payments"]);
        assert!(outcome.text.contains("Showing 2 of 40 endpoints"));
        assert!(outcome.text.starts_with(HEADER.trim_end()));
    }

    #[test]
    fn heading_hits_outweigh_body_hits() {
        let block = ["### GET /orders", "", "Returns orders."];
        let body_only = ["### GET /carts", "", "Mentions orders once."];
        let keywords = extract_keywords("orders");
        assert_eq!(score_block(&block, &keywords), HEADING_HIT + BODY_HIT);
        assert_eq!(score_block(&body_only, &keywords), BODY_HIT);
    }

    #[test]
    fn keyword_extraction() {
        assert_eq!(
            extract_keywords("How do I list the users, and update a user?"),
            vec!["list", "users", "update", "user"]
        );
    }

    #[test]
    fn custom_ceiling() {
        let filter = KeywordFilter {
            max_blocks: 4,
            ..KeywordFilter::default()
        };
        let blocks: Vec<String> = (0..12).map(resource_block).collect();
        let outcome = filter.apply(&rendered(&blocks), "nothing relevant");
        assert_eq!(outcome.kept_blocks, 4);
        let expected: Vec<String> = [0, 3, 6, 9]
            .iter()
            .map(|i| format!("### GET /resource{i}"))
            .collect();
        assert_eq!(headings(&outcome.text), expected);
    }
}
