use endpoint_context::tokenize::{is_status_code, tokenize};
use endpoint_context::{analyze, build_index, search, ApiCorpus, EndpointRecord, HttpMethod, MethodHint, SearchOptions};
use proptest::prelude::*;

const SEPARATORS: &[char] = &['/', '-', '_', '.', '{', '}', '[', ']', '(', ')'];

fn corpus() -> ApiCorpus {
    ApiCorpus::new(
        "Shop",
        vec![
            EndpointRecord::new("u1", "Get User", HttpMethod::Get, "/users/{id}"),
            EndpointRecord::new("u2", "Create User", HttpMethod::Post, "/users"),
            EndpointRecord::new("o1", "List Orders", HttpMethod::Get, "/orders")
                .with_description("Orders placed by a customer"),
            EndpointRecord::new("o2", "Cancel Order", HttpMethod::Delete, "/orders/{id}")
                .with_response("404", "Order not found"),
        ],
    )
}

proptest! {
    #[test]
    fn analysis_is_pure(s in ".{0,120}") {
        prop_assert_eq!(analyze(&s), analyze(&s));
    }

    #[test]
    fn explicit_post_overrides_verbs(prefix in "[a-z ]{0,40}", path in "[a-z]{1,12}") {
        let query = format!("{prefix} POST /{path}");
        prop_assert_eq!(analyze(&query).method_hint, MethodHint::Post);
    }

    #[test]
    fn keywords_are_bounded_and_lowercase(s in "[A-Za-z ]{0,200}") {
        let analysis = analyze(&s);
        prop_assert!(analysis.keywords.len() <= 10);
        for keyword in &analysis.keywords {
            prop_assert_eq!(keyword, &keyword.to_lowercase());
        }
    }

    #[test]
    fn tokens_are_clean(s in "[A-Za-z0-9 /_.{}-]{0,80}") {
        for token in tokenize(&s) {
            prop_assert!(token.chars().count() >= 2, "short token {} kept", token);
            prop_assert!(!token.chars().any(|c| c.is_whitespace() || SEPARATORS.contains(&c)));
            prop_assert_eq!(&token, &token.to_lowercase());
            if token.chars().all(|c| c.is_ascii_digit()) {
                prop_assert!(is_status_code(&token), "numeric token {} kept", token);
            }
        }
    }

    #[test]
    fn tokenizing_ignores_ascii_case(s in "[A-Za-z /_-]{0,80}") {
        prop_assert_eq!(tokenize(&s), tokenize(&s.to_uppercase()));
    }

    #[test]
    fn search_is_sorted_and_bounded(q in "[a-z ]{0,60}", top_k in 1usize..6) {
        let corpus = corpus();
        let index = build_index(&corpus);
        let options = SearchOptions { top_k, ..SearchOptions::default() };
        let results = search(&index, &corpus.endpoints, &analyze(&q), &options);
        prop_assert!(results.len() <= top_k);
        for pair in results.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
        for result in &results {
            prop_assert!(result.score >= options.min_score);
        }
    }
}
