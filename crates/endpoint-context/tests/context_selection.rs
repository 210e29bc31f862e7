use endpoint_context::{
    analyze, search, ApiCorpus, ContextSelection, EndpointRecord, HttpMethod, IndexCache, Intent,
    KeywordFilter, MethodHint, RelevanceStrategy, SearchOptions,
};

fn user_corpus() -> ApiCorpus {
    ApiCorpus::new(
        "User Service",
        vec![
            EndpointRecord::new("get-user", "Get User", HttpMethod::Get, "/users/{id}")
                .with_folder("Users")
                .with_description("Fetch a single user by id")
                .with_response("200", "The user")
                .with_response("404", "User not found"),
            EndpointRecord::new("create-user", "Create User", HttpMethod::Post, "/users")
                .with_folder("Users")
                .with_description("Register a new user account")
                .with_request_body(r#"{ "email": "string", "name": "string" }"#)
                .with_response("201", "Created"),
            EndpointRecord::new("list-orders", "List Orders", HttpMethod::Get, "/orders")
                .with_folder("Orders")
                .with_description("All orders placed by the authenticated customer")
                .requiring_auth(),
        ],
    )
}

#[test]
fn create_user_ranks_post_above_get() {
    let corpus = user_corpus();
    let query = analyze("how do I create a user");
    assert_eq!(query.method_hint, MethodHint::Post);
    assert!(query.entity_terms.contains("user"));

    let cache = IndexCache::default();
    let index = cache.get_or_build(&corpus);

    let filtered = search(&index, &corpus.endpoints, &query, &SearchOptions::default());
    assert_eq!(filtered[0].endpoint.id, "create-user");

    let unfiltered = search(
        &index,
        &corpus.endpoints,
        &query,
        &SearchOptions {
            method_filter: Some(MethodHint::Any),
            ..SearchOptions::default()
        },
    );
    let position = |id: &str| unfiltered.iter().position(|r| r.endpoint.id == id);
    let post = position("create-user").expect("POST /users ranked");
    let get = position("get-user").expect("GET /users/{id} ranked");
    assert!(post < get);
    assert!(unfiltered[post].score > unfiltered[get].score);
}

#[test]
fn ranking_is_deterministic() {
    let corpus = user_corpus();
    let cache = IndexCache::default();
    let strategy = RelevanceStrategy::structured(&corpus, &cache);
    let summarize = |selection: ContextSelection<'_>| match selection {
        ContextSelection::Ranked { results, .. } => results
            .iter()
            .map(|r| (r.endpoint.id.clone(), r.score))
            .collect::<Vec<_>>(),
        ContextSelection::Filtered { .. } => unreachable!("structured strategy"),
    };
    let first = summarize(strategy.select("users and orders"));
    let second = summarize(strategy.select("users and orders"));
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn cache_is_shared_across_strategies_for_same_snapshot() {
    let corpus = user_corpus();
    let cache = IndexCache::new(2);
    let a = RelevanceStrategy::structured(&corpus, &cache);
    let b = RelevanceStrategy::Structured {
        corpus: &corpus,
        cache: &cache,
        options: SearchOptions {
            top_k: 1,
            ..SearchOptions::default()
        },
    };
    a.select("user");
    let selection = b.select("user");
    assert_eq!(cache.len(), 1);
    assert_eq!(selection.len(), 1);
}

#[test]
fn auth_question_prefers_protected_endpoint() {
    let corpus = user_corpus();
    let cache = IndexCache::default();
    let selection = RelevanceStrategy::structured(&corpus, &cache).select("what token do I need for orders");
    match selection {
        ContextSelection::Ranked { analysis, results, .. } => {
            assert_eq!(analysis.intent, Intent::UnderstandAuth);
            assert_eq!(results[0].endpoint.id, "list-orders");
        }
        ContextSelection::Filtered { .. } => unreachable!("structured strategy"),
    }
}

#[test]
fn rendered_fallback_keeps_header_and_note() {
    let mut text = String::from("# Big API\n\nVersion 3\n");
    for i in 0..60 {
        text.push_str(&format!("\n### POST /jobs/{i}\n\nQueues job {i}.\n"));
    }
    let out = KeywordFilter::default().filter(&text, "weather forecast");
    assert!(out.starts_with("# Big API\n\nVersion 3"));
    assert!(out.contains("Showing 30 of 60 endpoints"));
    assert_eq!(out.matches("### POST").count(), 30);
}
