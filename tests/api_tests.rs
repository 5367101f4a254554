// tests/api_tests.rs

use std::sync::Arc;

use copydesk::{
    ContentPolicy, config::Config, models::policy::PolicyRules, routes, state::AppState,
};

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app() -> String {
    spawn_app_with_rules(PolicyRules::default()).await
}

async fn spawn_app_with_rules(rules: PolicyRules) -> String {
    // 1. Create test configuration and state
    let config = Config {
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_dir: "logs".to_string(),
        policy_rules_path: None,
        max_description_chars: 10_000,
    };
    let policy = ContentPolicy::new(rules).expect("Failed to build content policy");
    let state = AppState {
        policy: Arc::new(policy),
        config,
    };

    // 2. Create the router with the app state
    let app = routes::create_router(state);

    // 3. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 4. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn post(address: &str, path: &str, body: serde_json::Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(&format!("{}{}", address, path))
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn health_works() {
    let address = spawn_app().await;

    let response = reqwest::get(&format!("{}/api/health", address))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn sanitize_strips_scripts() {
    // Arrange
    let address = spawn_app().await;

    // Act
    let response = post(
        &address,
        "/api/sanitize",
        serde_json::json!({ "html": "<p>Safe</p><script>alert(1)</script>" }),
    )
    .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["html"], "<p>Safe</p>");
}

#[tokio::test]
async fn sanitize_treats_non_strings_as_empty() {
    let address = spawn_app().await;

    for html in [serde_json::json!(null), serde_json::json!(17), serde_json::json!(["<b>"])] {
        let response = post(&address, "/api/sanitize", serde_json::json!({ "html": html })).await;

        assert_eq!(response.status().as_u16(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["html"], "");
    }
}

#[tokio::test]
async fn compliance_reports_keywords_and_patterns() {
    // Arrange
    let address = spawn_app().await;

    // Act
    let response = post(
        &address,
        "/api/compliance",
        serde_json::json!({ "shortText": "Guaranteed savings! Act now!", "longText": "" }),
    )
    .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["hasIssues"], true);

    let warnings: Vec<String> = serde_json::from_value(body["warnings"].clone()).unwrap();
    assert!(warnings.iter().any(|w| w.contains("\"guarantee\"")));
    assert!(warnings.iter().any(|w| w.to_lowercase().contains("act now")));
}

#[tokio::test]
async fn disclaimer_endpoints_round_trip() {
    let address = spawn_app().await;

    // Check
    let response = post(
        &address,
        "/api/disclaimer/check",
        serde_json::json!({ "text": "Terms and conditions apply." }),
    )
    .await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["hasDisclaimer"], true);

    // Ensure once
    let response = post(
        &address,
        "/api/disclaimer/ensure",
        serde_json::json!({ "text": "<p>Coverage info.</p>" }),
    )
    .await;
    let first: serde_json::Value = response.json().await.unwrap();
    let text = first["text"].as_str().unwrap().to_string();
    assert!(text.starts_with("<p>Coverage info.</p>"));
    assert!(text.contains("<p><em style=\"font-size: smaller\">"));

    // Ensure again: unchanged
    let response = post(&address, "/api/disclaimer/ensure", serde_json::json!({ "text": text })).await;
    let second: serde_json::Value = response.json().await.unwrap();
    assert_eq!(second["text"], first["text"]);
}

#[tokio::test]
async fn enhancement_review_runs_full_pipeline() {
    // Arrange
    let address = spawn_app().await;

    // Act
    let response = post(
        &address,
        "/api/review/enhancement",
        serde_json::json!({
            "shortDescription": "The best roadside plan",
            "longDescription": "<div><p style=\"color:red;font-size:12px\" onclick=\"x()\">Tow up to 50 miles.</p></div><iframe src=\"https://evil.test\"></iframe>"
        }),
    )
    .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    let long = body["longDescription"].as_str().unwrap();
    assert!(long.starts_with("<p style=\"font-size: 12px\">Tow up to 50 miles.</p>\n\n"));
    assert!(!long.contains("iframe"));
    assert!(!long.contains("onclick"));
    assert!(long.contains("for informational purposes only"));

    assert_eq!(body["shortDescription"], "The best roadside plan");
    assert_eq!(body["hasComplianceIssues"], true);
    assert_eq!(
        body["complianceWarnings"],
        serde_json::json!(["Contains \"best\" - this language may require legal review."])
    );
    assert!(body.get("confidence").is_none());
    assert!(body.get("lowConfidence").is_none());
}

#[tokio::test]
async fn enhancement_review_rejects_html_short_description() {
    let address = spawn_app().await;

    let response = post(
        &address,
        "/api/review/enhancement",
        serde_json::json!({ "shortDescription": "<b>Bold</b>", "longDescription": "x" }),
    )
    .await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn extraction_review_flags_low_confidence() {
    let address = spawn_app().await;

    let response = post(
        &address,
        "/api/review/extraction",
        serde_json::json!({
            "shortDescription": "Home coverage",
            "longDescription": "<p>Covers fire and theft.</p>",
            "confidence": 0.65
        }),
    )
    .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["confidence"], 0.65);
    assert_eq!(body["lowConfidence"], true);
    assert_eq!(body["hasComplianceIssues"], false);

    let response = post(
        &address,
        "/api/review/extraction",
        serde_json::json!({ "shortDescription": "Home", "longDescription": "", "confidence": 0.8 }),
    )
    .await;
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["lowConfidence"], false);
}

#[tokio::test]
async fn extraction_review_rejects_out_of_range_confidence() {
    let address = spawn_app().await;

    let response = post(
        &address,
        "/api/review/extraction",
        serde_json::json!({ "shortDescription": "x", "longDescription": "y", "confidence": 1.5 }),
    )
    .await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn custom_rules_are_served_and_applied() {
    // Arrange
    let mut rules = PolicyRules::default();
    rules.prohibited_keywords = vec![copydesk::models::policy::KeywordRule {
        label: "free".to_string(),
        pattern: None,
    }];
    rules.manipulative_patterns.clear();
    let address = spawn_app_with_rules(rules.clone()).await;

    // Act
    let served: PolicyRules = reqwest::get(&format!("{}/api/policy/rules", address))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let response = post(
        &address,
        "/api/compliance",
        serde_json::json!({ "shortText": "Always free, guaranteed!!", "longText": null }),
    )
    .await;

    // Assert
    assert_eq!(served, rules);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["warnings"],
        serde_json::json!(["Contains \"free\" - this language may require legal review."])
    );
}
