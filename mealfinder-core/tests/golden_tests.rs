//! Golden file tests for recipe normalization.
//!
//! Each JSON file in `fixtures/` holds a provider `lookup.php` payload and the
//! recipe it must normalize to. The payload goes through the real provider
//! client (over a mock transport) and the recommender's lookup.

use mealfinder_core::{Language, MealDbProvider, MockClient, NormalizedRecipe, Recommender};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;

const BASE: &str = "http://mealdb.test/api";

/// A test case loaded from a JSON fixture file
#[derive(Debug, Deserialize)]
struct TestCase {
    /// Raw provider response body
    payload: Value,
    /// Expected normalized recipe
    expected: NormalizedRecipe,
}

/// Load all test cases from the fixtures directory
fn load_test_cases() -> Vec<(String, TestCase)> {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");

    let mut cases = Vec::new();

    for entry in fs::read_dir(&fixtures_dir).expect("Failed to read fixtures directory") {
        let entry = entry.expect("Failed to read directory entry");
        let path = entry.path();

        if path.extension().map(|e| e == "json").unwrap_or(false) {
            let name = path.file_stem().unwrap().to_string_lossy().into_owned();
            let content = fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
            let case: TestCase = serde_json::from_str(&content)
                .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));
            cases.push((name, case));
        }
    }

    assert!(
        !cases.is_empty(),
        "No test fixtures found in {:?}",
        fixtures_dir
    );
    cases.sort_by(|a, b| a.0.cmp(&b.0));
    cases
}

#[tokio::test]
async fn test_normalization_golden_files() {
    for (name, case) in load_test_cases() {
        println!("Testing: {}", name);

        let id = &case.expected.id;
        let client = MockClient::new().with_body(
            &format!("{}/lookup.php?i={}", BASE, id),
            &case.payload.to_string(),
        );
        let recommender =
            Recommender::builder(Arc::new(MealDbProvider::new(client, BASE))).build();

        let recipe = recommender
            .lookup(id, &Language::source())
            .await
            .unwrap_or_else(|e| panic!("[{}] lookup failed: {}", name, e))
            .unwrap_or_else(|| panic!("[{}] lookup returned no recipe", name));

        assert_eq!(recipe, case.expected, "[{}] normalized recipe mismatch", name);
    }
}

#[tokio::test]
async fn test_golden_output_is_stable() {
    for (name, case) in load_test_cases() {
        let id = &case.expected.id;
        let client = MockClient::new().with_body(
            &format!("{}/lookup.php?i={}", BASE, id),
            &case.payload.to_string(),
        );
        let recommender =
            Recommender::builder(Arc::new(MealDbProvider::new(client, BASE))).build();

        let first = recommender.lookup(id, &Language::source()).await.unwrap();
        let second = recommender.lookup(id, &Language::source()).await.unwrap();

        assert_eq!(first, second, "[{}] normalization is not deterministic", name);
    }
}
