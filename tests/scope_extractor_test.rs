//! Integration tests for `ScopeExtractor::extract` against a `MockCompleter`,
//! covering the three outcomes SPEC_FULL.md §8 names: clarification, a
//! successfully parsed scope, and the deterministic fallback.

use std::sync::Arc;

use swarmd::adapters::completer::MockCompleter;
use swarmd::domain::models::ExtractionOutcome;
use swarmd::domain::ports::NullComponentCatalog;
use swarmd::services::ScopeExtractor;

fn extractor(completer: MockCompleter) -> ScopeExtractor {
    ScopeExtractor::new(
        Arc::new(completer),
        Arc::new(NullComponentCatalog),
        vec![("frontend".to_string(), "react".to_string())],
    )
}

#[tokio::test]
async fn vague_message_asks_for_clarification_without_calling_completer_for_extraction() {
    let completer = MockCompleter::new("Could you tell me more about what you want to build?");
    let extractor = extractor(completer);

    match extractor.extract("hey").await {
        ExtractionOutcome::ClarificationNeeded(message) => {
            assert!(!message.trim().is_empty());
        }
        ExtractionOutcome::Scoped(_) => panic!("a short vague message should ask for clarification"),
    }
}

#[tokio::test]
async fn well_formed_completer_output_produces_a_scoped_result() {
    let json = r#"{"project":"Recipe Box","goal":"let people save and share recipes","tech_stack":{"frontend":"react"},"features":["recipe search"],"timeline":"2 weeks","outcome":"MVP","scope_of_works":{"in_scope":["search"],"out_scope":[],"milestones":[],"risks":[],"kpis":[]}}"#;
    let completer = MockCompleter::new("unused default").with_response("Extract a structured project scope", json);
    let extractor = extractor(completer);

    match extractor.extract("I want to build a recipe sharing app with search").await {
        ExtractionOutcome::Scoped(scope) => {
            assert_eq!(scope.project, "Recipe Box");
            assert_eq!(scope.features, vec!["recipe search".to_string()]);
        }
        ExtractionOutcome::ClarificationNeeded(_) => panic!("a descriptive message should not ask for clarification"),
    }
}

#[tokio::test]
async fn unparseable_completer_output_falls_back_to_deterministic_scope() {
    let completer = MockCompleter::new("I'm not going to give you JSON today");
    let extractor = extractor(completer);

    match extractor.extract("I want to build a recipe sharing app with search").await {
        ExtractionOutcome::Scoped(scope) => {
            assert_eq!(scope.project, "UserProject", "fallback scope is used when parsing fails");
        }
        ExtractionOutcome::ClarificationNeeded(_) => panic!("fallback path never asks for clarification"),
    }
}
