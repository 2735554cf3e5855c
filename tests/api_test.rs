//! End-to-end HTTP tests: router + auth middleware + real `SqliteStore`,
//! driven with `tower::ServiceExt::oneshot` rather than a bound socket.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use swarmd::adapters::completer::MockCompleter;
use swarmd::api::{build_router, AppState};
use swarmd::domain::models::{Capability, CredentialRegistry, Identity};
use swarmd::domain::ports::{ComponentCatalog, MCPGateway, NullComponentCatalog, ToolOutcome};
use swarmd::services::{EventBus, Planner, RoleRegistry, RoleVocabulary, ScopeExtractor, SwarmManager};

struct StubMcpGateway;

#[async_trait::async_trait]
impl MCPGateway for StubMcpGateway {
    async fn invoke(&self, tool_name: &str, args: Value, _swarm_id: Uuid, _agent_id: Option<Uuid>) -> ToolOutcome {
        ToolOutcome::ok(json!({ "tool": tool_name, "echo": args }))
    }
}

fn credential(name: &str, caps: &[Capability]) -> (String, Identity) {
    let token = format!("token-{name}");
    let capabilities: HashSet<Capability> = caps.iter().cloned().collect();
    (token, Identity { name: name.to_string(), capabilities })
}

async fn test_app() -> axum::Router {
    let ts = common::test_store().await;
    let completer = Arc::new(MockCompleter::new("not valid json"));
    let catalog: Arc<dyn ComponentCatalog> = Arc::new(NullComponentCatalog);
    let scope_extractor = ScopeExtractor::new(completer.clone(), catalog, vec![("frontend".to_string(), "react".to_string())]);
    let planner = Planner::new(completer);
    let role_registry = RoleRegistry::load(RoleVocabulary::Default);
    let swarm_manager = Arc::new(SwarmManager::new(
        ts.store.clone(),
        planner,
        scope_extractor,
        role_registry,
        EventBus::new(),
        3,
        3,
    ));

    let mut credentials = CredentialRegistry::new();
    let (token, identity) = credential("creator", &[Capability::SwarmCreate]);
    credentials.insert(token, identity);
    let (token, identity) = credential("viewer", &[Capability::SwarmMonitor]);
    credentials.insert(token, identity);
    let (token, identity) = credential("admin", &[Capability::AdminReadonly]);
    credentials.insert(token, identity);
    let (token, identity) = credential("github-tool", &[Capability::Mcp("github".to_string())]);
    credentials.insert(token, identity);

    let state = AppState {
        store: ts.store,
        swarm_manager,
        mcp_gateway: Arc::new(StubMcpGateway),
        credentials: Arc::new(credentials),
        started_at: std::time::Instant::now(),
        poll_interval_s: 10,
    };

    build_router(state)
}

fn create_swarm_body() -> Body {
    Body::from(
        json!({
            "project": "Recipe Box",
            "goal": "let people save recipes",
            "tech_stack": {"frontend": "react"},
            "features": ["search"],
            "num_agents": 2
        })
        .to_string(),
    )
}

#[tokio::test]
async fn request_without_bearer_token_is_unauthenticated() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/swarms")
                .header("content-type", "application/json")
                .body(create_swarm_body())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn credential_without_swarm_create_capability_is_forbidden() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/swarms")
                .header("content-type", "application/json")
                .header("authorization", "Bearer token-viewer")
                .body(create_swarm_body())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn authorized_credential_creates_a_swarm() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/swarms")
                .header("content-type", "application/json")
                .header("authorization", "Bearer token-creator")
                .body(create_swarm_body())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert!(value.get("swarm_id").is_some());
}

#[tokio::test]
async fn admin_readonly_credential_can_read_health() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/swarm/health")
                .header("authorization", "Bearer token-admin")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn tool_invocation_requires_the_namespaced_mcp_capability() {
    let app = test_app().await;
    let body = Body::from(json!({"args": {}, "swarm_id": Uuid::new_v4()}).to_string());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tools/slack")
                .header("content-type", "application/json")
                .header("authorization", "Bearer token-github-tool")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN, "credential only carries MCP_GITHUB");

    let body = Body::from(json!({"args": {"q": "issues"}, "swarm_id": Uuid::new_v4()}).to_string());
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tools/github")
                .header("content-type", "application/json")
                .header("authorization", "Bearer token-github-tool")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
