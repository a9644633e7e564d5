pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::explain::handlers as explain;
use crate::guardrails::handlers as guardrails;
use crate::matching::handlers as matching;
use crate::recommendations::handlers as recommendations;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Guardrails
        .route(
            "/api/v1/tenants/:tenant_id/guardrails",
            get(guardrails::handle_get_guardrails),
        )
        .route(
            "/api/v1/tenants/:tenant_id/guardrails/recommendations",
            get(recommendations::handle_list_recommendations),
        )
        .route(
            "/api/v1/tenants/:tenant_id/guardrails/recommendations/:id",
            patch(recommendations::handle_update_recommendation),
        )
        // Decision pipeline
        .route(
            "/api/v1/tenants/:tenant_id/matches",
            post(matching::handle_run_match),
        )
        .route(
            "/api/v1/tenants/:tenant_id/explanations",
            post(explain::handle_explain),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::guardrails::{GuardrailsPreset, StaticGuardrailsResolver};
    use crate::modes::{StaticSystemModeReader, SystemMode};
    use crate::recommendations::{
        GuardrailRecommendationEngine, InMemoryRecommendationStore, InMemoryTelemetryReader,
    };

    fn test_state() -> AppState {
        let guardrails = Arc::new(StaticGuardrailsResolver::new(GuardrailsPreset::Balanced));
        let modes = Arc::new(
            StaticSystemModeReader::default().with_tenant("drill", SystemMode::FireDrill),
        );
        let recommendations = Arc::new(GuardrailRecommendationEngine::new(
            Arc::new(InMemoryTelemetryReader::default()),
            Arc::new(InMemoryRecommendationStore::new()),
            guardrails.clone(),
            modes.clone(),
        ));
        AppState {
            config: Config::default(),
            guardrails,
            modes,
            llm: None,
            recommendations,
        }
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1 << 20).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn job() -> Value {
        json!({
            "id": "job-1",
            "title": "Frontend Engineer",
            "location": "Austin, TX",
            "min_experience_years": 3,
            "skills": [
                {"name": "React", "required": true},
                {"name": "GraphQL", "required": true}
            ]
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(build_router(test_state()), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_guardrails_endpoint_returns_preset() {
        let (status, body) = send(
            build_router(test_state()),
            "GET",
            "/api/v1/tenants/t1/guardrails",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["guardrails"]["preset"], "balanced");
        assert_eq!(body["systemMode"], "production");
    }

    #[tokio::test]
    async fn test_match_pipeline_excludes_missing_must_haves() {
        let payload = json!({
            "job": job(),
            "candidates": [
                {
                    "id": "c-strong",
                    "location": "Remote",
                    "total_experience_years": 6,
                    "skills": [{"name": "react"}, {"name": "GraphQL"}]
                },
                {
                    "id": "c-gap",
                    "location": "Austin, TX",
                    "total_experience_years": 6,
                    "skills": [{"name": "React"}]
                }
            ]
        });
        let (status, body) = send(
            build_router(test_state()),
            "POST",
            "/api/v1/tenants/t1/matches",
            Some(payload),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["matches"].as_array().unwrap().len(), 1);
        assert_eq!(body["matches"][0]["candidate_id"], "c-strong");
        assert_eq!(body["matches"][0]["score"], 97);
        assert_eq!(body["confidence"][0]["band"], "HIGH");
        assert_eq!(body["shortlist"], json!(["c-strong"]));
    }

    #[tokio::test]
    async fn test_fire_drill_match_has_band_without_reasons() {
        let payload = json!({
            "job": job(),
            "candidates": [{
                "id": "c-strong",
                "location": "Austin, TX",
                "total_experience_years": 6,
                "skills": [{"name": "React"}, {"name": "GraphQL"}]
            }]
        });
        let (status, body) = send(
            build_router(test_state()),
            "POST",
            "/api/v1/tenants/drill/matches",
            Some(payload),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["confidence"][0]["band"], "HIGH");
        assert_eq!(body["confidence"][0]["reasons"], json!([]));
    }

    #[tokio::test]
    async fn test_explanation_endpoint() {
        let payload = json!({
            "job": job(),
            "candidate": {
                "id": "c-1",
                "location": "Austin, TX",
                "total_experience_years": 6,
                "skills": [{"name": "React"}, {"name": "GraphQL"}]
            },
            "candidate_name": "Grace Hopper"
        });
        let (status, body) = send(
            build_router(test_state()),
            "POST",
            "/api/v1/tenants/t1/explanations",
            Some(payload),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["match"]["score"], 100);
        assert_eq!(
            body["justification"]["subject"],
            "Grace Hopper for Frontend Engineer (match score 100)"
        );
        let strengths = body["explanation"]["strengths"].as_array().unwrap();
        assert!((2..=4).contains(&strengths.len()));
    }

    #[tokio::test]
    async fn test_recommendation_lifecycle() {
        let app = build_router(test_state());
        let (status, body) = send(
            app.clone(),
            "GET",
            "/api/v1/tenants/t1/guardrails/recommendations",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendations"][0]["id"], "no-action");

        let (status, body) = send(
            app.clone(),
            "PATCH",
            "/api/v1/tenants/t1/guardrails/recommendations/no-action",
            Some(json!({"status": "dismissed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendations"][0]["status"], "dismissed");

        let (_, body) = send(
            app.clone(),
            "GET",
            "/api/v1/tenants/t1/guardrails/recommendations",
            None,
        )
        .await;
        assert_eq!(body["recommendations"][0]["status"], "dismissed");

        let (status, body) = send(
            app,
            "PATCH",
            "/api/v1/tenants/t1/guardrails/recommendations/unknown",
            Some(json!({"status": "dismissed"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_fire_drill_rejects_apply() {
        let app = build_router(test_state());
        let (status, body) = send(
            app.clone(),
            "GET",
            "/api/v1/tenants/drill/guardrails/recommendations",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recommendations"], json!([]));

        let (status, body) = send(
            app,
            "PATCH",
            "/api/v1/tenants/drill/guardrails/recommendations/no-action",
            Some(json!({"status": "applied"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "AGENT_DISABLED");
    }

    #[tokio::test]
    async fn test_invalid_status_is_validation_error() {
        let (status, _) = send(
            build_router(test_state()),
            "PATCH",
            "/api/v1/tenants/t1/guardrails/recommendations/no-action",
            Some(json!({"status": "archived"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
