pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::projects::handlers as projects;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Projects and roster
        .route(
            "/api/v1/projects",
            post(projects::handle_create_project).get(projects::handle_list_projects),
        )
        .route("/api/v1/projects/:id", get(projects::handle_get_project))
        .route("/api/v1/projects/:id/rfp", post(projects::handle_upload_rfp))
        .route(
            "/api/v1/projects/:id/members",
            post(projects::handle_add_member).get(projects::handle_list_members),
        )
        // Team-fit analysis
        .route(
            "/api/v1/projects/:id/analyze",
            post(analysis::handle_analyze_project),
        )
        .route(
            "/api/v1/projects/:id/analyses",
            get(analysis::handle_list_analyses),
        )
        .route("/api/v1/team-fit/preview", post(analysis::handle_preview))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use aws_sdk_s3::config::{BehaviorVersion, Region};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::analysis::narrative::FallbackNarrativeGenerator;
    use crate::config::Config;

    // The pool is lazy and the S3 client never sends; only routes that stay off both are hit.
    fn offline_state() -> AppState {
        let config = Config {
            database_url: "postgres://localhost/teamfit_test".to_string(),
            s3_bucket: "teamfit-test".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            anthropic_api_key: None,
            port: 0,
            rust_log: "info".to_string(),
            narrative_timeout_secs: 5,
        };
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let s3 = aws_sdk_s3::Client::from_conf(
            aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .region(Region::new("us-east-1"))
                .build(),
        );
        AppState {
            db,
            s3,
            config,
            narrative: Arc::new(FallbackNarrativeGenerator),
        }
    }

    async fn post_json(uri: &str, body: Value) -> (StatusCode, Value) {
        let response = build_router(offline_state())
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_route() {
        let response = build_router(offline_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_preview_runs_full_pipeline() {
        let (status, body) = post_json(
            "/api/v1/team-fit/preview",
            json!({
                "project_name": "AI 도입 컨설팅",
                "requirements": ["AI 전략", "재무 모델링"],
                "members": [
                    { "name": "김민수", "role": "PM", "mbti": "ENFP", "skills_extracted": "Python, AI 모델링" },
                    { "name": "이서연", "role": "컨설턴트", "mbti": "INTJ", "skills_extracted": "조직 설계" }
                ],
                "seed": 42
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["chemistry_score"], 90);
        assert_eq!(body["domain_coverage"], 50);
        assert_eq!(body["narrative_score"], 80);
        assert_eq!(body["narrative_source"], "fallback");
        assert_eq!(body["covered_requirements"], json!(["AI 전략"]));
        assert_eq!(body["missing_requirements"], json!(["재무 모델링"]));
        assert_eq!(body["visualization"]["network"]["edges"][0]["compatibility"], 0.9);
    }

    #[tokio::test]
    async fn test_preview_is_reproducible_with_seed() {
        let request = json!({
            "rfp_text": "클라우드 전환 및 데이터 플랫폼 구축",
            "members": [
                { "name": "A", "mbti": "ESTJ", "skills_extracted": "AWS" },
                { "name": "B", "mbti": "ISTP", "skills_extracted": "데이터 엔지니어링" }
            ],
            "seed": 7
        });
        let (_, first) = post_json("/api/v1/team-fit/preview", request.clone()).await;
        let (_, second) = post_json("/api/v1/team-fit/preview", request).await;
        assert_eq!(first, second);
        assert_eq!(first["chemistry_score"], 80);
    }

    #[tokio::test]
    async fn test_preview_rejects_empty_team() {
        let (status, body) =
            post_json("/api/v1/team-fit/preview", json!({ "members": [] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
