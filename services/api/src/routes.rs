use crate::infra::{load_roster, AppState, RosterSource};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use skill_gap::error::AppError;
use skill_gap::workflows::skills::domain::Proficiency;
use skill_gap::workflows::skills::report::role::available_roles;
use skill_gap::workflows::skills::report::views::{
    GapView, InsightView, RoleDeepDive, SkillGapTotals,
};
use skill_gap::workflows::skills::report::{
    insight_view, role_deep_dive, DreamTeamSelection, SkillGapReport,
};
use skill_gap::workflows::skills::UnresolvedGradePolicy;
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GapsRequest {
    #[serde(default)]
    pub(crate) employees_csv: Option<String>,
    #[serde(default)]
    pub(crate) requirements_csv: Option<String>,
    #[serde(default)]
    pub(crate) include_resources: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct GapsResponse {
    pub(crate) data_source: RosterSource,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) totals: SkillGapTotals,
    pub(crate) gaps: Vec<GapView>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct InsightsRequest {
    #[serde(default)]
    pub(crate) employees_csv: Option<String>,
    #[serde(default)]
    pub(crate) requirements_csv: Option<String>,
    #[serde(default)]
    pub(crate) unresolved_grade: Option<UnresolvedGradePolicy>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InsightsResponse {
    pub(crate) data_source: RosterSource,
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) unresolved_grade: UnresolvedGradePolicy,
    pub(crate) insights: Vec<InsightView>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoleReportRequest {
    #[serde(default)]
    pub(crate) employees_csv: Option<String>,
    #[serde(default)]
    pub(crate) requirements_csv: Option<String>,
    pub(crate) role: String,
    #[serde(default)]
    pub(crate) skills: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) targets: BTreeMap<String, Proficiency>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RoleReportResponse {
    pub(crate) data_source: RosterSource,
    pub(crate) roles: Vec<String>,
    pub(crate) report: RoleDeepDive,
}

pub(crate) fn with_skill_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/skills/gaps", post(gaps_endpoint))
        .route("/api/v1/skills/insights", post(insights_endpoint))
        .route("/api/v1/skills/roles/report", post(role_report_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn gaps_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<GapsRequest>,
) -> Result<Json<GapsResponse>, AppError> {
    let (tables, data_source) =
        load_roster(payload.employees_csv, payload.requirements_csv, &state.data)?;
    let report = SkillGapReport::build(
        &tables.employees,
        &tables.requirements,
        state.data.unresolved_grade,
    )?;
    let summary = report.summary(payload.include_resources);

    info!(?data_source, gaps = summary.gaps.len(), "gap table served");
    Ok(Json(GapsResponse {
        data_source,
        generated_at: Utc::now(),
        totals: summary.totals,
        gaps: summary.gaps,
    }))
}

pub(crate) async fn insights_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<InsightsRequest>,
) -> Result<Json<InsightsResponse>, AppError> {
    let policy = payload
        .unresolved_grade
        .unwrap_or(state.data.unresolved_grade);
    let (tables, data_source) =
        load_roster(payload.employees_csv, payload.requirements_csv, &state.data)?;
    let report = SkillGapReport::build(&tables.employees, &tables.requirements, policy)?;

    Ok(Json(InsightsResponse {
        data_source,
        generated_at: Utc::now(),
        unresolved_grade: policy,
        insights: report.insights.iter().map(insight_view).collect(),
    }))
}

pub(crate) async fn role_report_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RoleReportRequest>,
) -> Result<Json<RoleReportResponse>, AppError> {
    let RoleReportRequest {
        employees_csv,
        requirements_csv,
        role,
        skills,
        targets,
    } = payload;

    let (tables, data_source) = load_roster(employees_csv, requirements_csv, &state.data)?;
    let selection = DreamTeamSelection { skills, targets };
    let report = role_deep_dive(&tables.employees, &tables.requirements, &role, &selection)?;

    Ok(Json(RoleReportResponse {
        data_source,
        roles: available_roles(&tables.employees),
        report,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use skill_gap::config::DataConfig;
    use skill_gap::workflows::skills::domain::ValidationError;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    const EMPLOYEES: &str = "EmployeeID,Name,Role,Grade,Python,SQL\n\
1,Employee_1,Software Engineer,Junior,3,\n\
2,Employee_2,Software Engineer,Junior,1,\n\
3,Employee_3,Data Analyst,Senior,,5\n";

    const REQUIREMENTS: &str = "Role,Skill,RequiredProficiency\n\
Software Engineer,Python,5\n\
Data Analyst,SQL,5\n";

    fn state_with(data: DataConfig, ready: bool) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            data: Arc::new(data),
        }
    }

    fn missing_files() -> DataConfig {
        DataConfig {
            employees_csv: "./no-such-employee_data.csv".into(),
            requirements_csv: "./no-such-role_skill_requirements.csv".into(),
            ..DataConfig::default()
        }
    }

    #[tokio::test]
    async fn gaps_endpoint_uses_inline_tables() {
        let request = GapsRequest {
            employees_csv: Some(EMPLOYEES.to_string()),
            requirements_csv: Some(REQUIREMENTS.to_string()),
            include_resources: true,
        };

        let state = state_with(missing_files(), true);
        let Json(body) = gaps_endpoint(Extension(state), Json(request))
            .await
            .expect("gaps computed");

        assert_eq!(body.data_source, RosterSource::Inline);
        assert_eq!(body.gaps.len(), 2);
        assert_eq!(body.totals.employees, 3);
        assert_eq!(body.gaps[0].recommended_training, "Advanced Python Training");
        assert!(!body.gaps[0].learning_resources.is_empty());
    }

    #[tokio::test]
    async fn gaps_endpoint_falls_back_to_configured_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data = DataConfig {
            employees_csv: dir.path().join("employee_data.csv"),
            requirements_csv: dir.path().join("role_skill_requirements.csv"),
            ..DataConfig::default()
        };
        std::fs::write(&data.employees_csv, EMPLOYEES).expect("employees");
        std::fs::write(&data.requirements_csv, REQUIREMENTS).expect("requirements");

        let Json(body) = gaps_endpoint(
            Extension(state_with(data, true)),
            Json(GapsRequest::default()),
        )
        .await
        .expect("gaps computed");

        assert_eq!(body.data_source, RosterSource::Configured);
        assert_eq!(body.gaps.len(), 2);
        assert!(body.gaps.iter().all(|gap| gap.learning_resources.is_empty()));
    }

    #[tokio::test]
    async fn single_inline_table_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data = DataConfig {
            employees_csv: dir.path().join("employee_data.csv"),
            requirements_csv: dir.path().join("role_skill_requirements.csv"),
            ..DataConfig::default()
        };
        std::fs::write(&data.employees_csv, EMPLOYEES).expect("employees");
        std::fs::write(&data.requirements_csv, REQUIREMENTS).expect("requirements");
        let state = state_with(data, true);

        let request = GapsRequest {
            employees_csv: Some(EMPLOYEES.to_string()),
            ..GapsRequest::default()
        };
        let err = gaps_endpoint(Extension(state.clone()), Json(request))
            .await
            .expect_err("requirements table missing");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::IncompleteInlineRoster {
                missing: "requirements",
                ..
            })
        ));

        let request = InsightsRequest {
            requirements_csv: Some(REQUIREMENTS.to_string()),
            ..InsightsRequest::default()
        };
        let err = insights_endpoint(Extension(state), Json(request))
            .await
            .expect_err("employees table missing");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_configured_files_are_client_errors() {
        let err = gaps_endpoint(
            Extension(state_with(missing_files(), true)),
            Json(GapsRequest::default()),
        )
        .await
        .expect_err("missing inputs");

        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn insights_endpoint_reports_worked_example() {
        let request = InsightsRequest {
            employees_csv: Some(EMPLOYEES.to_string()),
            requirements_csv: Some(REQUIREMENTS.to_string()),
            unresolved_grade: Some(UnresolvedGradePolicy::Drop),
        };

        let Json(body) =
            insights_endpoint(Extension(state_with(missing_files(), true)), Json(request))
                .await
                .expect("insights computed");

        assert_eq!(body.unresolved_grade, UnresolvedGradePolicy::Drop);
        assert_eq!(body.insights.len(), 1);
        let insight = &body.insights[0];
        assert_eq!(insight.grade, "Junior");
        assert_eq!(insight.average_gap, 3.0);
        assert_eq!(insight.expected_improvement, 2.1);
        assert_eq!(insight.num_employees, 2);
        assert_eq!(insight.estimated_cost_savings, 12600.0);
    }

    #[tokio::test]
    async fn role_report_rejects_foreign_skills() {
        let request = RoleReportRequest {
            employees_csv: Some(EMPLOYEES.to_string()),
            requirements_csv: Some(REQUIREMENTS.to_string()),
            role: "Software Engineer".to_string(),
            skills: Some(vec!["SQL".to_string()]),
            targets: BTreeMap::new(),
        };

        let state = state_with(missing_files(), true);
        let err = role_report_endpoint(Extension(state), Json(request))
            .await
            .expect_err("SQL is not a Software Engineer requirement");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn role_report_route_returns_deep_dive() {
        let app = with_skill_routes().layer(Extension(state_with(missing_files(), true)));
        let body = json!({
            "employees_csv": EMPLOYEES,
            "requirements_csv": REQUIREMENTS,
            "role": "Software Engineer",
            "targets": { "Python": 4 }
        });

        let response = app
            .oneshot(
                Request::post("/api/v1/skills/roles/report")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request builds"),
            )
            .await
            .expect("route responds");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        let payload: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(payload["roles"], json!(["Data Analyst", "Software Engineer"]));
        assert_eq!(payload["report"]["headcount"], 2);
        assert_eq!(payload["report"]["dream_team"]["entries"][0]["target"], 4);
        assert_eq!(payload["report"]["dream_team"]["total_build_gap"], 2);
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let response = readiness_endpoint(Extension(state_with(missing_files(), false)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
