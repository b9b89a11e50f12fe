use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use gymdash_core::bulk::BulkCoordinator;
use gymdash_core::catalog::{DietType, FoodCatalog, FoodCategory, FoodQuery, PlanCatalog};
use gymdash_core::error::ValidationError;
use gymdash_core::ledger::{AssignmentFilter, AssignmentLedger};
use gymdash_core::overlay::OverlayService;
use gymdash_core::repository::Store;
use gymdash_core::{AssignmentStatus, PlanKind};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        let status = match err.downcast_ref::<ValidationError>() {
            Some(
                ValidationError::PlanNotFound(_)
                | ValidationError::AssignmentNotFound(_)
                | ValidationError::MemberNotFound(_)
                | ValidationError::FoodNotFound(_),
            ) => StatusCode::NOT_FOUND,
            Some(_) => StatusCode::BAD_REQUEST,
            None => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: format!("{err:#}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlanListQuery {
    pub kind: Option<PlanKind>,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub kind: PlanKind,
    /// Comma-separated plan ids; every live plan of `kind` when absent.
    pub ids: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentListQuery {
    #[serde(default = "default_kind")]
    pub kind: PlanKind,
    pub status: Option<AssignmentStatus>,
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Deserialize)]
pub struct KindQuery {
    #[serde(default = "default_kind")]
    pub kind: PlanKind,
}

#[derive(Debug, Deserialize)]
pub struct FoodSearchQuery {
    pub q: Option<String>,
    pub category: Option<FoodCategory>,
    pub diet_type: Option<DietType>,
}

fn default_kind() -> PlanKind {
    PlanKind::Diet
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(store: Arc<dyn Store>) -> Router {
    Router::new()
        .route("/api/plans", get(list_plans))
        .route("/api/plans/export.csv", get(export_plans))
        .route("/api/plans/{id}", get(get_plan))
        .route("/api/assignments", get(list_assignments))
        .route("/api/assignments/stats", get(assignment_stats))
        .route("/api/overlays/{assignment_id}/macros", get(overlay_macros))
        .route("/api/foods", get(search_foods))
        .layer(CorsLayer::permissive())
        .with_state(store)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(store: Arc<dyn Store>, bind: &str, port: u16) -> Result<()> {
    let app = build_router(store);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("gymdash serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("gymdash serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_plans(
    State(store): State<Arc<dyn Store>>,
    Query(q): Query<PlanListQuery>,
) -> Result<axum::response::Response, AppError> {
    let catalog = PlanCatalog::new(store);
    let kinds = match q.kind {
        Some(k) => vec![k],
        None => vec![PlanKind::Diet, PlanKind::Workout],
    };
    let mut plans = Vec::new();
    for kind in kinds {
        plans.extend(catalog.list(kind, q.archived).await?);
    }
    Ok(Json(plans).into_response())
}

async fn get_plan(
    State(store): State<Arc<dyn Store>>,
    Path(id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let plan = PlanCatalog::new(store).get_with_members(id).await?;
    Ok(Json(plan).into_response())
}

async fn export_plans(
    State(store): State<Arc<dyn Store>>,
    Query(q): Query<ExportQuery>,
) -> Result<axum::response::Response, AppError> {
    let ids: Vec<Uuid> = match q.ids.as_deref() {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<Uuid>()
                    .map_err(|_| AppError::bad_request(format!("invalid plan id: {s}")))
            })
            .collect::<Result<_, _>>()?,
        None => PlanCatalog::new(Arc::clone(&store))
            .list(q.kind, false)
            .await?
            .into_iter()
            .map(|p| p.plan.id)
            .collect(),
    };

    let today = chrono::Local::now().date_naive();
    let export = BulkCoordinator::new(store)
        .export(q.kind, &ids, today)
        .await?;

    let disposition = format!("attachment; filename=\"{}\"", export.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.content,
    )
        .into_response())
}

async fn list_assignments(
    State(store): State<Arc<dyn Store>>,
    Query(q): Query<AssignmentListQuery>,
) -> Result<axum::response::Response, AppError> {
    let filter = AssignmentFilter {
        status: q.status,
        search: q.search,
    };
    let views = AssignmentLedger::new(store).list(q.kind, &filter).await?;
    Ok(Json(views).into_response())
}

async fn assignment_stats(
    State(store): State<Arc<dyn Store>>,
    Query(q): Query<KindQuery>,
) -> Result<axum::response::Response, AppError> {
    let stats = AssignmentLedger::new(store).stats(q.kind).await?;
    Ok(Json(stats).into_response())
}

async fn overlay_macros(
    State(store): State<Arc<dyn Store>>,
    Path(assignment_id): Path<Uuid>,
) -> Result<axum::response::Response, AppError> {
    let macros = OverlayService::new(store)
        .effective_macros(assignment_id)
        .await?;
    Ok(Json(macros).into_response())
}

async fn search_foods(
    State(store): State<Arc<dyn Store>>,
    Query(q): Query<FoodSearchQuery>,
) -> Result<axum::response::Response, AppError> {
    let query = FoodQuery {
        text: q.q,
        category: q.category,
        diet_type: q.diet_type,
    };
    let foods = FoodCatalog::new(store).search(&query).await?;
    Ok(Json(foods).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use chrono::NaiveDate;
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;
    use uuid::Uuid;

    use gymdash_core::MembershipStatus;
    use gymdash_core::bulk::{AssignRequest, BulkCoordinator};
    use gymdash_core::catalog::{
        DietType, FoodCatalog, FoodCategory, FoodDraft, PlanCatalog, PlanTemplate,
    };
    use gymdash_core::ledger::NotifyChannels;
    use gymdash_core::members::Member;
    use gymdash_core::repository::{MemoryStore, Store};
    use gymdash_core::schedule::WeekdaySet;

    const DIET_TOML: &str = r#"
[plan]
kind = "diet"
name = "Lean Bulk"
goal = "muscle-gain"
days = "all"
diet_type = "non-vegetarian"
macros = { calories = 2500, protein = 180, carbs = 280, fat = 80 }

[[meals]]
time = "lunch"
items = [{ name = "Chicken Rice", quantity = "1 plate", calories = 650 }]
"#;

    const WORKOUT_TOML: &str = r#"
[plan]
kind = "workout"
name = "Leg Day"
goal = "general-fitness"
days = "weekends"
body_part = "Legs"
difficulty = "intermediate"
duration_minutes = 50

[[exercises]]
name = "Squat"
sets = 5
reps = 5
"#;

    // -----------------------------------------------------------------------
    // HTTP helpers
    // -----------------------------------------------------------------------

    async fn send_request(store: Arc<dyn Store>, uri: &str) -> axum::response::Response {
        let app = super::build_router(store);
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        serde_json::from_slice(&body_bytes(response).await).unwrap()
    }

    async fn seeded() -> (Arc<dyn Store>, PlanTemplate, PlanTemplate, Uuid) {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let catalog = PlanCatalog::new(Arc::clone(&store));
        let diet = catalog.create_from_toml(DIET_TOML).await.unwrap();
        let workout = catalog.create_from_toml(WORKOUT_TOML).await.unwrap();

        let member = Member {
            id: Uuid::new_v4(),
            name: "Dana Cruz".into(),
            email: "dana@example.com".into(),
            phone: "555-0142".into(),
            photo: None,
            status: MembershipStatus::Active,
        };
        store.insert_member(&member).await.unwrap();

        let request = AssignRequest {
            member_ids: vec![member.id],
            start_date: NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            end_date: None,
            active_days: WeekdaySet::ALL,
            notify: NotifyChannels::default(),
            notes: None,
        };
        let report = BulkCoordinator::new(Arc::clone(&store))
            .assign(&[diet.id], &request, &CancellationToken::new())
            .await
            .unwrap();
        let assignment_id = report.succeeded().next().unwrap();

        (store, diet, workout, assignment_id)
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn list_plans_empty() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let resp = send_request(store, "/api/plans").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn list_plans_filters_by_kind() {
        let (store, _, workout, _) = seeded().await;

        let resp = send_request(Arc::clone(&store), "/api/plans").await;
        let json = body_json(resp).await;
        assert_eq!(json.as_array().unwrap().len(), 2);

        let resp = send_request(store, "/api/plans?kind=workout").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let arr = json.as_array().expect("response should be an array");
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["plan"]["name"], workout.name);
    }

    #[tokio::test]
    async fn get_plan_includes_members() {
        let (store, diet, _, _) = seeded().await;

        let resp = send_request(store, &format!("/api/plans/{}", diet.id)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["plan"]["name"], "Lean Bulk");
        assert_eq!(json["member_ids"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn get_plan_not_found() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let resp = send_request(store, &format!("/api/plans/{}", Uuid::new_v4())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn export_sets_csv_headers() {
        let (store, _, workout, _) = seeded().await;

        let uri = format!("/api/plans/export.csv?kind=workout&ids={}", workout.id);
        let resp = send_request(store, &uri).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_owned();
        assert!(content_type.starts_with("text/csv"), "got {content_type}");
        let disposition = resp.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_owned();
        assert!(disposition.contains("workouts-"), "got {disposition}");

        let body = String::from_utf8(body_bytes(resp).await).unwrap();
        let mut lines = body.lines();
        assert!(lines.next().unwrap().starts_with("Name,"));
        assert!(lines.next().unwrap().starts_with("Leg Day,Legs,intermediate,50 min"));
        assert_eq!(lines.next(), None);
    }

    #[tokio::test]
    async fn export_rejects_bad_id() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let resp = send_request(store, "/api/plans/export.csv?kind=diet&ids=nope").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn assignments_list_and_stats() {
        let (store, _, _, assignment_id) = seeded().await;

        let resp = send_request(Arc::clone(&store), "/api/assignments?search=dana").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["id"], assignment_id.to_string());
        assert_eq!(arr[0]["member_name"], "Dana Cruz");
        assert_eq!(arr[0]["plan_name"], "Lean Bulk");

        let resp = send_request(Arc::clone(&store), "/api/assignments?kind=workout").await;
        assert_eq!(body_json(resp).await, serde_json::json!([]));

        let resp = send_request(store, "/api/assignments/stats").await;
        let json = body_json(resp).await;
        assert_eq!(json["total"], 1);
        assert_eq!(json["active"], 1);
    }

    #[tokio::test]
    async fn overlay_macros_for_diet_assignment() {
        let (store, _, _, assignment_id) = seeded().await;

        let uri = format!("/api/overlays/{assignment_id}/macros");
        let resp = send_request(Arc::clone(&store), &uri).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["base"]["calories"], 2500);
        assert_eq!(json["effective"]["calories"], 2500);

        // A GET leaves no customization row behind.
        assert!(store.get_overlay(assignment_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn overlay_macros_unknown_assignment() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let resp = send_request(store, &format!("/api/overlays/{}/macros", Uuid::new_v4())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn foods_search_by_diet_type() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let catalog = FoodCatalog::new(Arc::clone(&store));
        for (name, diets) in [
            ("Tofu Scramble", vec![DietType::Vegan]),
            ("Egg Whites", vec![DietType::Vegetarian]),
        ] {
            catalog
                .create(FoodDraft {
                    name: name.into(),
                    category: FoodCategory::Protein,
                    serving_size: String::new(),
                    calories: 150,
                    protein: 18.0,
                    carbs: 2.0,
                    fat: 6.0,
                    fiber: None,
                    diet_types: diets.into_iter().collect(),
                    allergens: Default::default(),
                })
                .await
                .unwrap();
        }

        let resp = send_request(Arc::clone(&store), "/api/foods?diet_type=vegan").await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let arr = json.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["name"], "Tofu Scramble");
        assert_eq!(arr[0]["serving_size"], "1 serving");

        let resp = send_request(Arc::clone(&store), "/api/foods?q=egg&category=protein").await;
        assert_eq!(body_json(resp).await.as_array().unwrap().len(), 1);

        let resp = send_request(store, "/api/foods?category=candy").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
