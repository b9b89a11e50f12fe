//! Postgres fixtures for gymdash integration tests.
//!
//! One PostgreSQL server is shared by every test in a binary and each test
//! gets a fresh database on it. Set `GYMDASH_TEST_PG_URL` to point at a
//! server you already run; otherwise a container is started on first use.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use gymdash_db::models::{MemberRow, MembershipStatus, PlanKind, PlanRow};
use gymdash_db::pool;
use gymdash_db::queries::{members, plans};

/// Environment variable naming an already-running server root URL.
pub const PG_URL_ENV: &str = "GYMDASH_TEST_PG_URL";

struct Server {
    root_url: String,
    _container: Option<ContainerAsync<Postgres>>,
}

static SERVER: OnceCell<Server> = OnceCell::const_new();

async fn start_server() -> Server {
    if let Ok(root_url) = std::env::var(PG_URL_ENV) {
        return Server {
            root_url,
            _container: None,
        };
    }

    let container = Postgres::default()
        .with_tag("16")
        .start()
        .await
        .expect("failed to start postgres container");
    let host = container.get_host().await.expect("container host");
    let port = container
        .get_host_port_ipv4(5432)
        .await
        .expect("container port");

    Server {
        root_url: format!("postgresql://postgres:postgres@{host}:{port}"),
        _container: Some(container),
    }
}

/// Server root URL, without a database name.
pub async fn server_url() -> &'static str {
    &SERVER.get_or_init(start_server).await.root_url
}

async fn admin_pool() -> PgPool {
    let url = format!("{}/postgres", server_url().await);
    PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&url)
        .await
        .expect("failed to connect to the postgres admin database")
}

/// A migrated, uniquely named database. Call [`TestDb::drop`] at the end
/// of the test.
pub struct TestDb {
    pub pool: PgPool,
    pub name: String,
}

impl TestDb {
    /// Create the database and apply every migration.
    pub async fn create() -> Self {
        let name = format!("gymdash_test_{}", Uuid::new_v4().simple());

        let admin = admin_pool().await;
        admin
            .execute(format!("CREATE DATABASE {name}").as_str())
            .await
            .unwrap_or_else(|e| panic!("CREATE DATABASE {name} failed: {e}"));
        admin.close().await;

        let url = format!("{}/{name}", server_url().await);
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&url)
            .await
            .unwrap_or_else(|e| panic!("failed to connect to {name}: {e}"));

        pool::run_migrations(&pool)
            .await
            .expect("migrations should apply cleanly");

        Self { pool, name }
    }

    /// Close the pool, kick any stragglers and drop the database.
    pub async fn drop(self) {
        self.pool.close().await;

        let admin = admin_pool().await;
        let _ = admin
            .execute(
                format!(
                    "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
                     WHERE datname = '{}' AND pid <> pg_backend_pid()",
                    self.name
                )
                .as_str(),
            )
            .await;
        let _ = admin
            .execute(format!("DROP DATABASE IF EXISTS {}", self.name).as_str())
            .await;
        admin.close().await;
    }
}

/// Insert an active member with a derived email and phone.
pub async fn seed_member(pool: &PgPool, name: &str) -> MemberRow {
    let slug = name.to_lowercase().replace(' ', ".");
    members::insert_member(
        pool,
        &members::NewMember {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            email: format!("{slug}@example.com"),
            phone: "555-0100".to_owned(),
            photo: None,
            status: MembershipStatus::Active,
        },
    )
    .await
    .expect("seed member")
}

/// Insert a plan of the given kind with an empty details body.
pub async fn seed_plan(pool: &PgPool, kind: PlanKind, name: &str) -> PlanRow {
    plans::insert_plan(
        pool,
        &plans::NewPlan {
            id: Uuid::new_v4(),
            kind,
            name: name.to_owned(),
            goal: "maintenance".to_owned(),
            trainer: Some("Sam".to_owned()),
            details: serde_json::json!({}),
            default_active_days: vec![
                "monday".to_owned(),
                "wednesday".to_owned(),
                "friday".to_owned(),
            ],
        },
    )
    .await
    .expect("seed plan")
}
