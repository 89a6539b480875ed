// tests/api_tests.rs
//
// End-to-end tests against a live Postgres. Requires DATABASE_URL.

use std::net::SocketAddr;

use placement_backend::{config::Config, routes, state::AppState, utils::jwt::sign_jwt};
use sqlx::{PgPool, postgres::PgPoolOptions};

const SECRET: &str = "test_secret_for_integration_tests";

async fn connect() -> PgPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    pool
}

/// Spawns the app on a random port and returns its base URL.
async fn spawn_app(pool: PgPool) -> String {
    let config = Config {
        database_url: String::new(),
        jwt_secret: SECRET.to_string(),
        rust_log: "error".to_string(),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        db_max_connections: 2,
    };

    let app = routes::create_router(AppState { pool, config });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

/// Seeds a published set for today with answers "A", "B", ... and returns
/// (set_id, question_ids).
async fn seed_set(pool: &PgPool, size: usize, published: bool) -> (i64, Vec<i64>) {
    let (set_id,): (i64,) = sqlx::query_as(
        "INSERT INTO daily_sets (date, is_published) VALUES (CURRENT_DATE, $1) RETURNING id",
    )
    .bind(published)
    .fetch_one(pool)
    .await
    .unwrap();

    let mut ids = Vec::new();
    for i in 0..size {
        let answer = ((b'A' + i as u8) as char).to_string();
        let (qid,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO questions (question_text, options, correct_answer, topic)
            VALUES ($1, $2, $3, 'seed')
            RETURNING id
            "#,
        )
        .bind(format!("Question {}", i))
        .bind(serde_json::json!(["A", "B", "C", "D"]))
        .bind(&answer)
        .fetch_one(pool)
        .await
        .unwrap();

        sqlx::query(
            "INSERT INTO daily_set_questions (daily_set_id, question_id, position) VALUES ($1, $2, $3)",
        )
        .bind(set_id)
        .bind(qid)
        .bind(i as i32)
        .execute(pool)
        .await
        .unwrap();

        ids.push(qid);
    }

    (set_id, ids)
}

#[tokio::test]
async fn submit_scores_against_the_answer_key() {
    let pool = connect().await;
    let (set_id, q) = seed_set(&pool, 2, true).await;
    let address = spawn_app(pool.clone()).await;
    let client = reqwest::Client::new();
    let email = format!("s_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8]);

    let response = client
        .post(format!("{}/api/attempts", address))
        .json(&serde_json::json!({
            "student_name": "Meera",
            "student_email": email,
            "daily_set_id": set_id,
            "answers": [
                { "question_id": q[0], "selected_answer": "A" },
                { "question_id": q[1], "selected_answer": "C" }
            ]
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["score"], 1);
    assert_eq!(body["total_questions"], 2);

    let attempt_id = body["attempt_id"].as_i64().unwrap();
    let (rows,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM attempt_answers WHERE attempt_id = $1")
            .bind(attempt_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(rows, 2);
}

#[tokio::test]
async fn unknown_question_is_rejected_without_a_record() {
    let pool = connect().await;
    let (set_id, q) = seed_set(&pool, 2, true).await;
    let address = spawn_app(pool.clone()).await;
    let email = format!("s_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8]);

    let response = reqwest::Client::new()
        .post(format!("{}/api/attempts", address))
        .json(&serde_json::json!({
            "student_email": email,
            "daily_set_id": set_id,
            "answers": [
                { "question_id": q[0], "selected_answer": "A" },
                { "question_id": -9, "selected_answer": "X" }
            ]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 422);

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM attempts WHERE student_email = $1")
            .bind(&email)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn unpublished_set_is_not_found() {
    let pool = connect().await;
    let (set_id, q) = seed_set(&pool, 1, false).await;
    let address = spawn_app(pool).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/attempts", address))
        .json(&serde_json::json!({
            "daily_set_id": set_id,
            "answers": [{ "question_id": q[0], "selected_answer": "A" }]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn admin_sees_attempts_for_a_set() {
    let pool = connect().await;
    let (set_id, q) = seed_set(&pool, 3, true).await;
    let address = spawn_app(pool).await;
    let client = reqwest::Client::new();

    for (i, pick) in ["A", "Z", "Z"].iter().enumerate() {
        let response = client
            .post(format!("{}/api/attempts", address))
            .json(&serde_json::json!({
                "student_email": format!("rank{}_{}@example.com", i, set_id),
                "daily_set_id": set_id,
                "answers": [{ "question_id": q[0], "selected_answer": pick }]
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
    }

    let token = sign_jwt("admin@example.com", "admin", SECRET, 600).unwrap();

    let overview: serde_json::Value = client
        .get(format!(
            "{}/api/admin/analytics/overview?daily_set_id={}",
            address, set_id
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(overview["total_attempts"], 3);
    assert_eq!(overview["total_questions_attempted"], 9);
    assert_eq!(overview["average_percentage"], 11.1);
    assert_eq!(
        overview["top_identifiers"][0]["identifier"],
        format!("rank0_{}@example.com", set_id)
    );

    let page: serde_json::Value = client
        .get(format!(
            "{}/api/admin/attempts?daily_set_id={}&page=1&page_size=2",
            address, set_id
        ))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(page["total_count"], 3);
    assert_eq!(page["total_pages"], 2);
    assert_eq!(page["records"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn todays_set_hides_answers() {
    let pool = connect().await;
    seed_set(&pool, 2, true).await;
    let address = spawn_app(pool).await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/practice/today", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    let questions = body["questions"].as_array().unwrap();
    assert!(!questions.is_empty());
    assert!(questions[0].get("correct_answer").is_none());
}
