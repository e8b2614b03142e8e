//! HTTP surface tests: routing, auth and error bodies, driven through an
//! in-process actix service backed by in-memory SQLite.
//!
//! Run with: `cargo test --test api_test`
mod common;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use std::sync::Arc;

use lingua_school_backend::auth::jwt::{Claims, TokenValidator, UserMetadata};
use lingua_school_backend::cache::{CacheData, CatalogCache};
use lingua_school_backend::config::AppConfig;
use lingua_school_backend::db::orders as order_db;
use lingua_school_backend::enrollment::ReenrollmentPolicy;
use lingua_school_backend::feedback::{KeywordSentiment, ScorerData};
use lingua_school_backend::handlers;
use lingua_school_backend::models::users::{self, Roles};
use lingua_school_backend::notifications::{LogNotifier, NotifierData};

use common::*;

const TEST_SECRET: &str = "api-test-secret-at-least-256-bits-long-xxxxxxxxxxx";

fn test_config() -> AppConfig {
    AppConfig::from_lookup(|name| match name {
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "JWT_SECRET" => Some(TEST_SECRET.to_string()),
        _ => None,
    })
    .expect("test config")
}

fn bearer(user: &users::Model) -> (&'static str, String) {
    let now = Utc::now().timestamp() as usize;
    let user_type = match user.role {
        Roles::Teacher => "teacher",
        Roles::Student => "student",
    };
    let claims = Claims {
        sub: user.id.to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: None,
        email: Some(user.email.clone()),
        role: Some("authenticated".to_string()),
        user_metadata: Some(UserMetadata {
            user_type: Some(user_type.to_string()),
            ..Default::default()
        }),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to encode test JWT");
    ("Authorization", format!("Bearer {token}"))
}

macro_rules! app {
    ($db:expr) => {{
        let cache: CacheData = Arc::new(CatalogCache::disabled());
        let notifier: NotifierData = Arc::new(LogNotifier);
        let scorer: ScorerData = Arc::new(KeywordSentiment::default());
        test::init_service(
            App::new()
                .app_data(web::Data::new($db.clone()))
                .app_data(web::Data::new(cache))
                .app_data(web::Data::new(Arc::new(TokenValidator::SharedSecret(
                    TEST_SECRET.to_string(),
                ))))
                .app_data(web::Data::new(notifier))
                .app_data(web::Data::new(scorer))
                .app_data(web::Data::new(test_config()))
                .service(web::scope("/api").configure(handlers::init_routes)),
        )
        .await
    }};
}

#[actix_web::test]
async fn requests_without_a_token_are_unauthorized() {
    let db = setup_db().await;
    let app = app!(db);

    let req = test::TestRequest::get().uri("/api/orders").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Missing Authorization header");

    let req = test::TestRequest::get()
        .uri("/api/orders")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid token"));
}

#[actix_web::test]
async fn students_cannot_publish_courses() {
    let db = setup_db().await;
    let student = create_user(&db, Roles::Student).await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/api/teacher/courses")
        .insert_header(bearer(&student))
        .set_json(json!({
            "name": "Business English",
            "description": "Meetings and email",
            "level": "B2",
            "price": 240.0,
            "start_date": "2026-02-02",
            "end_date": "2026-05-25",
            "max_seats": 8
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn teachers_publish_courses() {
    let db = setup_db().await;
    let teacher = create_user(&db, Roles::Teacher).await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/api/teacher/courses")
        .insert_header(bearer(&teacher))
        .set_json(json!({
            "name": "Business English",
            "description": "Meetings and email",
            "level": "B2",
            "price": 240.0,
            "start_date": "2026-02-02",
            "end_date": "2026-05-25",
            "max_seats": 8
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/teacher/courses")
        .insert_header(bearer(&teacher))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_courses"], 1);
    assert_eq!(body["total_students"], 0);
}

#[actix_web::test]
async fn enrollment_needs_accepted_terms() {
    let db = setup_db().await;
    let teacher = create_user(&db, Roles::Teacher).await;
    let student = create_user(&db, Roles::Student).await;
    let course = create_course(&db, &teacher, 5).await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri(&format!("/api/courses/{}/enroll", course.id))
        .insert_header(bearer(&student))
        .set_json(json!({ "agree_terms": false }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "You must accept the terms and conditions");
    assert_eq!(reload_course(&db, course.id).await.occupied_seats, 0);
}

#[actix_web::test]
async fn enroll_and_complete_a_module() {
    let db = setup_db().await;
    let teacher = create_user(&db, Roles::Teacher).await;
    let student = create_user(&db, Roles::Student).await;
    let course = create_course(&db, &teacher, 5).await;
    let modules = add_modules(&db, &course, 2).await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri(&format!("/api/courses/{}/enroll", course.id))
        .insert_header(bearer(&student))
        .set_json(json!({ "agree_terms": true, "notes": "Evenings only" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["order"]["status"], "paid");
    let order_id = body["order"]["id"].as_str().expect("order id").to_string();

    let req = test::TestRequest::post()
        .uri(&format!(
            "/api/orders/{order_id}/modules/{}/complete",
            modules[0].id
        ))
        .insert_header(bearer(&student))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["progress"], 50.0);
    assert_eq!(body["completed_modules"], 1);
    assert_eq!(body["total_modules"], 2);

    let req = test::TestRequest::get()
        .uri(&format!("/api/orders/{order_id}"))
        .insert_header(bearer(&student))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["order"]["status"], "in_progress");
    assert_eq!(body["order"]["progress"], 50);

    // a second enrollment in the same course is refused
    let req = test::TestRequest::post()
        .uri(&format!("/api/courses/{}/enroll", course.id))
        .insert_header(bearer(&student))
        .set_json(json!({ "agree_terms": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(reload_course(&db, course.id).await.occupied_seats, 1);
}

#[actix_web::test]
async fn another_students_order_is_forbidden() {
    let db = setup_db().await;
    let teacher = create_user(&db, Roles::Teacher).await;
    let owner = create_user(&db, Roles::Student).await;
    let intruder = create_user(&db, Roles::Student).await;
    let course = create_course(&db, &teacher, 5).await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri(&format!("/api/courses/{}/enroll", course.id))
        .insert_header(bearer(&owner))
        .set_json(json!({ "agree_terms": true }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let order_id = body["order"]["id"].as_str().expect("order id").to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/orders/{order_id}/cancel"))
        .insert_header(bearer(&intruder))
        .set_json(json!({ "confirm_cancel": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(reload_course(&db, course.id).await.occupied_seats, 1);
}

#[actix_web::test]
async fn unsupported_verb_gets_json_405() {
    let db = setup_db().await;
    let app = app!(db);

    let req = test::TestRequest::get()
        .uri(&format!("/api/orders/{}/cancel", uuid::Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn malformed_json_gets_json_400() {
    let db = setup_db().await;
    let teacher = create_user(&db, Roles::Teacher).await;
    let student = create_user(&db, Roles::Student).await;
    let course = create_course(&db, &teacher, 5).await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri(&format!("/api/courses/{}/enroll", course.id))
        .insert_header(bearer(&student))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn repeated_completion_needs_no_confirmation() {
    let db = setup_db().await;
    let teacher = create_user(&db, Roles::Teacher).await;
    let student = create_user(&db, Roles::Student).await;
    let course = create_course(&db, &teacher, 5).await;
    let modules = add_modules(&db, &course, 1).await;
    let order = order_db::enroll(
        &db,
        course.id,
        student.id,
        String::new(),
        ReenrollmentPolicy::OncePerCourse,
    )
    .await
    .unwrap();
    order_db::mark_module_complete(&db, order.id, modules[0].id)
        .await
        .unwrap();
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri(&format!("/api/orders/{}/complete", order.id))
        .insert_header(bearer(&student))
        .set_json(json!({ "confirm_completion": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri(&format!("/api/orders/{}/complete", order.id))
        .insert_header(bearer(&student))
        .set_json(json!({ "confirm_completion": true, "rating": 5 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Congratulations, you have completed the course");
    assert_eq!(body["order"]["status"], "completed");

    let req = test::TestRequest::post()
        .uri(&format!("/api/orders/{}/complete", order.id))
        .insert_header(bearer(&student))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "This course is already completed");
    assert_eq!(body["order"]["rating"], 5);
}

#[actix_web::test]
async fn public_feed_likes_and_stats() {
    let db = setup_db().await;
    let author = create_user(&db, Roles::Student).await;
    let reader = create_user(&db, Roles::Student).await;
    let app = app!(db);

    let req = test::TestRequest::post()
        .uri("/api/feedback")
        .insert_header(bearer(&author))
        .set_json(json!({
            "name": "Ana",
            "subject": "Speaking club",
            "message": "Friendly teachers",
            "site_design_rating": 4,
            "usability_rating": 5,
            "content_rating": 5,
            "speed_rating": 4
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let feedback_id = body["id"].as_str().expect("feedback id").to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/feedback/{feedback_id}/like"))
        .insert_header(bearer(&reader))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["action"], "liked");
    assert_eq!(body["likes_count"], 1);
    assert_eq!(body["user_has_liked"], true);

    // anonymous readers see the count but have liked nothing
    let req = test::TestRequest::get()
        .uri("/api/feedback/public?page=1&limit=5")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["feedbacks"][0]["likes_count"], 1);
    assert_eq!(body["feedbacks"][0]["user_has_liked"], false);
    assert!(body["feedbacks"][0].get("email").is_none());
    assert_eq!(body["has_more"], false);

    let req = test::TestRequest::get()
        .uri("/api/feedback/public")
        .insert_header(bearer(&reader))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["feedbacks"][0]["user_has_liked"], true);

    let req = test::TestRequest::post()
        .uri(&format!("/api/feedback/{feedback_id}/like"))
        .insert_header(bearer(&reader))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["action"], "unliked");
    assert_eq!(body["likes_count"], 0);

    let req = test::TestRequest::post()
        .uri(&format!("/api/feedback/{feedback_id}/like"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get().uri("/api/feedback/stats").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total_feedbacks"], 1);
    assert_eq!(body["average_design"], 4.0);
    assert_eq!(body["average_usability"], 5.0);
}
