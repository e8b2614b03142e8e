pub mod auth;
pub mod courses;
pub mod feedback;
pub mod orders;
pub mod teacher;

use actix_web::{HttpResponse, web};

/// JSON body for a verb the resource does not accept.
pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(serde_json::json!({
        "success": false,
        "message": "Method not allowed",
    }))
}

fn resource(path: &str) -> actix_web::Resource {
    web::resource(path).default_service(web::to(method_not_allowed))
}

/// Malformed JSON bodies answer in the same shape as every other failure.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid request body: {err}");
        let response = HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "message": message,
        }));
        actix_web::error::InternalError::from_response(err, response).into()
    })
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config());

    // ── Auth routes (protected by JWT via the AuthenticatedUser extractor) ──
    cfg.service(resource("/auth/me").route(web::get().to(auth::me)));
    cfg.service(
        resource("/auth/complete-profile").route(web::post().to(auth::complete_profile)),
    );

    // ── Course catalog (students) ──
    cfg.service(resource("/courses").route(web::get().to(courses::list_courses)));
    cfg.service(resource("/courses/{id}").route(web::get().to(courses::get_course)));
    cfg.service(resource("/courses/{id}/enroll").route(web::post().to(courses::enroll)));

    // ── Orders (scoped to the acting student) ──
    cfg.service(resource("/orders").route(web::get().to(orders::my_courses)));
    cfg.service(
        resource("/orders/{id}")
            .route(web::get().to(orders::get_order))
            .route(web::delete().to(orders::delete_order)),
    );
    cfg.service(
        resource("/orders/{id}/modules/{module_id}/complete")
            .route(web::post().to(orders::complete_module)),
    );
    cfg.service(resource("/orders/{id}/progress").route(web::post().to(orders::update_progress)));
    cfg.service(resource("/orders/{id}/complete").route(web::post().to(orders::complete_order)));
    cfg.service(resource("/orders/{id}/cancel").route(web::post().to(orders::cancel_order)));

    // ── Teacher routes (scoped to the owning teacher) ──
    cfg.service(
        resource("/teacher/courses")
            .route(web::get().to(teacher::dashboard))
            .route(web::post().to(teacher::create_course)),
    );
    cfg.service(
        resource("/teacher/courses/{id}")
            .route(web::get().to(teacher::course_detail))
            .route(web::put().to(teacher::edit_course))
            .route(web::delete().to(teacher::delete_course)),
    );
    cfg.service(
        resource("/teacher/courses/{id}/modules").route(web::post().to(teacher::add_modules)),
    );
    cfg.service(
        resource("/teacher/courses/{id}/modules/{module_id}")
            .route(web::delete().to(teacher::delete_module)),
    );
    cfg.service(
        resource("/teacher/courses/{id}/students").route(web::get().to(teacher::course_students)),
    );
    cfg.service(
        resource("/teacher/courses/{id}/reconcile")
            .route(web::post().to(teacher::reconcile_occupancy)),
    );

    // ── Site feedback survey ──
    cfg.service(
        resource("/feedback")
            .route(web::get().to(feedback::my_feedback))
            .route(web::post().to(feedback::submit_feedback)),
    );
    cfg.service(resource("/feedback/public").route(web::get().to(feedback::public_feedback)));
    cfg.service(resource("/feedback/stats").route(web::get().to(feedback::feedback_stats)));
    cfg.service(resource("/feedback/{id}/like").route(web::post().to(feedback::toggle_like)));
}
