use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::assignments::requests::{
    CreateAssignmentRequest, SubmitAnswerRequest, TeacherAssignmentParams, UpdateAssignmentRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::AssignmentService;
use crate::utils::SafeIDI64;

// 懒加载的全局 AssignmentService 实例
static ASSIGNMENT_SERVICE: Lazy<AssignmentService> = Lazy::new(AssignmentService::new_lazy);

pub async fn create_assignment(
    req: HttpRequest,
    body: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .create_assignment(&req, body.into_inner())
        .await
}

pub async fn list_teacher_assignments(
    req: HttpRequest,
    query: web::Query<TeacherAssignmentParams>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .list_teacher_assignments(&req, query.into_inner())
        .await
}

pub async fn list_student_assignments(req: HttpRequest) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.list_student_assignments(&req).await
}

pub async fn get_assignment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.get_assignment(&req, id.0).await
}

pub async fn update_assignment(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .update_assignment(&req, id.0, body.into_inner())
        .await
}

pub async fn delete_assignment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.delete_assignment(&req, id.0).await
}

pub async fn submit_answer(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<SubmitAnswerRequest>,
) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE
        .submit_answer(&req, id.0, body.into_inner())
        .await
}

pub async fn get_own_submission(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSIGNMENT_SERVICE.get_own_submission(&req, id.0).await
}

// 配置路由
pub fn configure_assignments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/assignments")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("").route(
                    web::post()
                        .to(create_assignment)
                        .wrap(middlewares::RequireRole::new(&UserRole::Teacher)),
                ),
            )
            .service(
                web::resource("/teacher").route(
                    web::get()
                        .to(list_teacher_assignments)
                        .wrap(middlewares::RequireRole::new(&UserRole::Teacher)),
                ),
            )
            .service(
                web::resource("/student").route(
                    web::get()
                        .to(list_student_assignments)
                        .wrap(middlewares::RequireRole::new(&UserRole::Student)),
                ),
            )
            .service(
                web::resource("/{id}")
                    // 详情对所有已登录用户开放
                    .route(web::get().to(get_assignment))
                    .route(
                        web::put()
                            .to(update_assignment)
                            .wrap(middlewares::RequireRole::new(&UserRole::Teacher)),
                    )
                    .route(
                        web::delete()
                            .to(delete_assignment)
                            .wrap(middlewares::RequireRole::new(&UserRole::Teacher)),
                    ),
            )
            .service(
                web::resource("/{id}/submit").route(
                    web::post()
                        .to(submit_answer)
                        .wrap(middlewares::RequireRole::new(&UserRole::Student)),
                ),
            )
            .service(
                web::resource("/{id}/submission").route(
                    web::get()
                        .to(get_own_submission)
                        .wrap(middlewares::RequireRole::new(&UserRole::Student)),
                ),
            ),
    );
}
