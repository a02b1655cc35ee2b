use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::lifecycle::AssignmentLifecycle;
use crate::models::{
    ApiResponse,
    assignments::{requests::TeacherAssignmentParams, responses::AssignmentListResponse},
};
use crate::services::error_response;

use super::{AssignmentService, caller_or_unauthorized, populate_assignments};

pub async fn handle_list_teacher_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
    params: TeacherAssignmentParams,
) -> ActixResult<HttpResponse> {
    let caller = match caller_or_unauthorized(request) {
        Ok(caller) => caller,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;
    let lifecycle = AssignmentLifecycle::new(storage.clone());

    let result = async {
        let assignments = lifecycle.list_for_teacher(&caller, params.status).await?;
        populate_assignments(&storage, assignments).await
    }
    .await;

    match result {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssignmentListResponse { items },
            "Assignments retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}

pub async fn handle_list_student_assignments(
    service: &AssignmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let caller = match caller_or_unauthorized(request) {
        Ok(caller) => caller,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;
    let lifecycle = AssignmentLifecycle::new(storage.clone());

    let result = async {
        let assignments = lifecycle.list_published_for_student(&caller).await?;
        populate_assignments(&storage, assignments).await
    }
    .await;

    match result {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AssignmentListResponse { items },
            "Assignments retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
