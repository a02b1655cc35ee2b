use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::lifecycle::AssignmentLifecycle;
use crate::models::ApiResponse;
use crate::services::error_response;

use super::{AssignmentService, caller_or_unauthorized};

pub async fn handle_delete_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
) -> ActixResult<HttpResponse> {
    let caller = match caller_or_unauthorized(request) {
        Ok(caller) => caller,
        Err(response) => return Ok(response),
    };

    let lifecycle = AssignmentLifecycle::new(service.get_storage(request)?);

    match lifecycle.delete(&caller, assignment_id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Assignment deleted successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
