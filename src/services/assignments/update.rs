use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::lifecycle::AssignmentLifecycle;
use crate::models::{ApiResponse, assignments::requests::UpdateAssignmentRequest};
use crate::services::error_response;

use super::{AssignmentService, caller_or_unauthorized, populate_assignment};

pub async fn handle_update_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
    body: UpdateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let caller = match caller_or_unauthorized(request) {
        Ok(caller) => caller,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;
    let lifecycle = AssignmentLifecycle::new(storage.clone());

    let result = async {
        let assignment = lifecycle.update(&caller, assignment_id, body).await?;
        populate_assignment(&storage, assignment).await
    }
    .await;

    match result {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Assignment updated successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
