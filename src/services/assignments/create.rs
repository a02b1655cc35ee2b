use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::lifecycle::AssignmentLifecycle;
use crate::models::{ApiResponse, assignments::requests::CreateAssignmentRequest};
use crate::services::error_response;

use super::{AssignmentService, caller_or_unauthorized, populate_assignment};

pub async fn handle_create_assignment(
    service: &AssignmentService,
    request: &HttpRequest,
    body: CreateAssignmentRequest,
) -> ActixResult<HttpResponse> {
    let caller = match caller_or_unauthorized(request) {
        Ok(caller) => caller,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;
    let lifecycle = AssignmentLifecycle::new(storage.clone());

    let result = async {
        let assignment = lifecycle.create(&caller, body).await?;
        populate_assignment(&storage, assignment).await
    }
    .await;

    match result {
        Ok(detail) => Ok(HttpResponse::Created().json(ApiResponse::success(
            detail,
            "Assignment created successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
