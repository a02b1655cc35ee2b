use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::lifecycle::AssignmentLifecycle;
use crate::models::{ApiResponse, assignments::requests::SubmitAnswerRequest};
use crate::services::error_response;

use super::{AssignmentService, caller_or_unauthorized, populate_assignment};

pub async fn handle_submit_answer(
    service: &AssignmentService,
    request: &HttpRequest,
    assignment_id: i64,
    body: SubmitAnswerRequest,
) -> ActixResult<HttpResponse> {
    let caller = match caller_or_unauthorized(request) {
        Ok(caller) => caller,
        Err(response) => return Ok(response),
    };
    let storage = service.get_storage(request)?;
    let lifecycle = AssignmentLifecycle::new(storage.clone());

    let result = async {
        let assignment = lifecycle.submit(&caller, assignment_id, body).await?;
        populate_assignment(&storage, assignment).await
    }
    .await;

    match result {
        Ok(detail) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Answer submitted successfully",
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
