use actix_web::{HttpResponse, Result as ActixResult, web};
use serde::Serialize;
use ts_rs::TS;

use crate::models::{ApiResponse, AppStartTime};

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "system.ts")]
pub struct HealthResponse {
    pub message: String,
    pub uptime_seconds: i64,
}

pub async fn health_check(start: web::Data<AppStartTime>) -> ActixResult<HttpResponse> {
    let uptime = chrono::Utc::now()
        .signed_duration_since(start.start_datetime)
        .num_seconds();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        HealthResponse {
            message: "Server is running!".to_string(),
            uptime_seconds: uptime,
        },
        "OK",
    )))
}

// 配置路由
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/health", web::get().to(health_check));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_health_reports_uptime() {
        let start = AppStartTime {
            start_datetime: chrono::Utc::now() - chrono::Duration::seconds(90),
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(start))
                .configure(configure_health_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["message"], "Server is running!");
        assert!(body["data"]["uptime_seconds"].as_i64().unwrap() >= 90);
    }
}
