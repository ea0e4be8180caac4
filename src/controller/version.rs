use actix_web::{get, web, Responder};
use serde::Serialize;

use crate::error::Error;

#[get("/version")]
pub async fn index() -> Result<impl Responder, Error> {
    Ok(web::Json(Response {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    }))
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub name: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    use super::*;

    #[actix_web::test]
    async fn test_version() {
        let app = test::init_service(
            App::new().service(web::scope("/api").service(index)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/version").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["name"], "rollover");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
