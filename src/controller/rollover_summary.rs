use actix_web::{post, web, Responder};
use serde::Serialize;

use crate::{
    cancellation::Cancellation,
    configuration::{AppState, State},
    error::Error,
    handler::SummaryService,
    model::SummaryReport,
    types::SummaryRequest,
};

#[post("/rollover-summary")]
pub async fn index(
    state: web::Data<AppState<State>>,
    data: web::Json<SummaryRequest>,
) -> Result<impl Responder, Error> {
    let cancellation = Cancellation::new();
    // dropped with this future when the client goes away
    let guard = cancellation.drop_guard();

    let app = state.get_ref().clone();
    let request = data.into_inner();
    let job = tokio::spawn(async move {
        SummaryService::new(app.config.clone())
            .summarize(&app.http, request, &cancellation, None)
            .await
    });

    let report = job.await??;
    guard.disarm();

    Ok(web::Json(Response {
        ok: true,
        report,
    }))
}

#[derive(Debug, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(flatten)]
    pub report: SummaryReport,
}
