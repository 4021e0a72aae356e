use actix_web::{web, HttpResponse};
use tracing::info;

use super::{TextComparisonBodyData, VisualizationError};
use crate::domain::services::cross_attention_service::CrossAttentionService;
use crate::middlewares::session::middleware::SessionFromToken;

#[tracing::instrument(
    name = "Cross-attention comparison handler",
    skip(body, cross_attention_service, session),
    fields(session = %session.0)
)]
pub async fn cross_attention_comparison(
    cross_attention_service: web::Data<CrossAttentionService>,
    body: web::Json<TextComparisonBodyData>,
    session: web::ReqData<SessionFromToken>,
) -> Result<HttpResponse, VisualizationError> {
    let (main_text, cited_text) = body.into_inner().texts()?;

    let result = cross_attention_service
        .compare_texts(&main_text, &cited_text)
        .await?;

    info!(
        rows = result.tokens1.len(),
        columns = result.tokens2.len(),
        "Cross-attention computed"
    );
    Ok(HttpResponse::Ok().json(result))
}
