use actix_web::{web, HttpResponse};
use anyhow::Context;
use common::telemetry::spawn_blocking_with_tracing;
use tracing::info;

use super::{TextComparisonBodyData, VisualizationError};
use crate::domain::services::lexical_similarity_scorer::score_lexical_similarity;
use crate::middlewares::session::middleware::SessionFromToken;

#[tracing::instrument(
    name = "Semantic comparison handler",
    skip(body, session),
    fields(session = %session.0)
)]
pub async fn semantic_comparison(
    body: web::Json<TextComparisonBodyData>,
    session: web::ReqData<SessionFromToken>,
) -> Result<HttpResponse, VisualizationError> {
    let (main_text, cited_text) = body.into_inner().texts()?;

    info!(
        main_len = main_text.len(),
        cited_len = cited_text.len(),
        "Comparing texts lexically"
    );

    let result =
        spawn_blocking_with_tracing(move || score_lexical_similarity(&main_text, &cited_text))
            .await
            .context("Failed to run the lexical similarity scoring task")??;

    info!(similarity = result.similarity, "Lexical similarity computed");
    Ok(HttpResponse::Ok().json(result))
}
