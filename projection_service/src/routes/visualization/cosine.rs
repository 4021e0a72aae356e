use actix_web::{web, HttpResponse};
use tracing::info;

use super::VisualizationError;
use crate::domain::{
    entities::{
        document::{ComparisonRequest, DocumentId},
        projections::AngleResult,
    },
    services::angular_projector::project_angles,
};
use crate::middlewares::session::middleware::SessionFromToken;

/// Axis on which the main patent is placed
pub const REFERENCE_AXIS: [f64; 2] = [1.0, 0.0];

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct CosineResponse {
    pub main_id: DocumentId,
    pub reference_axis: [f64; 2],
    pub angles: Vec<AngleResult>,
}

#[tracing::instrument(
    name = "Cosine projection handler",
    skip(body, session),
    fields(session = %session.0)
)]
pub async fn cosine_projection(
    body: web::Json<ComparisonRequest>,
    session: web::ReqData<SessionFromToken>,
) -> Result<HttpResponse, VisualizationError> {
    let ComparisonRequest {
        main_patent,
        cited_patents,
    } = body.into_inner();

    info!(
        main_id = %main_patent.id,
        nb_cited = cited_patents.len(),
        "Projecting cited patents on angles"
    );

    let angles = project_angles(
        &main_patent.embedding,
        cited_patents
            .iter()
            .map(|cited| (&cited.id, cited.embedding.as_slice())),
    )?;

    Ok(HttpResponse::Ok().json(CosineResponse {
        main_id: main_patent.id,
        reference_axis: REFERENCE_AXIS,
        angles,
    }))
}
