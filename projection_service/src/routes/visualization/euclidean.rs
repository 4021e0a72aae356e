use actix_web::{web, HttpResponse};
use tracing::info;

use super::VisualizationError;
use crate::domain::{
    entities::{
        document::{ComparisonRequest, DocumentId, DocumentRef},
        projections::DistanceResult,
    },
    projection_error::ProjectionError,
    services::spatial_projector::project_distances,
};
use crate::middlewares::session::middleware::SessionFromToken;

#[derive(Debug, serde::Deserialize, serde::Serialize)]
pub struct EuclideanResponse {
    pub main_id: DocumentId,
    pub main_point: Vec<f64>,
    pub distances: Vec<DistanceResult>,
}

#[tracing::instrument(
    name = "Euclidean projection handler",
    skip(body, session),
    fields(session = %session.0)
)]
pub async fn euclidean_projection(
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
        "Projecting cited patents on distances"
    );

    let main_point = reduced_embedding(&main_patent)?;
    let cited_points = cited_patents
        .iter()
        .map(|cited| reduced_embedding(cited).map(|point| (&cited.id, point)))
        .collect::<Result<Vec<_>, ProjectionError>>()?;

    let distances = project_distances(main_point, cited_points)?;

    Ok(HttpResponse::Ok().json(EuclideanResponse {
        main_point: main_point.to_vec(),
        main_id: main_patent.id.clone(),
        distances,
    }))
}

fn reduced_embedding(document: &DocumentRef) -> Result<&[f64], ProjectionError> {
    document.reduced_embedding.as_deref().ok_or_else(|| {
        ProjectionError::ShapeMismatch(format!(
            "document {} has no reduced embedding",
            document.id
        ))
    })
}
