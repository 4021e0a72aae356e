use crate::domain::{
    entities::{
        document::{DocumentId, ReducedEmbedding},
        projections::DistanceResult,
    },
    projection_error::ProjectionError,
};

/// Computes the Euclidean distance between the main reduced embedding and each cited one.
///
/// Every vector must have exactly 3 components. Results keep the order of `cited`.
#[tracing::instrument(name = "Projecting distances", skip(main, cited))]
pub fn project_distances<'a, I>(
    main: &[f64],
    cited: I,
) -> Result<Vec<DistanceResult>, ProjectionError>
where
    I: IntoIterator<Item = (&'a DocumentId, &'a [f64])>,
{
    let main_point = to_point(main).map_err(|e| match e {
        ProjectionError::ShapeMismatch(message) => {
            ProjectionError::ShapeMismatch(format!("main reduced embedding: {}", message))
        }
        other => other,
    })?;

    cited
        .into_iter()
        .map(|(id, reduced_embedding)| {
            let cited_point = to_point(reduced_embedding).map_err(|_| {
                ProjectionError::ShapeMismatch(format!(
                    "reduced embedding of document {} has {} components instead of 3",
                    id,
                    reduced_embedding.len()
                ))
            })?;

            let distance = euclidean_distance(&main_point, &cited_point).ok_or_else(|| {
                ProjectionError::DegenerateVector(format!(
                    "distance to document {} exceeds the largest representable value",
                    id
                ))
            })?;

            Ok(DistanceResult {
                id: id.clone(),
                distance,
            })
        })
        .collect()
}

fn to_point(vector: &[f64]) -> Result<ReducedEmbedding, ProjectionError> {
    vector.try_into().map_err(|_| {
        ProjectionError::ShapeMismatch(format!("{} components instead of 3", vector.len()))
    })
}

/// Distance between two points, `None` when it cannot be represented as a finite `f64`.
///
/// Coordinates are divided by the largest one before squaring, so neither the differences
/// nor their squares overflow or vanish for very large or very small points.
fn euclidean_distance(p: &ReducedEmbedding, q: &ReducedEmbedding) -> Option<f64> {
    let scale = p
        .iter()
        .chain(q.iter())
        .map(|v| v.abs())
        .fold(0.0, f64::max);

    if scale == 0.0 {
        return Some(0.0);
    }
    if !scale.is_finite() {
        return None;
    }

    let distance = scale
        * p.iter()
            .zip(q.iter())
            .map(|(a, b)| (a / scale - b / scale).powi(2))
            .sum::<f64>()
            .sqrt();

    distance.is_finite().then_some(distance)
}
