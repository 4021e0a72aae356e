//! Projection of embeddings on a plane, as angles from a fixed reference axis.
//!
//! Only the angle between the main embedding and each cited embedding is kept:
//! the main document lies on the axis (1, 0) and every cited document is placed on the
//! unit circle at its angle. This summary is lossy by construction, two cited documents
//! at the same angle from the main one can be far apart from each other.
//! Angles are only meaningful relative to each other.

use crate::domain::{
    entities::{document::DocumentId, projections::AngleResult},
    projection_error::ProjectionError,
};

/// Computes the angle, in [0, π], between the main embedding and each cited embedding.
///
/// Results keep the order of `cited`.
#[tracing::instrument(name = "Projecting angles", skip(main, cited))]
pub fn project_angles<'a, I>(main: &[f64], cited: I) -> Result<Vec<AngleResult>, ProjectionError>
where
    I: IntoIterator<Item = (&'a DocumentId, &'a [f64])>,
{
    let main_unit = normalize(main).map_err(|e| match e {
        ProjectionError::DegenerateVector(message) => {
            ProjectionError::DegenerateVector(format!("main embedding: {}", message))
        }
        other => other,
    })?;

    cited
        .into_iter()
        .map(|(id, embedding)| {
            if embedding.len() != main_unit.len() {
                return Err(ProjectionError::ShapeMismatch(format!(
                    "embedding of document {} has {} components, main embedding has {}",
                    id,
                    embedding.len(),
                    main_unit.len()
                )));
            }

            let cited_unit = normalize(embedding).map_err(|_| {
                ProjectionError::DegenerateVector(format!(
                    "embedding of document {} has no direction",
                    id
                ))
            })?;

            let cosine: f64 = main_unit
                .iter()
                .zip(cited_unit.iter())
                .map(|(a, b)| a * b)
                .sum();
            // Rounding can push the cosine of (almost) colinear vectors slightly out of [-1, 1]
            let cosine = cosine.clamp(-1.0, 1.0);

            Ok(AngleResult {
                id: id.clone(),
                angle: cosine.acos(),
            })
        })
        .collect()
}

/// Scales a vector to unit length.
///
/// The vector is first divided by its largest absolute component, so the sum of squares
/// can neither overflow nor underflow. Only a null or non-finite vector has no direction.
fn normalize(vector: &[f64]) -> Result<Vec<f64>, ProjectionError> {
    let largest = vector.iter().map(|v| v.abs()).fold(0.0, f64::max);

    if largest == 0.0 || !largest.is_finite() || vector.iter().any(|v| v.is_nan()) {
        return Err(ProjectionError::DegenerateVector(format!(
            "vector of {} components has a largest component of {}",
            vector.len(),
            largest
        )));
    }

    let scaled: Vec<f64> = vector.iter().map(|v| v / largest).collect();
    let norm = scaled.iter().map(|v| v * v).sum::<f64>().sqrt();

    Ok(scaled.into_iter().map(|v| v / norm).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::assert_err;
    use quickcheck::TestResult;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn project(main: &[f64], cited: &[Vec<f64>]) -> Result<Vec<AngleResult>, ProjectionError> {
        let ids: Vec<DocumentId> = (0..cited.len() as i64).map(DocumentId::from).collect();
        project_angles(
            main,
            ids.iter().zip(cited.iter().map(Vec::as_slice)),
        )
    }

    #[test]
    fn orthogonal_embeddings_are_at_a_right_angle() {
        let angles = project(&[1.0, 0.0, 0.0], &[vec![0.0, 1.0, 0.0]]).unwrap();

        assert!((angles[0].angle - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn identical_embeddings_are_at_a_null_angle() {
        let angles = project(&[1.0, 0.0, 0.0], &[vec![1.0, 0.0, 0.0]]).unwrap();

        assert_eq!(angles[0].angle, 0.0);
    }

    #[test]
    fn opposite_embeddings_are_at_pi() {
        let angles = project(&[0.3, 0.4], &[vec![-3.0, -4.0]]).unwrap();

        assert!((angles[0].angle - PI).abs() < 1e-6);
    }

    #[test]
    fn colinear_embeddings_of_different_norms_never_produce_nan() {
        let main = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
        let cited: Vec<f64> = main.iter().map(|v| v * 1234.5678).collect();

        let angles = project(&main, &[cited]).unwrap();

        assert!(angles[0].angle.is_finite());
        assert!(angles[0].angle < 1e-6);
    }

    #[test]
    fn huge_embeddings_keep_their_direction() {
        let angles = project(&[1e200, 0.0], &[vec![0.0, 1.0]]).unwrap();

        assert!((angles[0].angle - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn tiny_embeddings_keep_their_direction() {
        let angles = project(&[1e-170, 0.0], &[vec![0.0, 1.0], vec![0.0, 5e-324]]).unwrap();

        assert!((angles[0].angle - FRAC_PI_2).abs() < 1e-12);
        assert!((angles[1].angle - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn a_non_finite_embedding_is_degenerate() {
        let result = project(&[1.0, 0.0], &[vec![f64::NAN, 1.0]]);

        assert!(matches!(
            assert_err!(result),
            ProjectionError::DegenerateVector(_)
        ));
    }

    #[test]
    fn results_keep_the_order_of_cited_documents() {
        let ids = [DocumentId::from("b"), DocumentId::from("a")];
        let embeddings = [vec![0.0, 1.0], vec![1.0, 0.0]];

        let angles = project_angles(
            &[1.0, 0.0],
            ids.iter().zip(embeddings.iter().map(Vec::as_slice)),
        )
        .unwrap();

        assert_eq!(angles[0].id, DocumentId::from("b"));
        assert_eq!(angles[1].id, DocumentId::from("a"));
        assert_eq!(angles[1].angle, 0.0);
    }

    #[test]
    fn a_zero_main_embedding_is_degenerate() {
        let result = project(&[0.0, 0.0, 0.0], &[vec![1.0, 0.0, 0.0]]);

        assert!(matches!(
            assert_err!(result),
            ProjectionError::DegenerateVector(_)
        ));
    }

    #[test]
    fn a_zero_cited_embedding_is_degenerate() {
        let result = project(&[1.0, 0.0], &[vec![0.0, 0.0]]);

        assert!(matches!(
            assert_err!(result),
            ProjectionError::DegenerateVector(_)
        ));
    }

    #[test]
    fn embeddings_of_different_dimensions_are_rejected() {
        let result = project(&[1.0, 0.0, 0.0], &[vec![1.0, 0.0]]);

        assert!(matches!(
            assert_err!(result),
            ProjectionError::ShapeMismatch(_)
        ));
    }

    #[test]
    fn no_cited_documents_gives_no_angles() {
        assert!(project(&[1.0], &[]).unwrap().is_empty());
    }

    #[quickcheck_macros::quickcheck]
    fn angle_is_the_arccosine_of_the_clamped_cosine(pairs: Vec<(i16, i16)>) -> TestResult {
        let main: Vec<f64> = pairs.iter().map(|(a, _)| *a as f64).collect();
        let cited: Vec<f64> = pairs.iter().map(|(_, b)| *b as f64).collect();
        let norm = |v: &[f64]| v.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm(&main) == 0.0 || norm(&cited) == 0.0 {
            return TestResult::discard();
        }

        let angle = project(&main, &[cited.clone()]).unwrap()[0].angle;

        let cosine = main.iter().zip(cited.iter()).map(|(a, b)| a * b).sum::<f64>()
            / (norm(&main) * norm(&cited));
        let expected = cosine.clamp(-1.0, 1.0);

        TestResult::from_bool(
            (0.0..=PI).contains(&angle) && (angle.cos() - expected).abs() < 1e-9,
        )
    }
}
