use rayon::prelude::*;
use thiserror::Error;

use crate::core::actions::cancellation::{CANCEL_CHECK_INTERVAL_PIXELS, CancelToken, Cancelled};
use crate::core::actions::generate_fractal::ports::fractal_algorithm::FractalAlgorithm;
use crate::core::data::point::Point;

/// Error type for cancelable fractal generation.
///
/// Distinguishes between algorithm failures and cancellation, allowing callers
/// to handle each case appropriately (e.g., not displaying cancellation as errors).
#[derive(Debug, Error)]
pub enum GenerateFractalError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("algorithm error: {0}")]
    Algorithm(#[source] E),
}

/// Computes every pixel of the algorithm's raster in one call, spreading rows
/// across rayon's work-stealing pool.
///
/// The token is polled at the start of each row and every
/// [`CANCEL_CHECK_INTERVAL_PIXELS`] pixels within a row. Results come back in
/// row-major order, the same layout the progressive generator fills.
pub fn generate_fractal_parallel_rayon<Alg, C>(
    algorithm: &Alg,
    cancel: &C,
) -> Result<Vec<Alg::Success>, GenerateFractalError<Alg::Failure>>
where
    Alg: FractalAlgorithm + Sync,
    Alg::Success: Send,
    Alg::Failure: Send + 'static,
    C: CancelToken,
{
    let resolution = algorithm.resolution();
    let width = resolution.width();
    let row_width = width as usize;

    let rows: Result<Vec<Vec<Alg::Success>>, GenerateFractalError<Alg::Failure>> =
        (0..resolution.height())
            .into_par_iter()
            .map(|y| {
                let mut row = Vec::with_capacity(row_width);

                for x in 0..width {
                    if (x as usize) % CANCEL_CHECK_INTERVAL_PIXELS == 0 && cancel.is_cancelled() {
                        return Err(GenerateFractalError::Cancelled(Cancelled));
                    }

                    let result = algorithm
                        .compute(Point { x, y })
                        .map_err(GenerateFractalError::Algorithm)?;
                    row.push(result);
                }

                Ok(row)
            })
            .collect();

    rows.map(|r| r.into_iter().flatten().collect())
}
