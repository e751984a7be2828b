//! Outcome sampling for automatically resolved jobs.

use rand::rngs::StdRng;
use rand_distr::{Binomial, Distribution};
use tracing::debug;

use qhandle_hal::{Counts, HalError, HalResult};

/// Draw `shots` outcomes of width `width`, each one either all zeros or all
/// ones with equal probability.
///
/// This is the histogram shape of a GHZ preparation; no program is
/// interpreted. The number of all-ones outcomes is a single binomial draw,
/// so the cost does not grow with `shots`.
pub(crate) fn sample_ghz(rng: &mut StdRng, width: u32, shots: u32) -> HalResult<Counts> {
    let zeros = "0".repeat(width as usize);
    let ones = "1".repeat(width as usize);

    let binomial = Binomial::new(u64::from(shots), 0.5)
        .map_err(|e| HalError::Platform(format!("cannot sample {shots} shots: {e}")))?;
    let hits_ones = binomial.sample(rng);
    let hits_zeros = u64::from(shots) - hits_ones;
    debug!("Sampled {} shots: {} zeros, {} ones", shots, hits_zeros, hits_ones);

    let mut counts = Counts::new();
    if hits_zeros > 0 {
        counts.insert(zeros, hits_zeros);
    }
    if hits_ones > 0 {
        counts.insert(ones, hits_ones);
    }
    Ok(counts)
}
