//! Work distribution for per-entity computation.
//!
//! Keys are evaluated on a rayon pool capped at `workers` threads. Each key
//! produces its own result and the indexed collect keeps input order, so no
//! state is shared between workers.

use crate::error::{AnalyticsError, AnalyticsResult};
use rayon::prelude::*;

/// Apply `f` to every key on up to `workers` threads, results in input order.
pub fn fan_out<K, R, F>(keys: &[K], workers: usize, f: F) -> AnalyticsResult<Vec<R>>
where
    K: Sync,
    R: Send,
    F: Fn(&K) -> R + Sync + Send,
{
    if workers <= 1 || keys.len() <= 1 {
        return Ok(keys.iter().map(f).collect());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|e| AnalyticsError::Other(anyhow::anyhow!("worker pool: {e}")))?;
    Ok(pool.install(|| keys.par_iter().map(f).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_input_order_across_workers() {
        let keys: Vec<i64> = (0..101).collect();
        let single = fan_out(&keys, 1, |k| k * 2).unwrap();
        let many = fan_out(&keys, 7, |k| k * 2).unwrap();
        assert_eq!(single, many);
        assert_eq!(many[100], 200);
    }

    #[test]
    fn handles_empty_input() {
        let keys: Vec<i64> = Vec::new();
        assert!(fan_out(&keys, 4, |k| *k).unwrap().is_empty());
    }
}
