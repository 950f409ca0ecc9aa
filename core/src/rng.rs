//! Deterministic random number generation for sample datasets.
//!
//! RULE: Nothing in the crate may call any platform RNG.
//! All randomness flows through SampleRng instances derived from a
//! single master seed. Each record family gets its own stream, seeded
//! from (master_seed XOR stream_index), so changing how many customers
//! are generated never changes the product stream.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Deterministic RNG bound to one record stream.
pub struct SampleRng {
    stream: SampleStream,
    inner:  Pcg64Mcg,
}

impl SampleRng {
    pub fn for_stream(master_seed: u64, stream: SampleStream) -> Self {
        let derived_seed = master_seed ^ (stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            stream,
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn stream(&self) -> SampleStream {
        self.stream
    }

    /// Uniform in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen()
    }

    /// Uniform in [0, n). Returns 0 when n is 0.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.gen_range(0..n)
    }

    /// One element of `items`, None when empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let idx = self.next_u64_below(items.len() as u64) as usize;
        items.get(idx)
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.inner.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Heavy-tailed draw >= `x_min`; smaller `alpha` means a longer tail.
    pub fn pareto(&mut self, x_min: f64, alpha: f64) -> f64 {
        // 1 - [0, 1) keeps u away from zero.
        let u = 1.0 - self.next_f64();
        x_min * u.powf(-1.0 / alpha)
    }
}

/// Stable stream assignments.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum SampleStream {
    Customers = 0,
    Products  = 1,
    Sales     = 2,
}

impl SampleStream {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Products  => "products",
            Self::Sales     => "sales",
        }
    }
}
