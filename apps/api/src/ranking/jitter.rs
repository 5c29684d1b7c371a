use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// How jitter draws are produced for a ranking request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JitterMode {
    /// Every draw is zero.
    Off,
    /// Fresh entropy on every evaluation.
    #[default]
    Live,
    /// Draws are derived from `(project id, now / bucket_secs)`, so repeated
    /// requests inside one bucket see identical ordering.
    Bucketed { bucket_secs: u64 },
}

/// Per-request source of draws in `[0, 1)`. Lives only for one ranking pass.
pub enum JitterSource {
    Off,
    Live(StdRng),
    Bucketed { bucket: i64 },
    #[cfg(test)]
    Fixed(f64),
}

impl JitterSource {
    pub fn for_request(mode: JitterMode, now: DateTime<Utc>) -> Self {
        match mode {
            JitterMode::Off => JitterSource::Off,
            JitterMode::Live => JitterSource::Live(StdRng::from_entropy()),
            JitterMode::Bucketed { bucket_secs } => {
                let width = i64::try_from(bucket_secs.max(1)).unwrap_or(i64::MAX);
                JitterSource::Bucketed {
                    bucket: now.timestamp().div_euclid(width),
                }
            }
        }
    }

    pub fn draw(&mut self, project_id: i64) -> f64 {
        match self {
            JitterSource::Off => 0.0,
            JitterSource::Live(rng) => rng.gen::<f64>(),
            JitterSource::Bucketed { bucket } => {
                let mut rng = StdRng::seed_from_u64(bucket_seed(project_id, *bucket));
                rng.gen::<f64>()
            }
            #[cfg(test)]
            JitterSource::Fixed(r) => *r,
        }
    }
}

fn bucket_seed(project_id: i64, bucket: i64) -> u64 {
    (project_id as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ (bucket as u64).rotate_left(32)
}
