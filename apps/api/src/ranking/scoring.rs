//! Score model — turns one project record into an ephemeral rank key.
//!
//! `RankKey = B(platform) + T(created_at, now) + A(counters) + J(r)` in scalar
//! mode, or the tuple `(B, T, A)` in tiered mode. Keys are only meaningful
//! within one evaluation and are never persisted or returned to callers.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::project::{Platform, ProjectRecord};

pub const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankingMode {
    /// Sum every component, jitter included, into one scalar.
    #[default]
    Scalar,
    /// Order by (platform, time, activity) lexicographically. No jitter.
    Tiered,
}

#[derive(Debug, Clone)]
pub struct PlatformWeights {
    pub sexy: f64,
    pub pump: f64,
    pub other: f64,
}

impl Default for PlatformWeights {
    fn default() -> Self {
        Self {
            sexy: 100_000.0,
            pump: 100.0,
            other: 0.0,
        }
    }
}

impl PlatformWeights {
    pub fn weight(&self, platform: Platform) -> f64 {
        match platform {
            Platform::Sexy => self.sexy,
            Platform::Pump => self.pump,
            Platform::Other => self.other,
        }
    }
}

/// Coefficients on `ln(1 + count)` for each engagement counter.
#[derive(Debug, Clone)]
pub struct ActivityWeights {
    pub share: f64,
    pub like: f64,
    pub post_launch_like: f64,
    pub comment: f64,
}

impl Default for ActivityWeights {
    fn default() -> Self {
        Self {
            share: 5.0,
            like: 3.0,
            post_launch_like: 1.0,
            comment: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScoreConfig {
    pub mode: RankingMode,
    pub platform: PlatformWeights,
    pub activity: ActivityWeights,
    /// Multiplier on the `unix_days * decay` term.
    pub time_scale: f64,
    /// Exponential decay per day of age.
    pub decay_rate: f64,
    /// Jitter ceiling as a fraction of the platform base weight.
    pub jitter_fraction: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            mode: RankingMode::Scalar,
            platform: PlatformWeights::default(),
            activity: ActivityWeights::default(),
            time_scale: 1.0,
            decay_rate: 0.05,
            jitter_fraction: 0.01,
        }
    }
}

/// The four scoring terms for one record. Never serialized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreComponents {
    pub platform: f64,
    pub time: f64,
    pub activity: f64,
    pub jitter: f64,
}

impl ScoreComponents {
    pub fn total(&self) -> f64 {
        self.platform + self.time + self.activity + self.jitter
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RankKey {
    Scalar(f64),
    Tiered {
        platform: f64,
        time: f64,
        activity: f64,
    },
}

impl RankKey {
    /// Ascending comparison. Callers reverse it for "highest first".
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (RankKey::Scalar(a), RankKey::Scalar(b)) => a.total_cmp(b),
            (
                RankKey::Tiered {
                    platform: pa,
                    time: ta,
                    activity: aa,
                },
                RankKey::Tiered {
                    platform: pb,
                    time: tb,
                    activity: ab,
                },
            ) => pa
                .total_cmp(pb)
                .then_with(|| ta.total_cmp(tb))
                .then_with(|| aa.total_cmp(ab)),
            // Keys from different modes never meet within one evaluation.
            _ => Ordering::Equal,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("project {id}: {component} component is not finite ({value})")]
    NonFinite {
        id: i64,
        component: &'static str,
        value: f64,
    },
}

#[derive(Debug, Clone, Default)]
pub struct ScoreModel {
    config: ScoreConfig,
}

impl ScoreModel {
    pub fn new(config: ScoreConfig) -> Self {
        Self { config }
    }

    /// Evaluates every scoring term. `r` is the jitter draw in `[0, 1)` and
    /// is ignored in tiered mode.
    pub fn components(
        &self,
        record: &ProjectRecord,
        now: DateTime<Utc>,
        r: f64,
    ) -> ScoreComponents {
        let platform = self.config.platform.weight(record.platform());
        let time = compute_time_decay(
            record.created_at,
            now,
            self.config.time_scale,
            self.config.decay_rate,
        );
        let activity = compute_activity(record, &self.config.activity);
        let jitter = match self.config.mode {
            RankingMode::Scalar => compute_jitter(r, self.config.jitter_fraction, platform),
            RankingMode::Tiered => 0.0,
        };
        ScoreComponents {
            platform,
            time,
            activity,
            jitter,
        }
    }

    /// Builds the rank key, rejecting any NaN or infinite term.
    pub fn rank_key(
        &self,
        record: &ProjectRecord,
        now: DateTime<Utc>,
        r: f64,
    ) -> Result<RankKey, ScoreError> {
        let c = self.components(record, now, r);
        let finite = |component: &'static str, value: f64| {
            if value.is_finite() {
                Ok(value)
            } else {
                Err(ScoreError::NonFinite {
                    id: record.id,
                    component,
                    value,
                })
            }
        };

        match self.config.mode {
            RankingMode::Scalar => {
                finite("platform", c.platform)?;
                finite("time", c.time)?;
                finite("activity", c.activity)?;
                finite("jitter", c.jitter)?;
                Ok(RankKey::Scalar(finite("total", c.total())?))
            }
            RankingMode::Tiered => Ok(RankKey::Tiered {
                platform: finite("platform", c.platform)?,
                time: finite("time", c.time)?,
                activity: finite("activity", c.activity)?,
            }),
        }
    }
}

/// Whole calendar days from `created_at` to `now`, never negative.
pub fn days_between(now: DateTime<Utc>, created_at: DateTime<Utc>) -> i64 {
    (now.date_naive() - created_at.date_naive())
        .num_days()
        .max(0)
}

/// `(unix_seconds / 86400) * time_scale * exp(-decay_rate * age_days)`
pub fn compute_time_decay(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    time_scale: f64,
    decay_rate: f64,
) -> f64 {
    let unix_days = created_at.timestamp() as f64 / SECONDS_PER_DAY;
    let age_days = days_between(now, created_at) as f64;
    unix_days * time_scale * (-decay_rate * age_days).exp()
}

/// Weighted sum of `ln(1 + count)` over the engagement counters.
/// Negative counters are treated as zero.
pub fn compute_activity(record: &ProjectRecord, weights: &ActivityWeights) -> f64 {
    let log_count = |count: i64| (count.max(0) as f64).ln_1p();
    weights.share * log_count(record.share_count)
        + weights.like * log_count(record.like_count)
        + weights.post_launch_like * log_count(record.post_launch_like_count)
        + weights.comment * log_count(record.comment_count)
}

/// `r * fraction * base`, with `r` pinned to `[0, 1]`. Never negative.
pub fn compute_jitter(r: f64, fraction: f64, base: f64) -> f64 {
    let r = if r.is_finite() { r.clamp(0.0, 1.0) } else { 0.0 };
    (r * fraction * base).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn make_record(id: i64, platform: &str, created_at: DateTime<Utc>) -> ProjectRecord {
        ProjectRecord {
            id,
            platform: platform.to_string(),
            time: 0,
            share_count: 0,
            like_count: 0,
            post_launch_like_count: 0,
            comment_count: 0,
            status: 0,
            created_at,
            updated_at: created_at,
        }
    }

    fn no_jitter() -> ScoreModel {
        ScoreModel::new(ScoreConfig {
            jitter_fraction: 0.0,
            ..ScoreConfig::default()
        })
    }

    fn scalar(key: RankKey) -> f64 {
        match key {
            RankKey::Scalar(v) => v,
            other => panic!("expected scalar key, got {other:?}"),
        }
    }

    #[test]
    fn test_default_platform_weights() {
        let w = PlatformWeights::default();
        assert_eq!(w.weight(Platform::Sexy), 100_000.0);
        assert_eq!(w.weight(Platform::Pump), 100.0);
        assert_eq!(w.weight(Platform::Other), 0.0);
    }

    #[test]
    fn test_extreme_counters_stay_finite() {
        let model = ScoreModel::default();
        let mut record = make_record(1, "sexy", now());
        record.share_count = i64::MAX;
        record.like_count = i64::MAX;
        record.post_launch_like_count = i64::MAX;
        record.comment_count = i64::MAX;

        let value = scalar(model.rank_key(&record, now(), 0.999).unwrap());
        assert!(value.is_finite(), "Score was {value}");
    }

    #[test]
    fn test_zero_counters_and_epoch_stay_finite() {
        let model = ScoreModel::default();
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        let record = make_record(1, "unknown", epoch);
        let value = scalar(model.rank_key(&record, now(), 0.0).unwrap());
        assert!(value.is_finite());
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_negative_counters_clamped_to_zero() {
        let weights = ActivityWeights::default();
        let mut record = make_record(1, "pump", now());
        record.share_count = -50;
        record.comment_count = -1;
        assert_eq!(compute_activity(&record, &weights), 0.0);
    }

    #[test]
    fn test_activity_monotonic_in_each_counter() {
        let weights = ActivityWeights::default();
        let base = make_record(1, "pump", now());
        let baseline = compute_activity(&base, &weights);

        let bumps: [fn(&mut ProjectRecord); 4] = [
            |r| r.share_count += 1,
            |r| r.like_count += 1,
            |r| r.post_launch_like_count += 1,
            |r| r.comment_count += 1,
        ];
        for bump in bumps {
            let mut record = base.clone();
            bump(&mut record);
            assert!(compute_activity(&record, &weights) > baseline);
        }
    }

    #[test]
    fn test_activity_matches_log_formula() {
        let mut record = make_record(1, "pump", now());
        record.share_count = 10;
        record.like_count = 5;
        record.comment_count = 2;
        // 5*ln(11) + 3*ln(6) + 0 + ln(3)
        let expected = 5.0 * 11f64.ln() + 3.0 * 6f64.ln() + 3f64.ln();
        let actual = compute_activity(&record, &ActivityWeights::default());
        assert!((actual - expected).abs() < 1e-9, "Activity was {actual}");
    }

    #[test]
    fn test_time_decay_no_age_is_unix_days() {
        let t = compute_time_decay(now(), now(), 1.0, 0.05);
        let expected = now().timestamp() as f64 / SECONDS_PER_DAY;
        assert!((t - expected).abs() < 1e-9);
    }

    #[test]
    fn test_time_decay_applies_exponential_age_penalty() {
        let created = now() - Duration::days(10);
        let t = compute_time_decay(created, now(), 1.0, 0.05);
        let expected = created.timestamp() as f64 / SECONDS_PER_DAY * (-0.5f64).exp();
        assert!((t - expected).abs() < 1e-9);
    }

    #[test]
    fn test_newer_record_never_has_lower_time_weight() {
        let mut previous = f64::MIN;
        for age in (0..=120).rev() {
            let created = now() - Duration::days(age);
            let t = compute_time_decay(created, now(), 1.0, 0.05);
            assert!(t >= previous, "age {age} days scored {t} < {previous}");
            previous = t;
        }
    }

    #[test]
    fn test_same_day_later_timestamp_wins() {
        let morning = Utc.with_ymd_and_hms(2024, 6, 1, 1, 0, 0).unwrap();
        let noon = Utc.with_ymd_and_hms(2024, 6, 1, 11, 0, 0).unwrap();
        assert!(
            compute_time_decay(noon, now(), 1.0, 0.05)
                > compute_time_decay(morning, now(), 1.0, 0.05)
        );
    }

    #[test]
    fn test_days_between_uses_calendar_days() {
        let late_yesterday = Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 0).unwrap();
        assert_eq!(days_between(now(), late_yesterday), 1);
        assert_eq!(days_between(now(), now()), 0);
    }

    #[test]
    fn test_future_created_at_treated_as_age_zero() {
        let future = now() + Duration::days(3);
        assert_eq!(days_between(now(), future), 0);
    }

    #[test]
    fn test_jitter_bounded_by_fraction_of_base() {
        assert_eq!(compute_jitter(0.0, 0.01, 100_000.0), 0.0);
        let high = compute_jitter(0.999_999, 0.01, 100_000.0);
        assert!(high > 0.0 && high < 1_000.0, "Jitter was {high}");
    }

    #[test]
    fn test_jitter_never_negative() {
        assert_eq!(compute_jitter(-5.0, 0.01, 100.0), 0.0);
        assert_eq!(compute_jitter(0.5, 0.01, -100.0), 0.0);
        assert_eq!(compute_jitter(f64::NAN, 0.01, 100.0), 0.0);
    }

    #[test]
    fn test_unknown_platform_gets_no_jitter() {
        let model = ScoreModel::default();
        let record = make_record(1, "zora", now());
        assert_eq!(model.components(&record, now(), 0.9).jitter, 0.0);
    }

    #[test]
    fn test_sexy_dominates_pump_despite_activity_and_age() {
        let model = no_jitter();
        let old_sexy = make_record(1, "sexy", now() - Duration::days(365));
        let mut viral_pump = make_record(2, "pump", now());
        viral_pump.share_count = i64::MAX;
        viral_pump.like_count = i64::MAX;
        viral_pump.post_launch_like_count = i64::MAX;
        viral_pump.comment_count = i64::MAX;

        let sexy = scalar(model.rank_key(&old_sexy, now(), 0.0).unwrap());
        let pump = scalar(model.rank_key(&viral_pump, now(), 0.0).unwrap());
        assert!(sexy > pump, "sexy {sexy} vs pump {pump}");
    }

    #[test]
    fn test_reference_scenario_sexy_beats_busy_pump() {
        let model = no_jitter();
        let mut first = make_record(1, "sexy", now() - Duration::days(1));
        first.share_count = 10;
        first.like_count = 5;
        first.comment_count = 2;
        let mut second = make_record(2, "pump", now());
        second.share_count = 1000;
        second.like_count = 1000;
        second.post_launch_like_count = 1000;
        second.comment_count = 1000;

        let a = model.rank_key(&first, now(), 0.0).unwrap();
        let b = model.rank_key(&second, now(), 0.0).unwrap();
        assert_eq!(a.compare(&b), Ordering::Greater);
    }

    #[test]
    fn test_tiered_orders_platform_first() {
        let model = ScoreModel::new(ScoreConfig {
            mode: RankingMode::Tiered,
            ..ScoreConfig::default()
        });
        let pump = make_record(1, "pump", now() - Duration::days(400));
        let other = make_record(2, "other", now());

        let pump_key = model.rank_key(&pump, now(), 0.5).unwrap();
        let other_key = model.rank_key(&other, now(), 0.5).unwrap();
        assert_eq!(pump_key.compare(&other_key), Ordering::Greater);
        assert_eq!(model.components(&pump, now(), 0.5).jitter, 0.0);
    }

    #[test]
    fn test_tiered_falls_through_to_time_then_activity() {
        let newer = RankKey::Tiered {
            platform: 100.0,
            time: 20.0,
            activity: 0.0,
        };
        let older_busier = RankKey::Tiered {
            platform: 100.0,
            time: 19.0,
            activity: 400.0,
        };
        assert_eq!(newer.compare(&older_busier), Ordering::Greater);

        let busier = RankKey::Tiered {
            platform: 100.0,
            time: 20.0,
            activity: 1.0,
        };
        assert_eq!(busier.compare(&newer), Ordering::Greater);
    }

    #[test]
    fn test_infinite_weight_reports_non_finite() {
        let model = ScoreModel::new(ScoreConfig {
            platform: PlatformWeights {
                other: f64::INFINITY,
                ..PlatformWeights::default()
            },
            ..ScoreConfig::default()
        });
        let record = make_record(9, "other", now());
        let err = model.rank_key(&record, now(), 0.0).unwrap_err();
        assert!(matches!(
            err,
            ScoreError::NonFinite {
                id: 9,
                component: "platform",
                ..
            }
        ));
    }
}
