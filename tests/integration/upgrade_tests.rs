//! Upgrade integration tests
//!
//! Handles created while disabled are switched to real metrics in place, so
//! every holder of the handle starts recording without re-fetching it.

#[cfg(test)]
mod tests {
    use crate::common::TestMetrics;
    use std::sync::Arc;
    use umami::*;

    #[test]
    fn test_existing_handles_start_recording_after_upgrade() {
        let metrics = TestMetrics::disabled();
        let group = metrics.group("worker");
        let jobs = group.counter(CounterOpts::new("jobs_total", "help"), Level::Debug);
        let held_elsewhere = Arc::clone(&jobs);

        jobs.inc(&group.context()).unwrap();
        assert_eq!(metrics.backend.calls(), 0);

        metrics
            .registry
            .set_global_level(Level::Debug, LevelOpts::replace_noops());

        held_elsewhere.inc(&group.context()).unwrap();
        assert_eq!(metrics.backend.calls(), 1);
        jobs.inc(&group.context()).unwrap();
        assert_eq!(metrics.backend.counter_value("worker_jobs_total"), 2.0);
    }

    #[test]
    fn test_refetch_after_upgrade_returns_same_handle() {
        let metrics = TestMetrics::disabled();
        let group = metrics.group("worker");
        let before = group.gauge(GaugeOpts::new("backlog", "help"), Level::Important);

        metrics
            .registry
            .set_global_level(Level::Important, LevelOpts::replace_noops());
        let after = group.gauge(GaugeOpts::new("backlog", "help"), Level::Important);

        assert!(Arc::ptr_eq(&before, &after));
        assert!(!after.is_noop());
        assert_eq!(metrics.backend.constructed(), 1);
    }

    #[test]
    fn test_upgrade_without_replace_keeps_noops() {
        let metrics = TestMetrics::disabled();
        let group = metrics.group("worker");
        let jobs = group.counter(CounterOpts::new("jobs_total", "help"), Level::Important);

        metrics
            .registry
            .set_global_level(Level::Verbose, LevelOpts::default());
        assert!(jobs.is_noop());

        // New declarations still get real metrics under the new level
        let fresh = group.counter(CounterOpts::new("fresh_total", "help"), Level::Important);
        assert!(!fresh.is_noop());
    }

    #[test]
    fn test_upgrade_is_selective() {
        let metrics = TestMetrics::disabled();
        let group = metrics.group("worker");
        let important = group.counter(CounterOpts::new("a_total", "help"), Level::Important);
        let verbose = group.counter(CounterOpts::new("b_total", "help"), Level::Verbose);

        metrics
            .registry
            .set_global_level(Level::Important, LevelOpts::replace_noops());
        assert!(!important.is_noop());
        assert!(verbose.is_noop());

        metrics
            .registry
            .set_global_level(Level::Verbose, LevelOpts::replace_noops());
        assert!(!verbose.is_noop());
        assert!(group.pending_upgrades().is_empty());
    }

    #[test]
    fn test_declared_level_survives_upgrade() {
        let metrics = TestMetrics::disabled();
        let group = metrics.group("worker");
        let jobs = group.counter(CounterOpts::new("jobs_total", "help"), Level::Debug);

        metrics
            .registry
            .set_global_level(Level::Verbose, LevelOpts::replace_noops());
        assert_eq!(jobs.level(), Level::Debug);

        jobs.inc(&Context::at(Level::Important)).unwrap();
        assert_eq!(metrics.backend.calls(), 0);
    }

    #[test]
    fn test_downgrade_gates_real_metrics() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("worker");
        let jobs = group.counter(CounterOpts::new("jobs_total", "help"), Level::Debug);
        assert!(!jobs.is_noop());

        metrics
            .registry
            .set_global_level(Level::Critical, LevelOpts::replace_noops());
        jobs.inc(&group.context()).unwrap();

        assert!(!jobs.is_noop());
        assert_eq!(metrics.backend.calls(), 0);
    }

    #[test]
    fn test_failed_upgrade_retries_later() {
        let metrics = TestMetrics::disabled();
        metrics.backend.fail_construction("worker_jobs_total");
        let group = metrics.group("worker");
        let jobs = group.counter(CounterOpts::new("jobs_total", "help"), Level::Important);

        metrics
            .registry
            .set_global_level(Level::Important, LevelOpts::replace_noops());
        assert!(jobs.is_noop());
        assert_eq!(group.pending_upgrades(), vec!["worker_jobs_total".to_string()]);

        metrics.backend.allow_construction("worker_jobs_total");
        metrics
            .registry
            .set_global_level(Level::Important, LevelOpts::replace_noops());
        assert!(!jobs.is_noop());
    }

    #[test]
    fn test_mask_widening_upgrades() {
        let metrics = TestMetrics::with_policy(Level::Verbose, Mask::ESSENTIAL);
        let group = metrics.group("cache");
        let evictions = group.counter(
            CounterOpts::new("evictions_total", "help").with_mask(Mask::CACHE),
            Level::Important,
        );
        assert!(evictions.is_noop());

        metrics
            .registry
            .set_global_mask(Mask::ALL, LevelOpts::replace_noops());
        assert!(!evictions.is_noop());

        evictions.inc(&group.context()).unwrap();
        assert_eq!(metrics.backend.counter_value("cache_evictions_total"), 1.0);
    }

    #[test]
    fn test_switch_impl_redirects_recording() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("worker");
        let jobs = group.counter(CounterOpts::new("jobs_total", "help"), Level::Important);

        let other = MemoryBackend::new();
        let replacement = <dyn Counter as BasicKind>::build(
            &CounterOpts::new("replacement_total", "help"),
            Level::Important,
            &other,
        )
        .unwrap();
        jobs.switch_impl(replacement);

        jobs.inc(&group.context()).unwrap();
        assert_eq!(metrics.backend.calls(), 0);
        assert_eq!(other.counter_value("replacement_total"), 1.0);
    }
}
