//! Enablement integration tests
//!
//! A call reaches the backend only when both the declaration and the calling
//! context admit it, by level and by mask.

#[cfg(test)]
mod tests {
    use crate::common::TestMetrics;
    use umami::*;

    #[test]
    fn test_disabled_context_never_reaches_backend() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("api");
        let counter = group.counter(CounterOpts::new("requests_total", "help"), Level::Critical);
        let gauge = group.gauge(GaugeOpts::new("in_flight", "help"), Level::Critical);
        let histogram = group.histogram(HistogramOpts::new("latency", "help"), Level::Critical);

        let off = Context::disabled();
        counter.inc(&off).unwrap();
        counter.add(&off, 10.0).unwrap();
        gauge.set(&off, 3.0).unwrap();
        histogram.observe(&off, 0.25).unwrap();

        assert_eq!(metrics.backend.calls(), 0);
    }

    #[test]
    fn test_context_level_gates_each_call() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("api");
        let detailed = group.counter(CounterOpts::new("detailed_total", "help"), Level::Debug);
        assert!(!detailed.is_noop());

        detailed.inc(&Context::at(Level::Important)).unwrap();
        assert_eq!(metrics.backend.counter_value("api_detailed_total"), 0.0);

        detailed.inc(&Context::at(Level::Debug)).unwrap();
        detailed.inc(&Context::at(Level::Verbose)).unwrap();
        assert_eq!(metrics.backend.counter_value("api_detailed_total"), 2.0);
    }

    #[test]
    fn test_context_mask_gates_each_call() {
        let metrics = TestMetrics::with_policy(Level::Verbose, Mask::ALL);
        let group = metrics.group("api");
        let latency = group.histogram(
            HistogramOpts::new("latency_seconds", "help").with_mask(Mask::LATENCY),
            Level::Important,
        );

        latency
            .observe(&Context::new(Level::Verbose, Mask::COUNTERS), 0.1)
            .unwrap();
        assert!(metrics.backend.observations("api_latency_seconds").is_empty());

        latency
            .observe(&Context::new(Level::Verbose, Mask::ESSENTIAL), 0.2)
            .unwrap();
        assert_eq!(metrics.backend.observations("api_latency_seconds"), vec![0.2]);
    }

    #[test]
    fn test_group_level_decides_noop_at_creation() {
        let metrics = TestMetrics::new(Level::Important);
        let group = metrics.group("db");

        let critical = group.counter(CounterOpts::new("errors_total", "help"), Level::Critical);
        let important = group.counter(CounterOpts::new("queries_total", "help"), Level::Important);
        let debug = group.counter(CounterOpts::new("rows_total", "help"), Level::Debug);

        assert!(!critical.is_noop());
        assert!(!important.is_noop());
        assert!(debug.is_noop());
        assert!(metrics.backend.has_metric("db_errors_total"));
        assert!(!metrics.backend.has_metric("db_rows_total"));
        assert_eq!(group.pending_upgrades(), vec!["db_rows_total".to_string()]);
    }

    #[test]
    fn test_group_mask_decides_noop_at_creation() {
        let metrics = TestMetrics::with_policy(Level::Verbose, Mask::ESSENTIAL);
        let group = metrics.group("auth");

        let errors = group.counter(
            CounterOpts::new("failures_total", "help").with_mask(Mask::ERRORS),
            Level::Critical,
        );
        let per_user = group.counter(
            CounterOpts::new("logins_total", "help").with_mask(Mask::PER_USER),
            Level::Critical,
        );

        assert!(!errors.is_noop());
        assert!(per_user.is_noop());
    }

    #[test]
    fn test_critical_group_scenario() {
        let metrics = TestMetrics::with_policy(Level::Critical, Mask::ESSENTIAL);
        let group = metrics.group("checkout");
        let ctx = group.context();

        let per_user = group.counter(
            CounterOpts::new("user_events_total", "help").with_mask(Mask::PER_USER),
            Level::Debug,
        );
        per_user.inc(&ctx).unwrap();
        assert_eq!(metrics.backend.calls(), 0);

        let orders = group.counter(
            CounterOpts::new("orders_total", "help").with_mask(Mask::COUNTERS),
            Level::Critical,
        );
        orders.inc(&ctx).unwrap();
        orders.add(&ctx, 5.0).unwrap();
        assert_eq!(metrics.backend.calls(), 2);
        assert_eq!(metrics.backend.counter_value("checkout_orders_total"), 6.0);
    }

    #[test]
    fn test_disabled_summary_reports_zero() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("api");
        let summary = group.summary(
            SummaryOpts::new("payload_bytes", "help").with_objectives(vec![(0.5, 0.05)]),
            Level::Important,
        );

        let ctx = group.context();
        for value in [10.0, 20.0, 30.0] {
            summary.observe(&ctx, value).unwrap();
        }
        assert_eq!(summary.quantile(&ctx, 0.5).unwrap(), 20.0);
        assert_eq!(summary.quantile(&Context::disabled(), 0.5).unwrap(), 0.0);
    }

    #[test]
    fn test_backend_errors_propagate_when_enabled() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("api");
        let counter = group.counter(CounterOpts::new("bytes_total", "help"), Level::Critical);

        let err = counter.add(&group.context(), -1.0).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidValue(_)));

        // Suppressed calls never fail, even with bad input
        counter.add(&Context::disabled(), -1.0).unwrap();
    }

    #[test]
    fn test_labeled_series_are_independent() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("http");
        let requests = group.counter_vec(
            CounterVecOpts::new("requests_total", "help", &["method"]),
            Level::Important,
        );
        let ctx = group.context();

        requests.inc(&ctx, &labels([("method", "GET")])).unwrap();
        requests.inc(&ctx, &labels([("method", "GET")])).unwrap();
        requests.inc(&ctx, &labels([("method", "POST")])).unwrap();

        assert_eq!(
            metrics
                .backend
                .labeled_value("http_requests_total", &labels([("method", "GET")])),
            Some(2.0)
        );
        assert_eq!(
            metrics
                .backend
                .labeled_value("http_requests_total", &labels([("method", "POST")])),
            Some(1.0)
        );
    }
}
