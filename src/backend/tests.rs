//! Tests for the backend module

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::metrics::{
        CounterOpts, CounterVecOpts, GaugeOpts, HistogramOpts, SummaryOpts, SummaryVecOpts,
    };
    use crate::utils::error::MetricsError;

    #[test]
    fn test_label_key_is_order_independent() {
        let a = labels([("method", "GET"), ("code", "200")]);
        let b = labels([("code", "200"), ("method", "GET")]);
        assert_eq!(label_key(&a), label_key(&b));
        assert_eq!(label_key(&a), "code=200,method=GET");
    }

    #[test]
    fn test_null_backend_discards() {
        let backend = NullBackend;
        assert_eq!(backend.name(), "none");

        let counter = backend.counter(&CounterOpts::new("c", "help")).unwrap();
        counter.inc().unwrap();
        counter.add(-5.0).unwrap();

        let summary = backend.summary(&SummaryOpts::new("s", "help")).unwrap();
        summary.observe(3.0).unwrap();
        assert_eq!(summary.quantile(0.5).unwrap(), 0.0);
    }

    #[test]
    fn test_memory_backend_records_values() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.name(), "memory");

        let counter = backend.counter(&CounterOpts::new("requests", "help")).unwrap();
        counter.inc().unwrap();
        counter.add(2.5).unwrap();
        assert_eq!(backend.counter_value("requests"), 3.5);

        let gauge = backend.gauge(&GaugeOpts::new("inflight", "help")).unwrap();
        gauge.set(10.0).unwrap();
        gauge.dec().unwrap();
        assert_eq!(backend.gauge_value("inflight"), Some(9.0));
        assert_eq!(backend.gauge_value("missing"), None);

        assert_eq!(backend.calls(), 4);
        assert_eq!(backend.constructed(), 2);
        assert!(backend.has_metric("requests"));
    }

    #[test]
    fn test_memory_backend_rejects_negative_counter_increment() {
        let backend = MemoryBackend::new();
        let counter = backend.counter(&CounterOpts::new("requests", "help")).unwrap();
        let err = counter.add(-1.0).unwrap_err();
        assert!(matches!(err, MetricsError::InvalidValue(_)));
        assert_eq!(backend.counter_value("requests"), 0.0);
    }

    #[test]
    fn test_memory_backend_labeled_series_are_separate() {
        let backend = MemoryBackend::new();
        let counter = backend
            .counter_vec(&CounterVecOpts::new("hits", "help", &["route"]))
            .unwrap();
        let home = labels([("route", "/")]);
        let about = labels([("route", "/about")]);

        counter.inc(&home).unwrap();
        counter.inc(&home).unwrap();
        counter.inc(&about).unwrap();

        assert_eq!(backend.labeled_value("hits", &home), Some(2.0));
        assert_eq!(backend.labeled_value("hits", &about), Some(1.0));
    }

    #[test]
    fn test_memory_backend_summary_quantiles() {
        let backend = MemoryBackend::new();
        let summary = backend
            .summary_vec(&SummaryVecOpts::new("latency", "help", &["op"]))
            .unwrap();
        let read = labels([("op", "read")]);
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            summary.observe(v, &read).unwrap();
        }
        assert_eq!(summary.quantile(0.5, &read).unwrap(), 3.0);
        assert_eq!(summary.quantile(0.5, &labels([("op", "write")])).unwrap(), 0.0);
        assert_eq!(backend.labeled_observations("latency", &read).len(), 5);
    }

    #[test]
    fn test_memory_backend_construction_failure() {
        let backend = MemoryBackend::new();
        backend.fail_construction("broken");

        let err = backend.histogram(&HistogramOpts::new("broken", "help")).err().unwrap();
        assert!(err.is_registration());
        assert_eq!(backend.constructed(), 0);

        backend.allow_construction("broken");
        assert!(backend.histogram(&HistogramOpts::new("broken", "help")).is_ok());
        assert_eq!(backend.constructed(), 1);
    }

    #[cfg(feature = "prometheus")]
    mod prometheus_backend {
        use super::*;

        #[test]
        fn test_counter_is_exported() {
            let backend = PrometheusBackend::new();
            let counter = backend
                .counter(&CounterOpts::new("web_requests_total", "Requests served"))
                .unwrap();
            counter.inc().unwrap();
            counter.add(2.0).unwrap();

            let text = backend.gather_text().unwrap();
            assert!(text.contains("# HELP web_requests_total Requests served"));
            assert!(text.contains("web_requests_total 3"));
        }

        #[test]
        fn test_negative_counter_increment_is_rejected() {
            let backend = PrometheusBackend::new();
            let counter = backend.counter(&CounterOpts::new("jobs_total", "Jobs")).unwrap();
            assert!(matches!(
                counter.add(-1.0),
                Err(MetricsError::InvalidValue(_))
            ));
        }

        #[test]
        fn test_duplicate_registration_fails() {
            let backend = PrometheusBackend::new();
            backend.gauge(&GaugeOpts::new("depth", "Depth")).unwrap();
            let err = backend.gauge(&GaugeOpts::new("depth", "Depth")).err().unwrap();
            assert!(err.is_registration());
        }

        #[test]
        fn test_empty_help_is_accepted() {
            let backend = PrometheusBackend::new();
            assert!(backend.counter(&CounterOpts::new("bare_total", "")).is_ok());
        }

        #[test]
        fn test_labeled_counter() {
            let backend = PrometheusBackend::new();
            let counter = backend
                .counter_vec(&CounterVecOpts::new("calls_total", "Calls", &["method"]))
                .unwrap();
            counter.inc(&labels([("method", "GET")])).unwrap();

            let text = backend.gather_text().unwrap();
            assert!(text.contains("calls_total{method=\"GET\"} 1"));

            // Wrong label names are a backend error, not a panic
            assert!(counter.inc(&labels([("verb", "GET")])).is_err());
        }

        #[test]
        fn test_summary_quantiles_limited_to_objectives() {
            let backend = PrometheusBackend::new();
            let summary = backend
                .summary(
                    &SummaryOpts::new("payload_bytes", "Payload sizes")
                        .with_objectives(vec![(0.5, 0.05), (0.99, 0.001)]),
                )
                .unwrap();
            for v in [10.0, 20.0, 30.0] {
                summary.observe(v).unwrap();
            }

            assert_eq!(summary.quantile(0.5).unwrap(), 20.0);
            assert!(matches!(
                summary.quantile(0.9),
                Err(MetricsError::QuantileUnavailable(_))
            ));
            assert!(backend.gather_text().unwrap().contains("payload_bytes_count 3"));
        }
    }
}
