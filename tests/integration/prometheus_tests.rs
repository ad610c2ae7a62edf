//! Prometheus export integration tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use umami::*;

    #[test]
    fn test_upgraded_metrics_are_exported() {
        let prometheus = PrometheusBackend::new();
        let registry = Registry::new(Level::Disabled);
        let web = registry.new_group("web", Arc::new(prometheus.clone()), &[]);
        let requests = web.counter(CounterOpts::new("requests_total", "Requests served"), Level::Important);

        requests.inc(&web.context()).unwrap();
        assert!(!prometheus.gather_text().unwrap().contains("web_requests_total"));

        registry.set_global_level(Level::Important, LevelOpts::replace_noops());
        requests.inc(&web.context()).unwrap();
        requests.inc(&web.context()).unwrap();

        let text = prometheus.gather_text().unwrap();
        assert!(text.contains("# HELP web_requests_total Requests served"));
        assert!(text.contains("web_requests_total 2"));
    }

    #[test]
    fn test_composite_components_are_exported() {
        let prometheus = PrometheusBackend::new();
        let registry = Registry::new(Level::Verbose);
        let sessions = registry.new_group("sessions", Arc::new(prometheus.clone()), &[]);
        let cache = sessions.cache(CacheOpts::new("store", "Session store"), Level::Important);

        let ctx = sessions.context();
        cache.hit(&ctx).unwrap();
        cache.set_size(&ctx, 512).unwrap();

        let text = prometheus.gather_text().unwrap();
        assert!(text.contains("sessions_store_hits_total 1"));
        assert!(text.contains("sessions_store_misses_total 0"));
        assert!(text.contains("sessions_store_size_bytes 512"));
    }

    #[test]
    fn test_duplicate_registration_leaves_noop_pending() {
        let prometheus = PrometheusBackend::new();
        let first = Registry::new(Level::Verbose);
        let second = Registry::new(Level::Verbose);

        let original = first
            .new_group("web", Arc::new(prometheus.clone()), &[])
            .counter(CounterOpts::new("requests_total", "help"), Level::Important);
        let clash_group = second.new_group("web", Arc::new(prometheus.clone()), &[]);
        let clash = clash_group.counter(CounterOpts::new("requests_total", "help"), Level::Important);

        assert!(!original.is_noop());
        assert!(clash.is_noop());
        assert_eq!(clash_group.pending_upgrades(), vec!["web_requests_total".to_string()]);

        // Recording through the noop is silently dropped
        clash.inc(&clash_group.context()).unwrap();
        assert!(prometheus.gather_text().unwrap().contains("web_requests_total 0"));
    }
}
