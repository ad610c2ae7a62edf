//! Composite metric integration tests

#[cfg(test)]
mod tests {
    use crate::assert_approx_eq;
    use crate::common::TestMetrics;
    use std::time::Duration;
    use umami::*;

    #[test]
    fn test_cache_records_into_components() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("sessions");
        let cache = group.cache(CacheOpts::new("store", "Session store"), Level::Important);
        let ctx = group.context();

        cache.hit(&ctx).unwrap();
        cache.hit(&ctx).unwrap();
        cache.miss(&ctx).unwrap();
        cache.set_size(&ctx, 4096).unwrap();

        let backend = &metrics.backend;
        assert_eq!(backend.counter_value("sessions_store_hits_total"), 2.0);
        assert_eq!(backend.counter_value("sessions_store_misses_total"), 1.0);
        assert_eq!(backend.gauge_value("sessions_store_size_bytes"), Some(4096.0));
    }

    #[test]
    fn test_pool_records_into_components() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("db");
        let pool = group.pool(PoolOpts::new("connections", "help"), Level::Important);
        let ctx = group.context();

        pool.set_active(&ctx, 3).unwrap();
        pool.set_idle(&ctx, 7).unwrap();
        pool.acquired(&ctx).unwrap();
        pool.released(&ctx).unwrap();
        pool.released(&ctx).unwrap();

        let backend = &metrics.backend;
        assert_eq!(backend.gauge_value("db_connections_active"), Some(3.0));
        assert_eq!(backend.gauge_value("db_connections_idle"), Some(7.0));
        assert_eq!(backend.counter_value("db_connections_acquired_total"), 1.0);
        assert_eq!(backend.counter_value("db_connections_released_total"), 2.0);
    }

    #[test]
    fn test_circuit_breaker_records_state_values() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("payments");
        let breaker = group.circuit_breaker(
            CircuitBreakerOpts::new("gateway", "help"),
            Level::Critical,
        );
        let ctx = group.context();

        breaker.failure(&ctx).unwrap();
        breaker.set_state(&ctx, CircuitBreakerState::Open).unwrap();
        assert_eq!(metrics.backend.gauge_value("payments_gateway_state"), Some(1.0));

        breaker.set_state(&ctx, CircuitBreakerState::HalfOpen).unwrap();
        assert_eq!(metrics.backend.gauge_value("payments_gateway_state"), Some(2.0));

        breaker.success(&ctx).unwrap();
        breaker.set_state(&ctx, CircuitBreakerState::Closed).unwrap();
        assert_eq!(metrics.backend.gauge_value("payments_gateway_state"), Some(0.0));
        assert_eq!(metrics.backend.counter_value("payments_gateway_failures_total"), 1.0);
        assert_eq!(metrics.backend.counter_value("payments_gateway_successes_total"), 1.0);
    }

    #[test]
    fn test_queue_records_wait_time_in_seconds() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("jobs");
        let queue = group.queue(QueueOpts::new("email", "help"), Level::Important);
        let ctx = group.context();

        queue.enqueued(&ctx).unwrap();
        queue.set_depth(&ctx, 1).unwrap();
        queue.dequeued(&ctx).unwrap();
        queue.set_wait_time(&ctx, Duration::from_millis(250)).unwrap();

        let backend = &metrics.backend;
        assert_eq!(backend.gauge_value("jobs_email_depth"), Some(1.0));
        assert_eq!(backend.counter_value("jobs_email_enqueued_total"), 1.0);
        assert_eq!(backend.counter_value("jobs_email_dequeued_total"), 1.0);
        let waits = backend.observations("jobs_email_wait_time_seconds");
        assert_eq!(waits.len(), 1);
        assert_approx_eq!(waits[0], 0.25);
    }

    #[test]
    fn test_timer_guard_records_on_drop() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("render");
        let timer = group.timer(TimerOpts::new("page", "help"), Level::Important);

        {
            let guard = timer.start(&group.context());
            assert!(guard.is_armed());
        }
        assert_eq!(metrics.backend.observations("render_page_duration_seconds").len(), 1);

        let inert = timer.start(&Context::disabled());
        assert!(!inert.is_armed());
        inert.stop().unwrap();
        assert_eq!(metrics.backend.observations("render_page_duration_seconds").len(), 1);
    }

    #[test]
    fn test_timer_time_returns_closure_result() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("render");
        let timer = group.timer(TimerOpts::new("page", "help"), Level::Important);

        let value: std::result::Result<u32, MetricsError> = timer.time(&group.context(), || Ok(42));
        assert_eq!(value.unwrap(), 42);

        let failed: std::result::Result<u32, MetricsError> = timer.time(&group.context(), || {
            Err(MetricsError::backend("render failed"))
        });
        assert!(failed.is_err());
        assert_eq!(metrics.backend.observations("render_page_duration_seconds").len(), 2);
    }

    #[test]
    fn test_timer_vec_records_per_label() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("http");
        let timer = group.timer_vec(TimerVecOpts::new("request", "help", &["route"]), Level::Important);
        let ctx = group.context();
        let route = labels([("route", "/health")]);

        timer.record(&ctx, Duration::from_millis(5), &route).unwrap();
        timer.start(&ctx, &route).stop().unwrap();

        assert_eq!(
            metrics
                .backend
                .labeled_observations("http_request_duration_seconds", &route)
                .len(),
            2
        );
    }

    #[test]
    fn test_cache_vec_records_per_label() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("edge");
        let cache = group.cache_vec(CacheVecOpts::new("assets", "help", &["region"]), Level::Important);
        let ctx = group.context();
        let eu = labels([("region", "eu")]);

        cache.hit(&ctx, &eu).unwrap();
        cache.miss(&ctx, &eu).unwrap();
        cache.set_size(&ctx, 10, &eu).unwrap();

        let backend = &metrics.backend;
        assert_eq!(backend.labeled_value("edge_assets_hits_total", &eu), Some(1.0));
        assert_eq!(backend.labeled_value("edge_assets_misses_total", &eu), Some(1.0));
        assert_eq!(backend.labeled_value("edge_assets_size_bytes", &eu), Some(10.0));
    }

    #[test]
    fn test_disabled_composite_upgrades_with_components() {
        let metrics = TestMetrics::disabled();
        let group = metrics.group("sessions");
        let cache = group.cache(CacheOpts::new("store", "help"), Level::Important);
        let components = cache.components();
        assert!(cache.is_noop());
        assert!(components.iter().all(|c| c.is_noop()));

        metrics
            .registry
            .set_global_level(Level::Important, LevelOpts::replace_noops());

        assert!(!cache.is_noop());
        assert!(components.iter().all(|c| !c.is_noop()));
        cache.hit(&group.context()).unwrap();
        assert_eq!(metrics.backend.counter_value("sessions_store_hits_total"), 1.0);
    }

    #[test]
    fn test_composite_set_level_reaches_components() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("sessions");
        let cache = group.cache(CacheOpts::new("store", "help"), Level::Important);

        cache.set_level(Level::Verbose);
        assert_eq!(cache.level(), Level::Verbose);
        assert!(cache.components().iter().all(|c| c.level() == Level::Verbose));

        cache.hit(&Context::at(Level::Debug)).unwrap();
        assert_eq!(metrics.backend.calls(), 0);
    }

    #[test]
    fn test_composite_mask_reaches_components() {
        let metrics = TestMetrics::with_policy(Level::Verbose, Mask::ESSENTIAL);
        let group = metrics.group("sessions");
        let cache = group.cache(
            CacheOpts::new("store", "help").with_mask(Mask::CACHE),
            Level::Important,
        );

        assert!(cache.is_noop());
        assert_eq!(cache.mask(), Mask::CACHE);
        assert!(cache.components().iter().all(|c| c.mask() == Mask::CACHE));
    }
}
