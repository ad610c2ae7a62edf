//! Concurrency integration tests

#[cfg(test)]
mod tests {
    use crate::common::TestMetrics;
    use std::sync::Arc;
    use std::thread;
    use umami::*;

    const THREADS: usize = 8;
    const ITERATIONS: usize = 1_000;

    #[test]
    fn test_concurrent_increments_are_all_recorded() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("load");
        let counter = group.counter(CounterOpts::new("hits_total", "help"), Level::Important);
        let ctx = group.context();

        thread::scope(|scope| {
            for _ in 0..THREADS {
                let counter = Arc::clone(&counter);
                scope.spawn(move || {
                    for _ in 0..ITERATIONS {
                        counter.inc(&ctx).unwrap();
                    }
                });
            }
        });

        assert_eq!(
            metrics.backend.counter_value("load_hits_total"),
            (THREADS * ITERATIONS) as f64
        );
    }

    #[test]
    fn test_concurrent_creation_yields_one_metric() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("load");

        let handles: Vec<Handle<dyn Gauge>> = thread::scope(|scope| {
            let workers: Vec<_> = (0..THREADS)
                .map(|_| {
                    let group = Arc::clone(&group);
                    scope.spawn(move || {
                        group.gauge(GaugeOpts::new("workers", "help"), Level::Important)
                    })
                })
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join().unwrap())
                .collect()
        });

        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
        assert_eq!(metrics.backend.constructed(), 1);
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn test_upgrade_while_recording() {
        let metrics = TestMetrics::disabled();
        let group = metrics.group("load");
        let counter = group.counter(CounterOpts::new("hits_total", "help"), Level::Important);
        let ctx = Context::new(Level::Verbose, Mask::ALL);

        thread::scope(|scope| {
            for _ in 0..THREADS {
                let counter = Arc::clone(&counter);
                scope.spawn(move || {
                    for _ in 0..ITERATIONS {
                        counter.inc(&ctx).unwrap();
                    }
                });
            }
            scope.spawn(|| {
                metrics
                    .registry
                    .set_global_level(Level::Important, LevelOpts::replace_noops());
            });
        });

        assert!(!counter.is_noop());
        let recorded = metrics.backend.counter_value("load_hits_total");
        assert!(recorded <= (THREADS * ITERATIONS) as f64);

        counter.inc(&ctx).unwrap();
        assert_eq!(metrics.backend.counter_value("load_hits_total"), recorded + 1.0);
    }

    #[test]
    fn test_level_flips_while_recording() {
        let metrics = TestMetrics::new(Level::Verbose);
        let group = metrics.group("load");
        let counter = group.counter(CounterOpts::new("hits_total", "help"), Level::Debug);

        thread::scope(|scope| {
            for _ in 0..THREADS {
                let counter = Arc::clone(&counter);
                let group = Arc::clone(&group);
                scope.spawn(move || {
                    for _ in 0..ITERATIONS {
                        counter.inc(&group.context()).unwrap();
                    }
                });
            }
            scope.spawn(|| {
                for round in 0..50 {
                    let level = if round % 2 == 0 { Level::Critical } else { Level::Verbose };
                    metrics
                        .registry
                        .set_global_level(level, LevelOpts::replace_noops());
                }
            });
        });

        assert!(metrics.backend.counter_value("load_hits_total") <= (THREADS * ITERATIONS) as f64);
        assert_eq!(metrics.registry.global_level(), Level::Verbose);
    }
}
