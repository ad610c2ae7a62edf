//! Configuration integration tests

#[cfg(test)]
mod tests {
    use crate::common::TestMetrics;
    use std::io::Write;
    use umami::config::{Validate, load_config_with_precedence};
    use umami::*;

    #[test]
    fn test_file_config_drives_registry() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(
            file,
            "global_level: important\nglobal_mask: ALL\ngroups:\n  db:\n    level: verbose\n    mask: COUNTERS|ERRORS"
        )
        .unwrap();
        let config = MetricsConfig::from_file(file.path()).unwrap();
        config.validate().unwrap();

        let metrics = TestMetrics::disabled();
        let db = metrics.group("db");
        let api = metrics.group("api");
        let rows = db.counter(
            CounterOpts::new("rows_total", "help").with_mask(Mask::COUNTERS),
            Level::Verbose,
        );
        let slow = api.counter(CounterOpts::new("slow_total", "help"), Level::Debug);

        config.apply(&metrics.registry, LevelOpts::replace_noops());

        assert_eq!(db.level(), Level::Verbose);
        assert_eq!(db.mask(), Mask::COUNTERS | Mask::ERRORS);
        assert_eq!(api.level(), Level::Important);
        assert!(!rows.is_noop());
        assert!(slow.is_noop());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        MetricsConfig::development(&NullBackend)
            .save_to_file(file.path())
            .unwrap();

        let from_file = load_config_with_precedence(Some(file.path()), false).unwrap();
        assert_eq!(from_file.global_level, Level::Verbose);

        let env = MetricsConfig::from_vars([
            ("METRICS_LEVEL", "CRITICAL"),
            ("METRICS_GROUP_PAYMENTS_MASK", "ERRORS"),
        ]);
        let merged = from_file.merge(env);
        assert_eq!(merged.global_level, Level::Critical);
        assert_eq!(merged.global_mask, Mask::ALL);
        assert_eq!(merged.groups["payments"].mask, Some(Mask::ERRORS));
    }

    #[test]
    fn test_registry_from_config_and_backend() {
        let config = MetricsConfig::from_vars([
            ("METRICS_LEVEL", "debug"),
            ("METRICS_MASK", "ALL"),
            ("METRICS_BACKEND", "memory"),
        ]);
        let registry = Registry::from_config(&config);
        let backend = config.backend.create().unwrap();
        assert_eq!(backend.name(), "memory");

        let group = registry.new_group("jobs", backend, &[]);
        assert_eq!(group.level(), Level::Debug);
        assert_eq!(group.mask(), Mask::ALL);

        let counter = group.counter(CounterOpts::new("runs_total", "help"), Level::Debug);
        assert!(!counter.is_noop());
    }

    #[test]
    fn test_yaml_round_trip_preserves_groups() {
        let config = MetricsConfig::production(&MemoryBackend::new())
            .with_group("db", GroupConfig::new(Level::Critical, Mask::ESSENTIAL));
        let yaml = config.to_yaml().unwrap();
        let parsed: MetricsConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
