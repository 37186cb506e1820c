use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use strata_core::{
    Cache, CacheConfiguration, CacheEventKind, CacheFactory, CacheLogger, CacheType, ConfigError,
    DEFAULT_CACHE_CLASS_NAME, RegionsConfiguration, StatisticsCacheLogger, TypeRegistry,
};

mod common;

use common::{ReadOnlyCache, ReadOnlyFactory};

fn registry_with_read_only() -> TypeRegistry {
    let mut registry = TypeRegistry::with_defaults();
    registry.register_cache::<ReadOnlyCache>();
    registry.register_factory("app::ReadOnlyFactory", || Arc::new(ReadOnlyFactory));
    registry
}

#[test]
fn test_bootstrap_workflow() {
    let config = CacheConfiguration::with_registry(registry_with_read_only());

    // 1. Wiring at startup
    let factory: Arc<dyn CacheFactory> = Arc::new(ReadOnlyFactory);
    config.set_cache_factory(Arc::clone(&factory));
    config.set_cache_class_name(ReadOnlyCache::TYPE_NAME).unwrap();
    config
        .set_cache_instantiator_by_name(ReadOnlyCache::TYPE_NAME)
        .unwrap();
    config
        .regions_configuration()
        .set_lifetime("products", Duration::from_secs(300));

    // 2. Sessions obtain their facade
    let session = common::session("request-1");
    let cache = config.build_cache(Arc::clone(&session));

    assert!(Arc::ptr_eq(cache.session(), &session));
    assert_eq!(config.cache_class_name(), "app::ReadOnlyCache");
    assert!(!config.cache_factory().unwrap().supports_region("write_log"));
    assert_eq!(
        config.regions_configuration().lifetime("products"),
        Duration::from_secs(300)
    );

    // 3. The factory turns region names into storage
    let factory = config.cache_factory().unwrap();
    let region = factory.build_cache_region("products", &config.regions_configuration());
    assert_eq!(region.name(), "products");
    assert_eq!(region.lifetime(), Duration::from_secs(300));

    let query_cache = factory.build_query_cache(Arc::clone(&session), "product_queries");
    assert!(Arc::ptr_eq(query_cache.session(), &session));
    assert_eq!(query_cache.region().name(), "product_queries");
}

#[test]
fn test_failed_class_name_keeps_previous_value() {
    let config = CacheConfiguration::with_registry(registry_with_read_only());
    config.set_cache_class_name(ReadOnlyCache::TYPE_NAME).unwrap();

    let result = config.set_cache_class_name("app::ReadOnlyFactory");

    match result {
        Err(ConfigError::InvalidCacheClass { class_name, reason }) => {
            assert_eq!(class_name, "app::ReadOnlyFactory");
            assert!(reason.contains("Cache"));
        }
        other => panic!("Expected InvalidCacheClass error, got {:?}", other),
    }
    assert_eq!(config.cache_class_name(), ReadOnlyCache::TYPE_NAME);
}

#[test]
fn test_failed_instantiator_keeps_custom_instantiator() {
    let config = CacheConfiguration::with_registry(registry_with_read_only());
    config.set_cache_instantiator(|s| -> Arc<dyn Cache> { Arc::new(ReadOnlyCache::new(s)) });
    let before = config.cache_instantiator();

    let err = config
        .set_cache_instantiator_by_name("app::ReadOnlyFactory")
        .unwrap_err();

    assert!(err.is_invalid_configuration());
    assert!(Arc::ptr_eq(&config.cache_instantiator(), &before));
}

#[test]
fn test_fresh_configuration_reports_default_class() {
    let config = CacheConfiguration::new();

    assert_eq!(config.cache_class_name(), DEFAULT_CACHE_CLASS_NAME);
    assert_eq!(config.cache_class_name(), "strata::DefaultCache");
}

#[test]
fn test_regions_replace_then_read() {
    let config = CacheConfiguration::new();
    let regions = Arc::new(RegionsConfiguration::new(
        Duration::from_secs(30),
        Duration::from_secs(3),
    ));

    config.set_regions_configuration(Arc::clone(&regions));

    assert!(Arc::ptr_eq(&config.regions_configuration(), &regions));
    assert_eq!(config.regions_configuration().lifetime("any"), Duration::from_secs(30));
}

#[test]
fn test_logger_receives_events_through_configuration() {
    let config = CacheConfiguration::new();
    let stats = StatisticsCacheLogger::new();
    config.set_cache_logger(Arc::new(stats.clone()));

    let logger = config.cache_logger().expect("logger was set");
    logger.miss(CacheEventKind::Query, "queries");
    logger.put(CacheEventKind::Query, "queries");
    logger.hit(CacheEventKind::Query, "queries");

    assert_eq!(stats.region_misses("queries"), 1);
    assert_eq!(stats.region_puts("queries"), 1);
    assert_eq!(stats.hits(), 1);
}

#[test]
fn test_concurrent_first_reads_share_one_default() {
    let config = Arc::new(CacheConfiguration::new());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let config = Arc::clone(&config);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (
                    config.regions_configuration(),
                    config.query_validator(),
                    config.cache_instantiator(),
                )
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let (regions, validator, instantiator) = &results[0];

    for (r, v, i) in &results[1..] {
        assert!(Arc::ptr_eq(r, regions));
        assert!(Arc::ptr_eq(v, validator));
        assert!(Arc::ptr_eq(i, instantiator));
    }
}
