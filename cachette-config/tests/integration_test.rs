//! Integration tests for cachette-config

use cachette_config::*;
use std::io::Write;
use std::time::Duration;
use temp_env::with_vars;

#[test]
fn test_loader_from_env() {
    let vars = vec![
        ("CACHETTE_BACKEND", Some("memcached")),
        ("CACHETTE_TTL", Some("120")),
        ("CACHETTE_RUNTIME", Some("true")),
        ("CACHETTE_DISTRIBUTED_SERVERS", Some("cache1:7000, cache2:7001")),
        ("CACHETTE_DISTRIBUTED_POOL", Some("sessions")),
        ("CACHETTE_DISTRIBUTED_COMPRESS", Some("yes")),
    ];

    with_vars(vars, || {
        let options = OptionsLoader::new().from_env().unwrap();

        assert_eq!(options.backend, BackendKind::Distributed);
        assert_eq!(options.ttl, Duration::from_secs(120));
        assert!(options.runtime);
        assert_eq!(
            options.distributed.servers,
            vec![
                ServerEndpoint::new("cache1", 7000),
                ServerEndpoint::new("cache2", 7001)
            ]
        );
        assert_eq!(options.distributed.pool.as_deref(), Some("sessions"));
        assert!(options.distributed.compress);
    });
}

#[test]
fn test_loader_rejects_bad_env_values() {
    with_vars(vec![("CACHETTE_TTL", Some("soon"))], || {
        assert!(matches!(
            OptionsLoader::new().from_env(),
            Err(ConfigError::EnvError(_))
        ));
    });

    with_vars(vec![("CACHETTE_DISTRIBUTED_SERVERS", Some("cache1:http"))], || {
        assert!(matches!(
            OptionsLoader::new().from_env(),
            Err(ConfigError::InvalidValue { .. })
        ));
    });
}

#[test]
fn test_custom_prefix() {
    with_vars(vec![("APP_CACHE_BACKEND", Some("none"))], || {
        let options = OptionsLoader::with_prefix("APP_CACHE").from_env().unwrap();
        assert_eq!(options.backend, BackendKind::None);
    });
}

#[test]
fn test_loader_from_file_with_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
backend: document
ttl: 30
document:
  host: mongo.internal
  port: 27018
  username: cache
  password: secret
  database: pages
  collection: entries
"#
    )
    .unwrap();

    with_vars(vec![("CACHETTE_DOCUMENT_SAFE", Some("1"))], || {
        let options = OptionsLoader::new().load(Some(file.path())).unwrap();

        assert_eq!(options.backend, BackendKind::Document);
        assert_eq!(options.ttl, Duration::from_secs(30));
        assert_eq!(options.document.host, "mongo.internal");
        assert_eq!(options.document.port, Some(27018));
        assert_eq!(options.document.database_name(), "pages");
        assert_eq!(options.document.collection, "entries");
        assert!(options.document.safe);
        assert!(options.document.pool);
    });
}

#[test]
fn test_missing_file() {
    let result = OptionsLoader::new().from_file("/nonexistent/cachette.yaml");
    assert!(matches!(result, Err(ConfigError::FileReadError(_))));
}

#[test]
fn test_yaml_round_trip_keeps_defaults() {
    let options = CacheOptions::for_backend(BackendKind::Accelerator).with_runtime(true);
    let yaml = serde_yaml::to_string(&options).unwrap();
    let parsed: CacheOptions = serde_yaml::from_str(&yaml).unwrap();

    assert_eq!(parsed.backend, BackendKind::Accelerator);
    assert!(parsed.runtime);
    assert_eq!(parsed.ttl, options.ttl);
    assert_eq!(parsed.document.database_name(), "cache");
}
