use carescout::config::{CarescoutConfig, validate};

#[test]
fn default_config_has_sensible_values() {
    let config = CarescoutConfig::default();
    assert_eq!(config.gateway.port, 8000);
    assert_eq!(config.gateway.bind, "127.0.0.1");
    assert!(config.gateway.static_dir.is_none());
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.llm.embedding_model, "text-embedding-3-small");
    assert_eq!(config.llm.max_tokens, 1200);
    assert!((config.llm.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(config.llm.timeout_secs, 30);
    assert!(config.llm.api_key.is_none());
    assert_eq!(config.retrieval.top_k, 3);
    assert_eq!(config.retrieval.index_path, "./db/index.json");
}

#[test]
fn valid_toml_parses_successfully() {
    let toml_str = r#"
[gateway]
port = 9000
bind = "0.0.0.0"
static_dir = "static"

[llm]
model = "gpt-4o"
embedding_model = "text-embedding-3-large"
api_key = "sk-test"
max_tokens = 800
temperature = 0.5
timeout_secs = 10

[retrieval]
top_k = 5
index_path = "/var/lib/carescout/index.json"
"#;

    let config: CarescoutConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.gateway.port, 9000);
    assert_eq!(config.gateway.bind, "0.0.0.0");
    assert_eq!(config.gateway.static_dir.as_deref(), Some("static"));
    assert_eq!(config.llm.model, "gpt-4o");
    assert_eq!(config.llm.embedding_model, "text-embedding-3-large");
    assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.llm.max_tokens, 800);
    assert_eq!(config.llm.timeout_secs, 10);
    assert_eq!(config.retrieval.top_k, 5);
    assert_eq!(config.retrieval.index_path, "/var/lib/carescout/index.json");
    assert!(validate(&config).is_ok());
}

#[test]
fn partial_config_uses_defaults_for_missing_fields() {
    let toml_str = r#"
[llm]
api_key = "test-key"
"#;

    let config: CarescoutConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.gateway.port, 8000);
    assert_eq!(config.gateway.bind, "127.0.0.1");
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.llm.api_key.as_deref(), Some("test-key"));
    assert_eq!(config.retrieval.top_k, 3);
}

#[test]
fn empty_toml_uses_all_defaults() {
    let config: CarescoutConfig = toml::from_str("").unwrap();
    assert_eq!(config.gateway.port, 8000);
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.retrieval.top_k, 3);
}

#[test]
fn zero_top_k_fails_validation() {
    let mut config = CarescoutConfig::default();
    config.retrieval.top_k = 0;
    let err = validate(&config).expect_err("top_k = 0 must fail");
    assert!(err.to_string().contains("top_k"));
}

#[test]
fn zero_max_tokens_fails_validation() {
    let mut config = CarescoutConfig::default();
    config.llm.max_tokens = 0;
    let err = validate(&config).expect_err("max_tokens = 0 must fail");
    assert!(err.to_string().contains("max_tokens"));
}

#[test]
fn out_of_range_temperature_fails_validation() {
    let mut config = CarescoutConfig::default();
    config.llm.temperature = 3.5;
    let err = validate(&config).expect_err("temperature 3.5 must fail");
    assert!(err.to_string().contains("temperature"));
}
