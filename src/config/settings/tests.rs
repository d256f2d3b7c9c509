use super::*;
use serial_test::serial;
use tempfile::TempDir;

fn config_with_secrets() -> Config {
    Config {
        index: IndexConfig {
            api_key: "test-index-key".to_string(),
            environment: "us-east1-gcp".to_string(),
            name: "documents".to_string(),
            host: None,
        },
        completion: CompletionConfig {
            api_key: "test-completion-key".to_string(),
            ..CompletionConfig::default()
        },
        ..Config::default()
    }
}

fn clear_secret_env() {
    for key in [
        "DOCSEARCH_INDEX_API_KEY",
        "DOCSEARCH_INDEX_ENVIRONMENT",
        "DOCSEARCH_INDEX_NAME",
        "DOCSEARCH_COMPLETION_API_KEY",
    ] {
        // SAFETY: tests mutating the environment are serialized with #[serial]
        unsafe { env::remove_var(key) };
    }
}

#[test]
fn defaults_require_secrets() {
    let config = Config::default();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingSecret("index.api_key"))
    ));
}

#[test]
fn valid_with_secrets() {
    let config = config_with_secrets();
    assert!(config.validate().is_ok());
}

#[test]
fn missing_completion_key() {
    let mut config = config_with_secrets();
    config.completion.api_key = String::new();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::MissingSecret("completion.api_key"))
    ));
}

#[test]
fn invalid_embedding_protocol() {
    let mut config = config_with_secrets();
    config.embedding.protocol = "ftp".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidProtocol(_))
    ));
}

#[test]
fn invalid_embedding_port() {
    let mut config = config_with_secrets();
    config.embedding.port = 0;
    assert!(matches!(config.validate(), Err(ConfigError::InvalidPort(0))));
}

#[test]
fn invalid_embedding_dimension() {
    let mut config = config_with_secrets();
    config.embedding.dimension = 10;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidEmbeddingDimension(10))
    ));
}

#[test]
fn invalid_max_tokens() {
    let mut config = config_with_secrets();
    config.completion.max_tokens = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidMaxTokens(0))
    ));
}

#[test]
fn index_url_from_name_and_environment() {
    let config = config_with_secrets();
    let url = config.index.index_url().expect("url should build");
    assert_eq!(
        url.as_str(),
        "https://documents.svc.us-east1-gcp.pinecone.io/"
    );
}

#[test]
fn index_url_host_override() {
    let mut config = config_with_secrets();
    config.index.host = Some("http://127.0.0.1:9001".to_string());
    let url = config.index.index_url().expect("url should build");
    assert_eq!(url.host_str(), Some("127.0.0.1"));
    assert_eq!(url.port(), Some(9001));
}

#[test]
fn embedding_url_from_parts() {
    let config = config_with_secrets();
    let url = config.embedding.embedding_url().expect("url should build");
    assert_eq!(url.as_str(), "http://localhost:11434/");
}

#[test]
fn server_bind_addr() {
    let config = ServerConfig::default();
    assert_eq!(config.bind_addr(), "127.0.0.1:8080");
}

#[test]
#[serial]
fn load_roundtrip_through_toml() {
    clear_secret_env();

    let dir = TempDir::new().expect("tempdir should create");
    let mut config = config_with_secrets();
    config.base_dir = dir.path().to_path_buf();
    config.save().expect("save should succeed");

    let loaded = Config::load(dir.path()).expect("load should succeed");
    assert_eq!(loaded.index, config.index);
    assert_eq!(loaded.completion, config.completion);
    assert_eq!(loaded.embedding, config.embedding);
}

#[test]
#[serial]
fn load_fails_without_secrets() {
    clear_secret_env();

    let dir = TempDir::new().expect("tempdir should create");
    assert!(Config::load(dir.path()).is_err());
}

#[test]
#[serial]
fn env_overrides_take_precedence() {
    clear_secret_env();

    let dir = TempDir::new().expect("tempdir should create");
    let mut config = config_with_secrets();
    config.base_dir = dir.path().to_path_buf();
    config.save().expect("save should succeed");

    // SAFETY: tests mutating the environment are serialized with #[serial]
    unsafe { env::set_var("DOCSEARCH_INDEX_API_KEY", "env-key") };

    let loaded = Config::load(dir.path()).expect("load should succeed");
    assert_eq!(loaded.index.api_key, "env-key");
    assert_eq!(loaded.index.name, "documents");

    clear_secret_env();
}

#[test]
#[serial]
fn env_secrets_complete_a_default_config() {
    clear_secret_env();

    let dir = TempDir::new().expect("tempdir should create");

    // SAFETY: tests mutating the environment are serialized with #[serial]
    unsafe {
        env::set_var("DOCSEARCH_INDEX_API_KEY", "env-index-key");
        env::set_var("DOCSEARCH_INDEX_ENVIRONMENT", "us-west4-gcp");
        env::set_var("DOCSEARCH_INDEX_NAME", "env-index");
        env::set_var("DOCSEARCH_COMPLETION_API_KEY", "env-completion-key");
    }

    let loaded = Config::load(dir.path()).expect("load should succeed");
    assert_eq!(loaded.index.environment, "us-west4-gcp");
    assert_eq!(loaded.completion.api_key, "env-completion-key");

    clear_secret_env();
}
