use std::io::Write;
use subscriber_dns_domain::config::{
    CliOverrides, Config, ConfigError, LogFormat, OpenIdcConfig, Protocol, RegistryConfig,
    StaticRecordConfig, DEFAULT_ATTACHED_VALUE, DEFAULT_CLIENT_ID,
};
use tempfile::NamedTempFile;

fn valid_config() -> Config {
    Config {
        domain: "device.test.aether.net".to_string(),
        registry: RegistryConfig::new("https://roc.test.aether.net"),
        ..Config::default()
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.bind, "0.0.0.0:53");
    assert_eq!(config.protocol, Protocol::Udp);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Text);
    assert!(config.static_records.is_empty());
    assert!(config.registry.openidc.is_none());
    assert_eq!(config.registry.timeout_secs, 5);
    assert_eq!(config.registry.attached_value, DEFAULT_ATTACHED_VALUE);
}

#[test]
fn test_all_required_values_validate() {
    assert!(valid_config().validate().is_ok());
}

#[test]
fn test_missing_bind_does_not_validate() {
    let config = Config {
        bind: String::new(),
        ..valid_config()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
}

#[test]
fn test_malformed_bind_does_not_validate() {
    let config = Config {
        bind: "localhost".to_string(),
        ..valid_config()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_missing_domain_does_not_validate() {
    let config = Config {
        domain: String::new(),
        ..valid_config()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_missing_registry_url_does_not_validate() {
    let config = Config {
        registry: RegistryConfig::default(),
        ..valid_config()
    };
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("registry URL"));
}

#[test]
fn test_registry_url_without_scheme_does_not_validate() {
    let config = Config {
        registry: RegistryConfig::new("roc.test.aether.net"),
        ..valid_config()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_tcp_tls_requires_certificates() {
    let config = Config {
        protocol: Protocol::TcpTls,
        ..valid_config()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_token_url_does_not_validate() {
    let config = Config {
        registry: RegistryConfig::new("https://roc.test.aether.net")
            .with_openidc(OpenIdcConfig::new("keycloak", "user", "pass")),
        ..valid_config()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_full_config_deserialization() {
    let toml_str = r#"
        bind = "127.0.0.1:5353"
        protocol = "tcp"
        domain = "device.test.aether.net"
        site = "Test Site"

        [[static_records]]
        host = "test-4g-pi1.device.test.aether.net"
        address = "10.250.0.254"

        [registry]
        url = "https://roc.test.aether.org"

        [registry.openidc]
        token_url = "https://keycloak.test.aether.org/auth/realms/master/protocol/openid-connect/token"
        username = "testuser"
        password = "testpassword"

        [logging]
        level = "debug"
        format = "json"
    "#;

    let config = Config::from_toml_str(toml_str).unwrap();

    assert_eq!(config.bind, "127.0.0.1:5353");
    assert_eq!(config.protocol, Protocol::Tcp);
    assert_eq!(config.site, "Test Site");
    assert_eq!(
        config.static_records,
        vec![StaticRecordConfig::new(
            "test-4g-pi1.device.test.aether.net",
            "10.250.0.254"
        )]
    );
    let openidc = config.registry.openidc.as_ref().unwrap();
    assert_eq!(openidc.username, "testuser");
    assert_eq!(openidc.client_id, DEFAULT_CLIENT_ID);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(config.validate().is_ok());
}

#[test]
fn test_legacy_key_names_are_accepted() {
    let config = Config::from_toml_str(
        r#"
        domain = "device.test.aether.net"
        site = "test-site"

        [[customRecords]]
        host = "test.device.net"
        address = "10.0.0.5"

        [roc]
        url = "https://roc.test.aether.net"

        [roc.OpenIDC]
        tokenUrl = "https://keycloak.test.aether.net/token"
        username = "dns"
        password = "secret"
        "#,
    )
    .unwrap();

    assert_eq!(config.static_records.len(), 1);
    assert_eq!(config.static_records[0].host, "test.device.net");
    assert_eq!(config.registry.url, "https://roc.test.aether.net");
    let openidc = config.registry.openidc.as_ref().unwrap();
    assert_eq!(openidc.token_url, "https://keycloak.test.aether.net/token");
    assert_eq!(openidc.client_id, DEFAULT_CLIENT_ID);
    assert!(config.validate().is_ok());
}

#[test]
fn test_unknown_protocol_is_parse_error() {
    let result = Config::from_toml_str(r#"protocol = "quic""#);
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_load_merges_files_in_order() {
    let base = write_config(
        r#"
        domain = "device.test.aether.net"
        site = "Test Site"

        [[static_records]]
        host = "test-4g-pi1.device.test.aether.net"
        address = "10.250.0.254"

        [registry]
        url = "https://roc.test.aether.org"
        "#,
    );
    let credentials = write_config(
        r#"
        [registry.openidc]
        token_url = "https://keycloak.test.aether.org/token"
        username = "testuser"
        password = "testpassword"
        "#,
    );

    let config = Config::load(&[base.path(), credentials.path()], CliOverrides::default()).unwrap();

    assert_eq!(config.registry.url, "https://roc.test.aether.org");
    assert_eq!(config.static_records.len(), 1);
    assert_eq!(
        config.registry.openidc,
        Some(OpenIdcConfig::new(
            "https://keycloak.test.aether.org/token",
            "testuser",
            "testpassword"
        ))
    );
}

#[test]
fn test_load_applies_cli_overrides() {
    let file = write_config(
        r#"
        domain = "device.test.aether.net"
        [registry]
        url = "https://roc.test.aether.org"
        "#,
    );

    let overrides = CliOverrides {
        bind: Some("127.0.0.1:1053".to_string()),
        protocol: Some(Protocol::Tcp),
        log_level: Some("trace".to_string()),
    };
    let config = Config::load(&[file.path()], overrides).unwrap();

    assert_eq!(config.bind, "127.0.0.1:1053");
    assert_eq!(config.protocol, Protocol::Tcp);
    assert_eq!(config.logging.level, "trace");
}

#[test]
fn test_load_rejects_invalid_result() {
    let file = write_config(r#"domain = "device.test.aether.net""#);
    let result = Config::load(&[file.path()], CliOverrides::default());
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn test_load_missing_file_is_read_error() {
    let result = Config::load(&["/nonexistent/subscriber-dns.toml"], CliOverrides::default());
    assert!(matches!(result, Err(ConfigError::FileRead(_, _))));
}

#[test]
fn test_protocol_from_str() {
    assert_eq!("udp".parse::<Protocol>(), Ok(Protocol::Udp));
    assert_eq!("TCP".parse::<Protocol>(), Ok(Protocol::Tcp));
    assert_eq!("tcp-tls".parse::<Protocol>(), Ok(Protocol::TcpTls));
    assert!("sctp".parse::<Protocol>().is_err());
}
