use std::sync::Arc;
use std::time::Duration;

use courier_email::{EmailConfig, EmailProvider};
use courier_http::{AuthMethod, HttpCarrier, HttpCarrierConfig};
use courier_provider::{DynProvider, LogProvider, ProviderRegistry};
use tracing::info;

use crate::config::ProviderConfig;
use crate::error::ServerError;

/// Build a registry holding one adapter per `[[providers]]` entry.
pub fn create_providers(configs: &[ProviderConfig]) -> Result<ProviderRegistry, ServerError> {
    let mut registry = ProviderRegistry::new();
    for provider_cfg in configs {
        if registry.contains(&provider_cfg.name) {
            return Err(ServerError::Config(format!(
                "provider '{}' is defined more than once",
                provider_cfg.name
            )));
        }
        let provider = create_provider(provider_cfg)?;
        info!(
            provider = %provider_cfg.name,
            provider_type = %provider_cfg.provider_type,
            "provider registered"
        );
        registry.register(provider);
    }
    Ok(registry)
}

fn create_provider(provider_cfg: &ProviderConfig) -> Result<Arc<dyn DynProvider>, ServerError> {
    let provider: Arc<dyn DynProvider> = match provider_cfg.provider_type.as_str() {
        "log" => Arc::new(LogProvider::new(&provider_cfg.name)),
        "smtp" => {
            let provider = EmailProvider::new(&email_config(provider_cfg)?).map_err(|e| {
                ServerError::Config(format!("provider '{}': {e}", provider_cfg.name))
            })?;
            Arc::new(provider)
        }
        "http" => {
            let url = required(provider_cfg, provider_cfg.url.as_deref(), "url")?;
            let mut http_config = HttpCarrierConfig::new(url);
            if let Some(ref token) = provider_cfg.token {
                http_config = http_config.with_auth(AuthMethod::Bearer(token.clone()));
            }
            for (key, value) in &provider_cfg.headers {
                http_config = http_config.with_header(key, value);
            }
            if let Some(secs) = provider_cfg.timeout_seconds {
                http_config = http_config.with_timeout(Duration::from_secs(secs));
            }
            let carrier = HttpCarrier::new(&provider_cfg.name, http_config).map_err(|e| {
                ServerError::Config(format!("provider '{}': {e}", provider_cfg.name))
            })?;
            Arc::new(carrier)
        }
        other => {
            return Err(ServerError::Config(format!(
                "provider '{}': unknown type '{other}' (expected log, smtp, or http)",
                provider_cfg.name
            )));
        }
    };
    Ok(provider)
}

fn required<'a>(
    provider_cfg: &ProviderConfig,
    value: Option<&'a str>,
    field: &str,
) -> Result<&'a str, ServerError> {
    value.ok_or_else(|| {
        ServerError::Config(format!(
            "provider '{}': {} type requires a '{field}' field",
            provider_cfg.name, provider_cfg.provider_type
        ))
    })
}

fn email_config(provider_cfg: &ProviderConfig) -> Result<EmailConfig, ServerError> {
    let smtp_host = required(provider_cfg, provider_cfg.smtp_host.as_deref(), "smtp_host")?;
    let from_address = required(provider_cfg, provider_cfg.from_address.as_deref(), "from_address")?;
    let mut config = EmailConfig::new(smtp_host, from_address)
        .with_name(&provider_cfg.name)
        .with_relay_ack_confirms(provider_cfg.relay_ack_confirms);
    if let Some(port) = provider_cfg.smtp_port {
        config = config.with_port(port);
    }
    if let Some(tls) = provider_cfg.tls {
        config = config.with_tls(tls);
    }
    if let Some(secs) = provider_cfg.timeout_seconds {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let (Some(user), Some(pass)) = (&provider_cfg.username, &provider_cfg.password) {
        config = config.with_credentials(user, pass);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Vec<ProviderConfig> {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            providers: Vec<ProviderConfig>,
        }
        toml::from_str::<Wrapper>(toml).unwrap().providers
    }

    #[tokio::test]
    async fn builds_every_supported_type() {
        let configs = parse(
            r#"
            [[providers]]
            name = "dev"
            type = "log"

            [[providers]]
            name = "mail"
            type = "smtp"
            smtp_host = "localhost"
            smtp_port = 2525
            tls = false
            from_address = "alerts@example.com"

            [[providers]]
            name = "sms"
            type = "http"
            url = "http://localhost:9999"
            token = "t"
        "#,
        );
        let registry = create_providers(&configs).unwrap();
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("dev"));
        assert!(registry.contains("mail"));
        assert!(registry.contains("sms"));
    }

    #[test]
    fn smtp_options_reach_email_config() {
        let configs = parse(
            r#"
            [[providers]]
            name = "mail"
            type = "smtp"
            smtp_host = "relay.example.com"
            from_address = "alerts@example.com"
            timeout_seconds = 3

            [[providers]]
            name = "sync-relay"
            type = "smtp"
            smtp_host = "relay.example.com"
            from_address = "alerts@example.com"
            relay_ack_confirms = true
        "#,
        );
        let mail = email_config(&configs[0]).unwrap();
        assert!(!mail.relay_ack_confirms);
        assert_eq!(mail.timeout, Duration::from_secs(3));
        assert_eq!(mail.name, "mail");

        let sync = email_config(&configs[1]).unwrap();
        assert!(sync.relay_ack_confirms);
    }

    #[test]
    fn missing_field_is_a_config_error() {
        let configs = parse(
            r#"
            [[providers]]
            name = "sms"
            type = "http"
        "#,
        );
        let err = create_providers(&configs).unwrap_err();
        assert!(err.to_string().contains("'url'"));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let configs = parse(
            r#"
            [[providers]]
            name = "pigeon"
            type = "carrier-pigeon"
        "#,
        );
        let err = create_providers(&configs).unwrap_err();
        assert!(err.to_string().contains("unknown type"));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let configs = parse(
            r#"
            [[providers]]
            name = "dev"
            type = "log"

            [[providers]]
            name = "dev"
            type = "log"
        "#,
        );
        let err = create_providers(&configs).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}
