use std::time::Duration;

/// Email carrier configuration.
///
/// # Examples
///
/// ```
/// use courier_email::EmailConfig;
///
/// let config = EmailConfig::new("smtp.example.com", "noreply@example.com");
/// assert_eq!(config.name, "email");
/// assert_eq!(config.smtp_port, 587);
/// assert!(!config.relay_ack_confirms);
/// ```
#[derive(Clone)]
pub struct EmailConfig {
    /// Provider id this carrier registers under.
    pub name: String,
    /// The `From` address of outgoing mail.
    pub from_address: String,
    /// Relay hostname.
    pub smtp_host: String,
    /// Relay port, 587 (submission) unless overridden.
    pub smtp_port: u16,
    /// Optional `(username, password)` for SMTP AUTH.
    pub credentials: Option<(String, String)>,
    /// Upgrade the connection with STARTTLS.
    pub tls: bool,
    /// Upper bound on one relay conversation.
    pub timeout: Duration,
    /// Treat the relay's `250` for a message as proof of delivery.
    ///
    /// SMTP reports nothing after the relay queues a message, so by default
    /// a relayed message stays pending and a critical send through this
    /// carrier falls back once the confirmation deadline passes. Enable this
    /// only for relays that deliver synchronously.
    pub relay_ack_confirms: bool,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("name", &self.name)
            .field("from_address", &self.from_address)
            .field("relay", &format_args!("{}:{}", self.smtp_host, self.smtp_port))
            .field("username", &self.credentials.as_ref().map(|(user, _)| user))
            .field("tls", &self.tls)
            .field("timeout", &self.timeout)
            .field("relay_ack_confirms", &self.relay_ack_confirms)
            .finish_non_exhaustive()
    }
}

impl EmailConfig {
    pub fn new(smtp_host: impl Into<String>, from_address: impl Into<String>) -> Self {
        Self {
            name: "email".to_owned(),
            from_address: from_address.into(),
            smtp_host: smtp_host.into(),
            smtp_port: 587,
            credentials: None,
            tls: true,
            timeout: Duration::from_secs(10),
            relay_ack_confirms: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.smtp_port = port;
        self
    }

    #[must_use]
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_relay_ack_confirms(mut self, confirms: bool) -> Self {
        self.relay_ack_confirms = confirms;
        self
    }

    /// Domain part of the sender address, used for generated `Message-ID`s.
    pub fn sender_domain(&self) -> &str {
        self.from_address
            .rsplit_once('@')
            .map_or("localhost", |(_, domain)| domain.trim_end_matches('>'))
    }
}
