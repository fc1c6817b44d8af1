use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Map, Value, json};

use super::{Service, ServiceDescriptor, execute, parse_service_url, report_title};
use crate::config::Configuration;
use crate::error::ReporterError;
use crate::io::{Options, OutputBehavior};
use crate::report::{CheckResult, OutdatedPackage};

const NAME: &str = "gitlab";

/// GitLab alert-endpoint service, the ticket-style backend: each run posts
/// one alert whose payload lists every outdated package, authenticated with
/// a bearer token.
#[derive(Debug)]
pub struct GitLab {
    url: Url,
    auth_key: String,
    client: reqwest::Client,
    behavior: OutputBehavior,
    options: Options,
}

impl GitLab {
    pub fn new(url: Url, auth_key: impl Into<String>) -> Result<Self, ReporterError> {
        let auth_key = auth_key.into();
        if auth_key.trim().is_empty() {
            return Err(ReporterError::InvalidConfiguration {
                service: NAME,
                field: "auth_key",
                reason: "authorization key must not be empty".to_string(),
            });
        }
        Ok(Self {
            url,
            auth_key,
            client: reqwest::Client::new(),
            behavior: OutputBehavior::default(),
            options: Options::default(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

fn build(config: &Configuration) -> Result<GitLab, ReporterError> {
    let url = parse_service_url(NAME, &config.require(NAME, "url")?)?;
    let auth_key = config.require(NAME, "auth_key")?;
    GitLab::new(url, auth_key)
}

pub fn from_configuration(config: &Configuration) -> Result<Box<dyn Service>, ReporterError> {
    Ok(Box::new(build(config)?))
}

pub fn is_enabled(config: &Configuration) -> bool {
    config.service_enabled(NAME)
}

pub fn descriptor() -> ServiceDescriptor {
    ServiceDescriptor {
        name: NAME,
        is_enabled,
        from_configuration,
    }
}

fn render_alert(packages: &[OutdatedPackage]) -> Value {
    let mut alert = Map::new();
    alert.insert("title".to_string(), json!(report_title(packages.len())));
    for package in packages {
        let mut line = format!(
            "Outdated version: {}, new version: {}",
            package.current_version, package.new_version
        );
        if package.insecure {
            line.push_str(" (insecure)");
        }
        alert.insert(package.name.clone(), json!(line));
    }
    Value::Object(alert)
}

#[async_trait]
impl Service for GitLab {
    fn name(&self) -> &'static str {
        NAME
    }

    fn set_behavior(&mut self, behavior: OutputBehavior) {
        self.behavior = behavior;
    }

    fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    async fn deliver(&self, result: &CheckResult) -> Result<bool, ReporterError> {
        if result.is_empty() {
            self.behavior.status("🚫 Skipped GitLab report.");
            return Ok(true);
        }

        let payload = render_alert(result.outdated_packages());

        if self.options.dry_run {
            self.behavior
                .status("🚀 Would send report to GitLab (dry run).");
            return Ok(true);
        }

        self.behavior.status("🚀 Sending report to GitLab...");
        let request = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.auth_key)
            .json(&payload);
        let delivered = execute(NAME, request).await?;
        if delivered {
            self.behavior.status("✅ GitLab report was successful.");
        } else {
            self.behavior.error("❌ Error during GitLab report.");
        }
        Ok(delivered)
    }
}
