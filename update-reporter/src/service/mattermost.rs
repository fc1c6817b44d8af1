use async_trait::async_trait;
use reqwest::Url;
use serde_json::json;

use super::{Service, ServiceDescriptor, execute, package_url, parse_service_url, report_title};
use crate::config::Configuration;
use crate::error::ReporterError;
use crate::io::{Options, OutputBehavior};
use crate::report::{CheckResult, OutdatedPackage};

const NAME: &str = "mattermost";

/// Mattermost incoming-webhook service. Posts the report as a markdown
/// table inside a red attachment.
#[derive(Debug)]
pub struct Mattermost {
    url: Url,
    channel: String,
    username: Option<String>,
    client: reqwest::Client,
    behavior: OutputBehavior,
    options: Options,
}

impl Mattermost {
    pub fn new(
        url: Url,
        channel: impl Into<String>,
        username: Option<String>,
    ) -> Result<Self, ReporterError> {
        let channel = channel.into();
        if channel.trim().is_empty() {
            return Err(ReporterError::InvalidConfiguration {
                service: NAME,
                field: "channel",
                reason: "channel name must not be empty".to_string(),
            });
        }
        Ok(Self {
            url,
            channel,
            username,
            client: reqwest::Client::new(),
            behavior: OutputBehavior::default(),
            options: Options::default(),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    fn payload(&self, packages: &[OutdatedPackage]) -> serde_json::Value {
        let mut payload = json!({
            "channel": self.channel,
            "attachments": [{
                "color": "#EE0000",
                "text": render_text(packages),
            }],
        });
        if let Some(username) = &self.username {
            payload["username"] = json!(username);
        }
        payload
    }
}

fn build(config: &Configuration) -> Result<Mattermost, ReporterError> {
    let url = parse_service_url(NAME, &config.require(NAME, "url")?)?;
    let channel = config.require(NAME, "channel")?;
    let username = config
        .resolve(NAME, "username")
        .filter(|u| !u.trim().is_empty());
    Mattermost::new(url, channel, username)
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

fn render_text(packages: &[OutdatedPackage]) -> String {
    let mut lines = vec![
        format!("#### :rotating_light: {}", report_title(packages.len())),
        "| Package | Current version | New version |".to_string(),
        "|:------- |:--------------- |:----------- |".to_string(),
    ];
    for package in packages {
        let security = if package.insecure {
            " :warning: **insecure**"
        } else {
            ""
        };
        lines.push(format!(
            "| [{name}]({url}) | {current} | **{new}**{security} |",
            name = package.name,
            url = package_url(&package.name),
            current = package.current_version,
            new = package.new_version,
        ));
    }
    lines.join("\n")
}

#[async_trait]
impl Service for Mattermost {
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
            self.behavior.status("🚫 Skipped Mattermost report.");
            return Ok(true);
        }

        let payload = self.payload(result.outdated_packages());

        if self.options.dry_run {
            self.behavior
                .status("🚀 Would send report to Mattermost (dry run).");
            return Ok(true);
        }

        self.behavior.status("🚀 Sending report to Mattermost...");
        let delivered = execute(NAME, self.client.post(self.url.clone()).json(&payload)).await?;
        if delivered {
            self.behavior.status("✅ Mattermost report was successful.");
        } else {
            self.behavior.error("❌ Error during Mattermost report.");
        }
        Ok(delivered)
    }
}
