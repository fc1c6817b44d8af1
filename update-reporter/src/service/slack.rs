use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Value, json};

use super::{Service, ServiceDescriptor, execute, package_url, parse_service_url, report_title};
use crate::config::Configuration;
use crate::error::ReporterError;
use crate::io::{Options, OutputBehavior};
use crate::report::{CheckResult, OutdatedPackage};

const NAME: &str = "slack";

/// Slack incoming-webhook service. Posts the report as Block Kit blocks:
/// a header with the package count, then one section per package.
#[derive(Debug)]
pub struct Slack {
    url: Url,
    client: reqwest::Client,
    behavior: OutputBehavior,
    options: Options,
}

impl Slack {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
            behavior: OutputBehavior::default(),
            options: Options::default(),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

fn build(config: &Configuration) -> Result<Slack, ReporterError> {
    let url = parse_service_url(NAME, &config.require(NAME, "url")?)?;
    Ok(Slack::new(url))
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

fn render_blocks(packages: &[OutdatedPackage]) -> Vec<Value> {
    let mut blocks = vec![json!({
        "type": "header",
        "text": {
            "type": "plain_text",
            "text": report_title(packages.len()),
        },
    })];

    for package in packages {
        let mut fields = vec![
            json!({"type": "mrkdwn", "text": "*Package*"}),
            json!({
                "type": "mrkdwn",
                "text": format!("<{}|{}>", package_url(&package.name), package.name),
            }),
            json!({"type": "mrkdwn", "text": "*Current version*"}),
            json!({"type": "mrkdwn", "text": format!("`{}`", package.current_version)}),
            json!({"type": "mrkdwn", "text": "*New version*"}),
            json!({"type": "mrkdwn", "text": format!("*`{}`*", package.new_version)}),
        ];
        if package.insecure {
            fields.push(json!({"type": "mrkdwn", "text": "*Security state*"}));
            fields.push(json!({"type": "mrkdwn", "text": "*Package is insecure* :warning:"}));
        }
        blocks.push(json!({"type": "divider"}));
        blocks.push(json!({"type": "section", "fields": fields}));
    }

    blocks
}

#[async_trait]
impl Service for Slack {
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
            self.behavior.status("🚫 Skipped Slack report.");
            return Ok(true);
        }

        let payload = json!({ "blocks": render_blocks(result.outdated_packages()) });

        if self.options.dry_run {
            self.behavior
                .status("🚀 Would send report to Slack (dry run).");
            return Ok(true);
        }

        self.behavior.status("🚀 Sending report to Slack...");
        let delivered = execute(NAME, self.client.post(self.url.clone()).json(&payload)).await?;
        if delivered {
            self.behavior.status("✅ Slack report was successful.");
        } else {
            self.behavior.error("❌ Error during Slack report.");
        }
        Ok(delivered)
    }
}
