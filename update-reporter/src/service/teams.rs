use async_trait::async_trait;
use reqwest::Url;
use serde_json::{Value, json};

use super::{Service, ServiceDescriptor, execute, package_url, parse_service_url, report_title};
use crate::config::Configuration;
use crate::error::ReporterError;
use crate::io::{Options, OutputBehavior};
use crate::report::{CheckResult, OutdatedPackage};

const NAME: &str = "teams";

/// Microsoft Teams webhook service. Posts the report as a MessageCard with
/// one section per package.
#[derive(Debug)]
pub struct Teams {
    url: Url,
    client: reqwest::Client,
    behavior: OutputBehavior,
    options: Options,
}

impl Teams {
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

fn build(config: &Configuration) -> Result<Teams, ReporterError> {
    let url = parse_service_url(NAME, &config.require(NAME, "url")?)?;
    Ok(Teams::new(url))
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

fn render_card(packages: &[OutdatedPackage]) -> Value {
    let title = report_title(packages.len());
    let sections: Vec<Value> = packages
        .iter()
        .map(|package| {
            let mut facts = vec![
                json!({"name": "Current version", "value": package.current_version}),
                json!({"name": "New version", "value": package.new_version}),
            ];
            if package.insecure {
                facts.push(json!({"name": "Security state", "value": "⚠️ Package is insecure"}));
            }
            json!({
                "title": format!("[{}]({})", package.name, package_url(&package.name)),
                "facts": facts,
            })
        })
        .collect();

    json!({
        "@type": "MessageCard",
        "@context": "https://schema.org/extensions",
        "themeColor": "EE0000",
        "summary": title,
        "title": title,
        "sections": sections,
    })
}

#[async_trait]
impl Service for Teams {
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
            self.behavior.status("🚫 Skipped MS Teams report.");
            return Ok(true);
        }

        let payload = render_card(result.outdated_packages());

        if self.options.dry_run {
            self.behavior
                .status("🚀 Would send report to MS Teams (dry run).");
            return Ok(true);
        }

        self.behavior.status("🚀 Sending report to MS Teams...");
        let delivered = execute(NAME, self.client.post(self.url.clone()).json(&payload)).await?;
        if delivered {
            self.behavior.status("✅ MS Teams report was successful.");
        } else {
            self.behavior.error("❌ Error during MS Teams report.");
        }
        Ok(delivered)
    }
}
