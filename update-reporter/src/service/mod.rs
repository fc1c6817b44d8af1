pub mod gitlab;
pub mod mattermost;
pub mod slack;
pub mod teams;

use async_trait::async_trait;
use reqwest::Url;

use crate::config::Configuration;
use crate::error::ReporterError;
use crate::io::{Options, OutputBehavior};
use crate::report::CheckResult;

/// One notification backend, constructed fresh per run from the resolved
/// configuration.
#[async_trait]
pub trait Service: Send + Sync {
    /// Registry key of this service, e.g. `"mattermost"`.
    fn name(&self) -> &'static str;

    fn set_behavior(&mut self, behavior: OutputBehavior);

    fn set_options(&mut self, options: Options);

    /// Deliver one report. An empty result skips the network entirely and
    /// succeeds. `Ok(false)` means the remote service rejected the payload
    /// (HTTP status >= 400); `Err` is reserved for transport failures.
    async fn deliver(&self, result: &CheckResult) -> Result<bool, ReporterError>;
}

/// Registry entry for a service type: its key plus the two constructors
/// the Reporter drives. Custom backends register one of these.
#[derive(Clone, Copy)]
pub struct ServiceDescriptor {
    pub name: &'static str,
    pub is_enabled: fn(&Configuration) -> bool,
    pub from_configuration: fn(&Configuration) -> Result<Box<dyn Service>, ReporterError>,
}

impl PartialEq for ServiceDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ServiceDescriptor {}

impl std::fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

/// The built-in service set, in default registration order.
pub fn default_services() -> Vec<ServiceDescriptor> {
    vec![
        gitlab::descriptor(),
        mattermost::descriptor(),
        slack::descriptor(),
        teams::descriptor(),
    ]
}

/// Report title with correct pluralization: "1 outdated package",
/// "2 outdated packages".
pub(crate) fn report_title(count: usize) -> String {
    format!(
        "{count} outdated package{}",
        if count == 1 { "" } else { "s" }
    )
}

/// Canonical package-registry link for a package name.
pub(crate) fn package_url(name: &str) -> String {
    format!("https://packagist.org/packages/{name}")
}

/// Validate and parse a resolved destination URL at construction time, so
/// misconfiguration surfaces before any network call.
pub(crate) fn parse_service_url(service: &'static str, raw: &str) -> Result<Url, ReporterError> {
    if raw.trim().is_empty() {
        return Err(ReporterError::InvalidConfiguration {
            service,
            field: "url",
            reason: "URL must not be empty".to_string(),
        });
    }
    Url::parse(raw).map_err(|e| ReporterError::InvalidConfiguration {
        service,
        field: "url",
        reason: e.to_string(),
    })
}

/// Send a prepared request and map the response onto delivery semantics:
/// status below 400 is success, anything at or above is a rejected report.
/// Transport failures become `Delivery` errors and are never retried here.
pub(crate) async fn execute(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<bool, ReporterError> {
    let response = request
        .send()
        .await
        .map_err(|source| ReporterError::Delivery { service, source })?;

    let status = response.status();
    let delivered = status.as_u16() < 400;
    if !delivered {
        tracing::warn!(service, status = %status, "report rejected by remote service");
    }
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_singular_for_one_package() {
        assert_eq!(report_title(1), "1 outdated package");
    }

    #[test]
    fn title_is_plural_otherwise() {
        assert_eq!(report_title(2), "2 outdated packages");
        assert_eq!(report_title(0), "0 outdated packages");
    }

    #[test]
    fn package_url_is_built_from_name() {
        assert_eq!(
            package_url("foo/foo"),
            "https://packagist.org/packages/foo/foo"
        );
    }

    #[test]
    fn blank_url_is_invalid() {
        let err = parse_service_url("slack", "   ").unwrap_err();
        assert!(matches!(
            err,
            ReporterError::InvalidConfiguration { service: "slack", field: "url", .. }
        ));
    }

    #[test]
    fn malformed_url_is_invalid() {
        let err = parse_service_url("slack", "not a url").unwrap_err();
        assert!(matches!(
            err,
            ReporterError::InvalidConfiguration { field: "url", .. }
        ));
    }

    #[test]
    fn valid_url_parses() {
        let url = parse_service_url("slack", "https://example.org/hooks/x").unwrap();
        assert_eq!(url.as_str(), "https://example.org/hooks/x");
    }

    #[test]
    fn default_services_are_unique_and_ordered() {
        let services = default_services();
        let names: Vec<&str> = services.iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["gitlab", "mattermost", "slack", "teams"]);
    }
}
