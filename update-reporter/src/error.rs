use thiserror::Error;

/// Error taxonomy for the dispatch layer.
///
/// Configuration errors are raised at service construction and abort the
/// whole run. `Delivery` covers transport-level failures only; a remote
/// service rejecting the payload is a normal `false` outcome, not an error.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error(
        "{service} {field} is not defined, set it in the update-check settings or via ${env_var}"
    )]
    MissingConfiguration {
        service: &'static str,
        field: &'static str,
        env_var: String,
    },

    #[error("invalid {service} {field}: {reason}")]
    InvalidConfiguration {
        service: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("{name:?} does not satisfy the notification service contract")]
    InvalidService { name: String },

    #[error("failed to deliver {service} report")]
    Delivery {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
}
