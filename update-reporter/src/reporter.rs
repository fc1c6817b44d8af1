use tracing::{debug, warn};

use crate::config::Configuration;
use crate::error::ReporterError;
use crate::io::{Options, OutputBehavior};
use crate::report::CheckResult;
use crate::service::{ServiceDescriptor, default_services};

/// Drives one report run: filters the registered services down to the
/// enabled ones, constructs and configures each, then delivers to all of
/// them in registration order.
pub struct Reporter {
    behavior: OutputBehavior,
    options: Options,
    registry: Vec<ServiceDescriptor>,
    configuration: Configuration,
}

/// Per-service delivery outcome of one run. `Ok(false)` means the remote
/// service rejected the payload; `Err` is a transport failure carrying the
/// cause.
#[derive(Debug)]
pub struct ServiceOutcome {
    pub service: &'static str,
    pub result: Result<bool, ReporterError>,
}

/// Aggregated outcome of one run, in delivery order.
#[derive(Debug)]
pub struct RunReport {
    outcomes: Vec<ServiceOutcome>,
}

impl RunReport {
    pub fn outcomes(&self) -> &[ServiceOutcome] {
        &self.outcomes
    }

    /// Overall success: every enabled service delivered with a success
    /// response. Vacuously true when no service was enabled.
    pub fn successful(&self) -> bool {
        self.outcomes.iter().all(|o| matches!(o.result, Ok(true)))
    }
}

impl Reporter {
    /// Reporter with the built-in service set.
    pub fn new(configuration: Configuration) -> Self {
        Self::with_services(configuration, default_services())
    }

    /// Reporter with a caller-owned service registry.
    pub fn with_services(configuration: Configuration, services: Vec<ServiceDescriptor>) -> Self {
        Self {
            behavior: OutputBehavior::default(),
            options: Options::default(),
            registry: services,
            configuration,
        }
    }

    pub fn set_behavior(&mut self, behavior: OutputBehavior) {
        self.behavior = behavior;
    }

    pub fn set_options(&mut self, options: Options) {
        self.options = options;
    }

    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.registry
    }

    /// Append a service type to the registry. Registering an already
    /// present type is a no-op; insertion order is preserved for new
    /// entries.
    pub fn register_service(
        &mut self,
        descriptor: ServiceDescriptor,
    ) -> Result<(), ReporterError> {
        if descriptor.name.trim().is_empty() {
            return Err(ReporterError::InvalidService {
                name: descriptor.name.to_string(),
            });
        }
        if !self.registry.contains(&descriptor) {
            self.registry.push(descriptor);
        }
        Ok(())
    }

    /// Remove a service type from the registry; no-op when absent.
    pub fn unregister_service(&mut self, descriptor: &ServiceDescriptor) {
        self.registry.retain(|d| d != descriptor);
    }

    /// Run one report.
    ///
    /// An enabled service that fails to construct aborts the whole run —
    /// enabled-but-misconfigured is operator error and surfaces
    /// immediately, unlike disabled services which are silently skipped.
    /// Delivery failures do not short-circuit the remaining services; each
    /// outcome lands in the returned [`RunReport`].
    pub async fn report(&self, result: &CheckResult) -> Result<RunReport, ReporterError> {
        let mut services = Vec::new();
        for descriptor in &self.registry {
            if !(descriptor.is_enabled)(&self.configuration) {
                debug!(service = descriptor.name, "service disabled, skipping");
                continue;
            }
            let mut service = (descriptor.from_configuration)(&self.configuration)?;
            service.set_behavior(self.behavior.clone());
            service.set_options(self.options);
            services.push(service);
        }

        let mut outcomes = Vec::with_capacity(services.len());
        for service in &services {
            let name = service.name();
            let delivery = service.deliver(result).await;
            match &delivery {
                Ok(true) => debug!(service = name, "report delivered"),
                Ok(false) => warn!(service = name, "report rejected"),
                Err(error) => warn!(service = name, error = %error, "delivery failed"),
            }
            outcomes.push(ServiceOutcome {
                service: name,
                result: delivery,
            });
        }

        Ok(RunReport { outcomes })
    }
}
