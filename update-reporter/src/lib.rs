pub mod config;
pub mod error;
pub mod io;
pub mod report;
pub mod reporter;
pub mod service;

pub use config::Configuration;
pub use error::ReporterError;
pub use io::{Options, OutputBehavior, Style, Verbosity};
pub use report::{CheckResult, OutdatedPackage};
pub use reporter::{Reporter, RunReport, ServiceOutcome};
pub use service::{Service, ServiceDescriptor};
