use serde::{Deserialize, Serialize};

/// One dependency with a newer version available, as emitted by the
/// external update check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutdatedPackage {
    pub name: String,
    pub current_version: String,
    pub new_version: String,
    #[serde(default)]
    pub insecure: bool,
}

impl OutdatedPackage {
    pub fn new(
        name: impl Into<String>,
        current_version: impl Into<String>,
        new_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            current_version: current_version.into(),
            new_version: new_version.into(),
            insecure: false,
        }
    }

    pub fn insecure(mut self) -> Self {
        self.insecure = true;
        self
    }
}

/// The full set of outdated packages from one check run, in the order the
/// check emitted them. May be empty, in which case services skip delivery
/// and report success.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(default)]
    outdated_packages: Vec<OutdatedPackage>,
}

impl CheckResult {
    pub fn new(outdated_packages: Vec<OutdatedPackage>) -> Self {
        Self { outdated_packages }
    }

    pub fn is_empty(&self) -> bool {
        self.outdated_packages.is_empty()
    }

    pub fn outdated_packages(&self) -> &[OutdatedPackage] {
        &self.outdated_packages
    }
}

impl From<Vec<OutdatedPackage>> for CheckResult {
    fn from(outdated_packages: Vec<OutdatedPackage>) -> Self {
        Self::new(outdated_packages)
    }
}
