//! Module catalog and scan profiles
//!
//! The catalog is built once at startup and handed around by reference.
//! Nothing mutates it afterwards.

use serde::{Deserialize, Serialize};

/// Built-in Pacu modules (name, requires region argument).
///
/// Module names may vary by Pacu version.
const BUILTIN_MODULES: &[(&str, bool)] = &[
    ("aws__enum_account", false),
    ("iam__enum_users_roles_policies_groups", false),
    ("iam__enum_permissions", false),
    ("ec2__enum", true),
    ("lambda__enum", true),
    ("route53__enum", false),
    ("ebs__enum_volumes_snapshots", true),
    ("vpc__enum_lateral_movement", true),
    ("secrets__enum", true),
    ("rds__enum", true),
    ("ecs__enum", true),
    ("ecr__enum", true),
    ("guardduty__list_detectors", true),
];

/// Modules run when the caller selects none
const DEFAULT_MODULES: &[&str] = &[
    "iam__enum_users_roles_policies_groups",
    "ec2__enum",
    "lambda__enum",
    "route53__enum",
];

/// Curated, read-only scan profiles (name, description, modules)
const BUILTIN_PROFILES: &[(&str, &str, &[&str])] = &[
    (
        "basic",
        "Core account info, IAM, and EC2 enumeration.",
        &[
            "aws__enum_account",
            "iam__enum_users_roles_policies_groups",
            "ec2__enum",
        ],
    ),
    (
        "iam",
        "IAM-focused enumeration.",
        &["iam__enum_users_roles_policies_groups", "iam__enum_permissions"],
    ),
    (
        "network",
        "EC2, VPC, and Route53 enumeration.",
        &["ec2__enum", "vpc__enum_lateral_movement", "route53__enum"],
    ),
];

/// A known enumeration module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    pub requires_region: bool,
}

/// A named list of modules representing a scan intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProfile {
    pub name: String,
    pub description: String,
    pub modules: Vec<String>,
}

/// Registry of known modules and their argument requirements
#[derive(Debug, Clone)]
pub struct ModuleCatalog {
    modules: Vec<ModuleDescriptor>,
    default_set: Vec<String>,
    profiles: Vec<ScanProfile>,
}

impl Default for ModuleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModuleCatalog {
    /// Catalog of the modules shipped with this console
    pub fn builtin() -> Self {
        let modules = BUILTIN_MODULES
            .iter()
            .map(|(name, requires_region)| ModuleDescriptor {
                name: name.to_string(),
                requires_region: *requires_region,
            })
            .collect();

        let profiles = BUILTIN_PROFILES
            .iter()
            .map(|(name, description, modules)| ScanProfile {
                name: name.to_string(),
                description: description.to_string(),
                modules: modules.iter().map(|m| m.to_string()).collect(),
            })
            .collect();

        Self {
            modules,
            default_set: DEFAULT_MODULES.iter().map(|m| m.to_string()).collect(),
            profiles,
        }
    }

    /// Build a catalog from explicit parts
    pub fn new(
        modules: Vec<ModuleDescriptor>,
        default_set: Vec<String>,
        profiles: Vec<ScanProfile>,
    ) -> Self {
        Self {
            modules,
            default_set,
            profiles,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether the module needs a `--regions` argument. Unknown modules never do.
    pub fn requires_region(&self, name: &str) -> bool {
        self.get(name).map(|m| m.requires_region).unwrap_or(false)
    }

    /// Return the names that are not in the catalog, in input order.
    ///
    /// An empty result means every name is valid.
    pub fn validate<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        names
            .iter()
            .filter(|name| !self.contains(name.as_ref()))
            .map(|name| name.as_ref().to_string())
            .collect()
    }

    /// Fallback module list used when the caller selects none
    pub fn default_set(&self) -> Vec<String> {
        self.default_set.clone()
    }

    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn profile(&self, name: &str) -> Option<&ScanProfile> {
        self.profiles.iter().find(|p| p.name == name)
    }

    pub fn profiles(&self) -> &[ScanProfile] {
        &self.profiles
    }
}
