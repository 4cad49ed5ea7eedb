//! Company and staff records.
//!
//! Both are managed externally (onboarding, contracts) and read-only to the
//! engines: companies carry the contract terms and role assignments that
//! drive reconciliation and payout, staff records exist so payout entries
//! can be attributed by name.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The service roles a company can have staffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Accountant,
    BankClient,
    Supervisor,
    ChiefAccountant,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Accountant,
        Role::BankClient,
        Role::Supervisor,
        Role::ChiefAccountant,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Accountant => "accountant",
            Role::BankClient => "bank_client",
            Role::Supervisor => "supervisor",
            Role::ChiefAccountant => "chief_accountant",
        }
    }

    /// Default percent-of-contract share, used when the company carries no
    /// override for the role.
    pub fn default_percent(self) -> f64 {
        match self {
            Role::Accountant => 20.0,
            Role::BankClient => 5.0,
            Role::Supervisor => 10.0,
            Role::ChiefAccountant => 15.0,
        }
    }
}

/// A per-role pay override: a fixed sum, a percent of contract, or neither
/// (the role default percent applies).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleShare {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_sum: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
}

/// A client company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,

    /// External registration number. May be absent or a placeholder;
    /// empty strings are treated as absent.
    #[serde(default)]
    pub tax_id: Option<String>,

    pub name: String,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Monthly contract value. Absent in imports means not yet agreed.
    #[serde(default)]
    pub contract_amount: f64,

    /// Per-role pay overrides.
    #[serde(default)]
    pub shares: BTreeMap<Role, RoleShare>,

    /// Role → staff member holding it.
    #[serde(default)]
    pub assignments: BTreeMap<Role, Uuid>,

    /// Enabled task templates. `None` means every template in the catalog
    /// is enabled; `Some(set)` means exactly the listed keys.
    #[serde(default)]
    pub enabled_templates: Option<BTreeSet<String>>,
}

impl Company {
    /// The tax id, with empty and whitespace-only values treated as absent.
    pub fn tax_id(&self) -> Option<&str> {
        self.tax_id
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Whether the template is enabled for this company.
    pub fn template_enabled(&self, key: &str) -> bool {
        match &self.enabled_templates {
            None => true,
            Some(set) => set.contains(key),
        }
    }
}

/// A staff member of the firm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: Uuid,
    pub name: String,
}

fn default_active() -> bool {
    true
}
