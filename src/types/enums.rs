//! Enumeration types for the call center simulator
//!
//! This module contains the tracked activity names, the support-flow path
//! variants a scenario can enable, and the terminal outcomes of a support call.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Named, timed units of work tracked for occupancy and runtime statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Whole support call, from config check to resolution or escalation
    Support,
    /// Check whether the customer device is configured correctly
    IsConfigCorrect,
    /// Reset cached memory on the device
    ResetCachedMemory,
    /// Apply configuration to the device
    ConfigureDevice,
    /// Confirm with the customer whether the problem is solved
    IsProblemSolved,
    /// Reboot the device
    RebootDevice,
    /// Run a diagnostic on the device (retried on low-level failure)
    InitiateDiagnostic,
    /// Check whether the device needs a software update
    IsUpgradeNeeded,
    /// Install a software update
    UpdateSoftware,
    /// Hardware diagnostic
    IsHwIssue,
    /// Look for a known solution in the remote legacy archives
    QueryRemoteArchives,
    /// Close the incident after the call
    UpdateIncident,
    /// Registration check for an arriving customer
    IsRegistered,
    /// Registration of a customer not found in the database
    RegisterNewCustomer,
}

impl Activity {
    /// Every tracked activity
    pub const ALL: [Activity; 14] = [
        Activity::Support,
        Activity::IsConfigCorrect,
        Activity::ResetCachedMemory,
        Activity::ConfigureDevice,
        Activity::IsProblemSolved,
        Activity::RebootDevice,
        Activity::InitiateDiagnostic,
        Activity::IsUpgradeNeeded,
        Activity::UpdateSoftware,
        Activity::IsHwIssue,
        Activity::QueryRemoteArchives,
        Activity::UpdateIncident,
        Activity::IsRegistered,
        Activity::RegisterNewCustomer,
    ];

    /// Name used in the audit log and statistics exports
    pub fn as_str(self) -> &'static str {
        match self {
            Activity::Support => "support",
            Activity::IsConfigCorrect => "is_config_correct",
            Activity::ResetCachedMemory => "reset_cached_memory",
            Activity::ConfigureDevice => "configure_device",
            Activity::IsProblemSolved => "is_problem_solved",
            Activity::RebootDevice => "reboot_device",
            Activity::InitiateDiagnostic => "initiate_diagnostic",
            Activity::IsUpgradeNeeded => "is_upgrade_needed",
            Activity::UpdateSoftware => "update_software",
            Activity::IsHwIssue => "is_hw_issue",
            Activity::QueryRemoteArchives => "query_remote_archives",
            Activity::UpdateIncident => "update_incident",
            Activity::IsRegistered => "is_registered",
            Activity::RegisterNewCustomer => "register_new_customer",
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Activity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Activity::ALL
            .iter()
            .copied()
            .find(|activity| activity.as_str() == s)
            .ok_or_else(|| format!("Unknown activity: {}", s))
    }
}

/// Scenario-selected modifications of the support workflow
///
/// Variant ids are the integers used in scenario files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathVariant {
    /// Nominal flow; enabling it changes nothing
    Nominal,
    /// Repair order becomes {configure, reset cache, solved check}
    ReorderRepair,
    /// After repair, optionally reboot and re-check before diagnostics
    InsertReboot,
}

impl PathVariant {
    /// Numeric id as written in scenario files
    pub fn id(self) -> u8 {
        match self {
            PathVariant::Nominal => 0,
            PathVariant::ReorderRepair => 1,
            PathVariant::InsertReboot => 2,
        }
    }
}

impl TryFrom<u8> for PathVariant {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(PathVariant::Nominal),
            1 => Ok(PathVariant::ReorderRepair),
            2 => Ok(PathVariant::InsertReboot),
            other => Err(format!("Unknown path variant id: {} (expected 0, 1 or 2)", other)),
        }
    }
}

impl fmt::Display for PathVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathVariant::Nominal => write!(f, "nominal"),
            PathVariant::ReorderRepair => write!(f, "reorder-repair"),
            PathVariant::InsertReboot => write!(f, "insert-reboot"),
        }
    }
}

/// Set of enabled path variants
///
/// Scenario files may give a single integer or a list of integers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathVariants(BTreeSet<PathVariant>);

impl PathVariants {
    /// No variant enabled
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether `variant` is enabled
    pub fn contains(&self, variant: PathVariant) -> bool {
        self.0.contains(&variant)
    }

    /// Enable `variant`
    pub fn insert(&mut self, variant: PathVariant) {
        self.0.insert(variant);
    }

    /// Enabled variants in id order
    pub fn iter(&self) -> impl Iterator<Item = PathVariant> + '_ {
        self.0.iter().copied()
    }

    /// Whether nothing besides the nominal flow is enabled
    pub fn is_nominal(&self) -> bool {
        self.0.iter().all(|v| *v == PathVariant::Nominal)
    }
}

impl FromIterator<PathVariant> for PathVariants {
    fn from_iter<I: IntoIterator<Item = PathVariant>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for PathVariants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<String> = self.iter().map(|v| v.id().to_string()).collect();
        write!(f, "[{}]", ids.join(", "))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(u8),
    Many(Vec<u8>),
}

impl<'de> Deserialize<'de> for PathVariants {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ids = match OneOrMany::deserialize(deserializer)? {
            OneOrMany::One(id) => vec![id],
            OneOrMany::Many(ids) => ids,
        };
        ids.into_iter()
            .map(|id| PathVariant::try_from(id).map_err(serde::de::Error::custom))
            .collect()
    }
}

impl Serialize for PathVariants {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.iter().map(PathVariant::id))
    }
}

/// How a support call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupportOutcome {
    /// A solved check confirmed the problem is fixed
    Resolved,
    /// The hardware diagnostic found a fault; the device goes to the lab
    HardwareReferral,
    /// Every remediation step ran without success; customer sent to a desk
    Escalated,
}

impl fmt::Display for SupportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportOutcome::Resolved => write!(f, "Resolved"),
            SupportOutcome::HardwareReferral => write!(f, "Hardware Referral"),
            SupportOutcome::Escalated => write!(f, "Escalated"),
        }
    }
}
