//! Source model query service
//!
//! The generator only needs a narrow view of the system model: the list of software
//! clusters, and per cluster its name, its diagnostic addresses and a reference to its
//! diagnostic contribution. [`SourceModel`] is that view; [`SourceModelDocument`] is a
//! serde-backed implementation used by the binary and the tests.

pub mod document;

pub use document::SourceModelDocument;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Read-only query surface over the system model
pub trait SourceModel {
    /// Every software cluster element in model order
    fn software_clusters(&self) -> &[SoftwareClusterElement];
}

/// A software cluster as it appears in the source model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareClusterElement {
    pub name: String,
    #[serde(default)]
    pub diagnostic_addresses: Vec<DiagnosticAddress>,
    #[serde(default)]
    pub diagnostic_contribution: Option<DiagnosticContributionRef>,
}

impl SoftwareClusterElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diagnostic_addresses: Vec::new(),
            diagnostic_contribution: None,
        }
    }

    pub fn with_address(mut self, address: DiagnosticAddress) -> Self {
        self.diagnostic_addresses.push(address);
        self
    }

    pub fn with_contribution(mut self, contribution: impl Into<String>) -> Self {
        self.diagnostic_contribution = Some(DiagnosticContributionRef(contribution.into()));
        self
    }
}

/// One addressing entry of a software cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticAddress {
    pub semantics: AddressSemantics,
    pub address: AddressPayload,
}

impl DiagnosticAddress {
    /// Physical DoIP logical address
    pub fn physical(logical_address: i64) -> Self {
        Self {
            semantics: AddressSemantics::PhysicalAddress,
            address: AddressPayload::Doip {
                logical_address: Some(logical_address),
            },
        }
    }

    /// Functional DoIP logical address
    pub fn functional(logical_address: i64) -> Self {
        Self {
            semantics: AddressSemantics::FunctionalAddress,
            address: AddressPayload::Doip {
                logical_address: Some(logical_address),
            },
        }
    }

    pub fn is_physical(&self) -> bool {
        self.semantics == AddressSemantics::PhysicalAddress
    }
}

/// Semantic tag of a diagnostic address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressSemantics {
    PhysicalAddress,
    FunctionalAddress,
    /// Any other tag; such entries never supply the physical address
    #[serde(other)]
    Other,
}

/// Addressing payload, tagged by scheme.
///
/// Address fields are optional so an incomplete entry stays a per-cluster problem
/// instead of failing the whole document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "kebab-case")]
pub enum AddressPayload {
    /// Network-reachable DoIP logical address
    Doip {
        #[serde(default)]
        logical_address: Option<i64>,
    },
    /// CAN transport identifier
    Can {
        #[serde(default)]
        identifier: Option<u32>,
    },
    /// Any scheme the generator does not understand
    #[serde(other)]
    Unknown,
}

impl AddressPayload {
    pub fn scheme(&self) -> &'static str {
        match self {
            AddressPayload::Doip { .. } => "doip",
            AddressPayload::Can { .. } => "can",
            AddressPayload::Unknown => "unknown",
        }
    }

    /// Integer value of the network address field, if this scheme carries one
    pub fn network_address(&self) -> Option<i64> {
        match self {
            AddressPayload::Doip { logical_address } => *logical_address,
            AddressPayload::Can { .. } | AddressPayload::Unknown => None,
        }
    }
}

/// Opaque reference to a cluster's diagnostic contribution; passed through untouched
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiagnosticContributionRef(pub String);

impl fmt::Display for DiagnosticContributionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl SourceModel for Vec<SoftwareClusterElement> {
    fn software_clusters(&self) -> &[SoftwareClusterElement] {
        self
    }
}
