//! Entity extraction
//!
//! Projects the software cluster elements of a [`SourceModel`] onto [`SoftwareCluster`]s,
//! deriving each cluster's physical diagnostic address. Extraction never drops an element:
//! a cluster without a usable physical address is still produced with
//! [`NO_PHYSICAL_ADDRESS`] and validation decides how severe that is.

use crate::error::GenerationError;
use crate::report::ResultSink;
use crate::source::{DiagnosticContributionRef, SoftwareClusterElement, SourceModel};
use serde::{Deserialize, Serialize};

/// Sentinel for "no physical diagnostic address configured"
pub const NO_PHYSICAL_ADDRESS: i64 = -1;

/// A deployable unit as seen by the generator. Immutable once extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareCluster {
    name: String,
    physical_address: i64,
    diagnostic_contribution: Option<DiagnosticContributionRef>,
}

impl SoftwareCluster {
    pub fn new(
        name: impl Into<String>,
        physical_address: i64,
        diagnostic_contribution: Option<DiagnosticContributionRef>,
    ) -> Self {
        Self {
            name: name.into(),
            physical_address,
            diagnostic_contribution,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn physical_address(&self) -> i64 {
        self.physical_address
    }

    pub fn has_physical_address(&self) -> bool {
        self.physical_address != NO_PHYSICAL_ADDRESS
    }

    pub fn diagnostic_contribution(&self) -> Option<&DiagnosticContributionRef> {
        self.diagnostic_contribution.as_ref()
    }
}

/// Extract every software cluster of the model, in model order.
///
/// Malformed physical addresses are reported to `sink` and the cluster falls back to
/// [`NO_PHYSICAL_ADDRESS`].
pub fn extract_software_clusters(
    source: &dyn SourceModel,
    sink: &mut dyn ResultSink,
) -> Vec<SoftwareCluster> {
    source
        .software_clusters()
        .iter()
        .map(|element| {
            let physical_address = match physical_address_of(element) {
                Ok(address) => address,
                Err(error) => {
                    tracing::warn!(cluster = %element.name, %error, "malformed software cluster");
                    sink.report_error(&error);
                    NO_PHYSICAL_ADDRESS
                }
            };
            SoftwareCluster::new(
                element.name.clone(),
                physical_address,
                element.diagnostic_contribution.clone(),
            )
        })
        .collect()
}

/// Physical address of one element: the first entry tagged physical must carry a network
/// address field.
pub fn physical_address_of(element: &SoftwareClusterElement) -> Result<i64, GenerationError> {
    let Some(entry) = element
        .diagnostic_addresses
        .iter()
        .find(|address| address.is_physical())
    else {
        return Ok(NO_PHYSICAL_ADDRESS);
    };

    entry
        .address
        .network_address()
        .ok_or_else(|| GenerationError::MalformedEntity {
            cluster: element.name.clone(),
            scheme: entry.address.scheme().to_string(),
        })
}
