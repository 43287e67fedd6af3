//! Service identities managed by the rollback webhook.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A service that can be rolled back.
///
/// Closed set: anything outside it is rejected at the HTTP boundary and
/// never reaches the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceName {
    OrderService,
    InventoryService,
    PaymentService,
}

impl ServiceName {
    /// All managed services.
    pub const ALL: [ServiceName; 3] = [
        ServiceName::OrderService,
        ServiceName::InventoryService,
        ServiceName::PaymentService,
    ];

    /// Compose service name, e.g. "order-service".
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceName::OrderService => "order-service",
            ServiceName::InventoryService => "inventory-service",
            ServiceName::PaymentService => "payment-service",
        }
    }

    /// Version store key for this service: uppercased, `-` replaced with
    /// `_`, suffixed with `_VERSION` (e.g. `ORDER_SERVICE_VERSION`).
    pub fn version_key(&self) -> String {
        format!("{}_VERSION", self.as_str().to_uppercase().replace('-', "_"))
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for service names outside the managed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown service '{0}' (expected order-service, inventory-service or payment-service)")]
pub struct ParseServiceError(pub String);

impl FromStr for ServiceName {
    type Err = ParseServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order-service" => Ok(ServiceName::OrderService),
            "inventory-service" => Ok(ServiceName::InventoryService),
            "payment-service" => Ok(ServiceName::PaymentService),
            other => Err(ParseServiceError(other.to_string())),
        }
    }
}
