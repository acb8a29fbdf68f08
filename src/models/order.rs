//! Order records as accepted over HTTP and as stored in the `orders` collection.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::config::{ORDER_SOURCE_PLACEHOLDER, ORDER_STATUS_OPEN};

/// An order submitted by a client.
///
/// Field names on the wire match what existing clients already send
/// (`EmailAddress`, `Total`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Order {
    /// Assigned on capture; any client-supplied value is replaced
    #[serde(rename = "ID", default)]
    pub id: String,
    #[serde(default)]
    pub email_address: String,
    #[serde(default)]
    pub preferred_language: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub total: f64,
    /// Channel the order came from, e.g. App Service or a Kubernetes cluster
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub status: String,
}

impl Order {
    /// Prepare an order for storage: fresh id, `Open` status, and the default
    /// source when the client left it blank or sent the placeholder.
    pub fn open(mut self, default_source: &str) -> Self {
        self.id = ObjectId::new().to_hex();
        self.status = ORDER_STATUS_OPEN.to_string();
        if self.source.is_empty() || self.source == ORDER_SOURCE_PLACEHOLDER {
            self.source = default_source.to_string();
        }
        self
    }
}

/// Document layout in the `orders` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOrder {
    #[serde(rename = "_id")]
    pub id: String,
    pub emailaddress: String,
    #[serde(default)]
    pub preferredlanguage: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub status: String,
}

impl From<Order> for StoredOrder {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            emailaddress: order.email_address,
            preferredlanguage: order.preferred_language,
            product: order.product,
            total: order.total,
            source: order.source,
            status: order.status,
        }
    }
}

impl From<StoredOrder> for Order {
    fn from(doc: StoredOrder) -> Self {
        Self {
            id: doc.id,
            email_address: doc.emailaddress,
            preferred_language: doc.preferredlanguage,
            product: doc.product,
            total: doc.total,
            source: doc.source,
            status: doc.status,
        }
    }
}
