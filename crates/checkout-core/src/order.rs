//! Order Models
//!
//! Orders are created as a side effect of checkout conversion and then
//! patched with payment attributes and a status.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CheckoutError, Result};

/// Upstream order identifier
///
/// BigCommerce returns numeric ids; the value is kept as a string so it can be
/// echoed into URLs and logs unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Decode from a JSON number or non-empty string
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => Some(Self(n.to_string())),
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(Self(s.clone())),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom("order id must be a number or non-empty string"))
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order status codes from the BigCommerce Orders API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Incomplete,
    Pending,
    Shipped,
    PartiallyShipped,
    Refunded,
    Cancelled,
    Declined,
    AwaitingPayment,
    AwaitingPickup,
    AwaitingShipment,
    Completed,
    AwaitingFulfillment,
    ManualVerificationRequired,
    Disputed,
    PartiallyRefunded,
}

impl OrderStatus {
    pub const ALL: [Self; 15] = [
        Self::Incomplete,
        Self::Pending,
        Self::Shipped,
        Self::PartiallyShipped,
        Self::Refunded,
        Self::Cancelled,
        Self::Declined,
        Self::AwaitingPayment,
        Self::AwaitingPickup,
        Self::AwaitingShipment,
        Self::Completed,
        Self::AwaitingFulfillment,
        Self::ManualVerificationRequired,
        Self::Disputed,
        Self::PartiallyRefunded,
    ];

    pub const fn id(self) -> i64 {
        self as i64
    }

    /// Negative and unlisted ids map to `None`
    pub fn from_id(id: i64) -> Option<Self> {
        Self::ALL.get(usize::try_from(id).ok()?).copied()
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Incomplete => "Incomplete",
            Self::Pending => "Pending",
            Self::Shipped => "Shipped",
            Self::PartiallyShipped => "Partially Shipped",
            Self::Refunded => "Refunded",
            Self::Cancelled => "Cancelled",
            Self::Declined => "Declined",
            Self::AwaitingPayment => "Awaiting Payment",
            Self::AwaitingPickup => "Awaiting Pickup",
            Self::AwaitingShipment => "Awaiting Shipment",
            Self::Completed => "Completed",
            Self::AwaitingFulfillment => "Awaiting Fulfillment",
            Self::ManualVerificationRequired => "Manual Verification Required",
            Self::Disputed => "Disputed",
            Self::PartiallyRefunded => "Partially Refunded",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (ID: {})", self.label(), self.id())
    }
}

/// Payment and status fields applied to a freshly created order
///
/// `status_id` is sent as-is; range checking belongs to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub payment_method: String,
    pub payment_provider_id: String,
    pub status_id: i64,
}

impl Default for OrderUpdate {
    fn default() -> Self {
        Self {
            payment_method: "ExternalPayment".into(),
            payment_provider_id: "transaction_123456789".into(),
            status_id: OrderStatus::AwaitingFulfillment.id(),
        }
    }
}

impl OrderUpdate {
    /// Known status for `status_id`, if it is within the enumeration
    pub fn status(&self) -> Option<OrderStatus> {
        OrderStatus::from_id(self.status_id)
    }

    /// Describe the status for log lines, tolerating unknown ids
    pub fn status_label(&self) -> String {
        self.status()
            .map_or_else(|| format!("Unknown (ID: {})", self.status_id), |s| s.to_string())
    }
}

/// Result of converting a checkout into an order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreatedOrder {
    pub id: OrderId,

    /// Full upstream payload
    pub raw: serde_json::Value,
}

impl CreatedOrder {
    /// Extract `data.id` from a conversion response
    pub fn from_response(body: serde_json::Value) -> Result<Self> {
        let id = body
            .get("data")
            .and_then(|d| d.get("id"))
            .and_then(OrderId::from_json)
            .ok_or(CheckoutError::MissingOrderId)?;
        Ok(Self { id, raw: body })
    }
}

/// Order details, retained for diagnostics
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderDetails {
    pub id: OrderId,
    pub status_id: Option<i64>,
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub total_inc_tax: Option<String>,
    pub raw: serde_json::Value,
}

impl OrderDetails {
    /// Decode a v2 order payload; `fallback_id` is used when the body omits `id`
    pub fn from_response(body: serde_json::Value, fallback_id: &OrderId) -> Self {
        let text = |key: &str| {
            body.get(key).and_then(|v| match v {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
        };

        Self {
            id: body
                .get("id")
                .and_then(OrderId::from_json)
                .unwrap_or_else(|| fallback_id.clone()),
            status_id: body
                .get("status_id")
                .and_then(serde_json::Value::as_i64),
            status: text("status"),
            payment_method: text("payment_method"),
            total_inc_tax: text("total_inc_tax"),
            raw: body,
        }
    }

    /// One-line description used in the flow log
    pub fn describe(&self) -> String {
        let status = match (self.status.as_deref(), self.status_id) {
            (Some(label), Some(id)) => format!("{label} (ID: {id})"),
            (Some(label), None) => label.to_string(),
            (None, Some(id)) => OrderStatus::from_id(id)
                .map_or_else(|| format!("Unknown (ID: {id})"), |s| s.to_string()),
            (None, None) => "unknown".to_string(),
        };
        match &self.total_inc_tax {
            Some(total) => format!("Order {} status {status}, total {total}", self.id),
            None => format!("Order {} status {status}", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_enumeration() {
        assert_eq!(OrderStatus::ALL.len(), 15);
        assert_eq!(OrderStatus::from_id(11), Some(OrderStatus::AwaitingFulfillment));
        assert_eq!(OrderStatus::AwaitingFulfillment.label(), "Awaiting Fulfillment");
        assert_eq!(OrderStatus::from_id(14), Some(OrderStatus::PartiallyRefunded));
        assert_eq!(OrderStatus::from_id(15), None);

        for (idx, status) in OrderStatus::ALL.iter().enumerate() {
            assert_eq!(usize::try_from(status.id()).unwrap(), idx);
        }
    }

    #[test]
    fn test_out_of_range_status_passes_through() {
        let update = OrderUpdate { status_id: 42, ..Default::default() };
        assert_eq!(update.status(), None);
        assert_eq!(update.status_label(), "Unknown (ID: 42)");

        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body["status_id"], 42);

        let negative: OrderUpdate = serde_json::from_value(json!({
            "payment_method": "ExternalPayment",
            "payment_provider_id": "txn-1",
            "status_id": -1
        }))
        .unwrap();
        assert_eq!(negative.status(), None);
        assert_eq!(negative.status_label(), "Unknown (ID: -1)");
        assert_eq!(OrderStatus::from_id(-1), None);
    }

    #[test]
    fn test_created_order_id_extraction() {
        let order = CreatedOrder::from_response(json!({"data": {"id": 123456}})).unwrap();
        assert_eq!(order.id.as_str(), "123456");

        let order = CreatedOrder::from_response(json!({"data": {"id": "A-77"}})).unwrap();
        assert_eq!(order.id.as_str(), "A-77");

        let missing = CreatedOrder::from_response(json!({"data": {}}));
        assert!(matches!(missing, Err(CheckoutError::MissingOrderId)));

        let blank = CreatedOrder::from_response(json!({"data": {"id": ""}}));
        assert!(matches!(blank, Err(CheckoutError::MissingOrderId)));
    }

    #[test]
    fn test_order_details_describe() {
        let details = OrderDetails::from_response(
            json!({"id": 100, "status_id": 0, "status": "Incomplete", "total_inc_tax": "118.9500"}),
            &OrderId::new("100"),
        );
        assert_eq!(details.describe(), "Order 100 status Incomplete (ID: 0), total 118.9500");

        let sparse = OrderDetails::from_response(json!({}), &OrderId::new("9"));
        assert_eq!(sparse.id.as_str(), "9");
        assert_eq!(sparse.describe(), "Order 9 status unknown");
    }
}
