//! Order domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use printshare_core::{OrderId, OrderStatus, PaymentStatus, Price, PrinterId, UserId};

/// A customer's print request against a printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// The ordering user. Never changes after creation.
    pub customer_id: UserId,
    pub printer_id: PrinterId,
    /// Printer name at the moment the order was placed. Does not follow
    /// later renames of the printer.
    pub printer_name: String,
    pub status: OrderStatus,
    /// Opaque reference to the uploaded model file.
    pub model_file_url: String,
    pub model_file_name: String,
    pub total_price: Price,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by a customer when placing an order.
///
/// Any `printerName` sent by the client is ignored; the name is copied from
/// the printer record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub printer_id: PrinterId,
    pub model_file_url: String,
    pub model_file_name: String,
    pub total_price: Price,
}

/// Requested status changes for an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

/// Which side of the marketplace an order listing is viewed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderScope {
    /// Orders the caller placed.
    Customer,
    /// Orders placed against the caller's printers.
    Owner,
    /// Both of the above, without duplicates.
    #[default]
    All,
}

impl Order {
    /// Build a fresh order in its initial (`pending`/`pending`) state.
    #[must_use]
    pub fn place(
        id: OrderId,
        customer_id: UserId,
        printer_name: String,
        request: NewOrder,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer_id,
            printer_id: request.printer_id,
            printer_name,
            status: OrderStatus::Pending,
            model_file_url: request.model_file_url,
            model_file_name: request.model_file_name,
            total_price: request.total_price,
            payment_status: PaymentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

impl OrderScope {
    /// Read a `?filter=` value. Anything but `customer` or `owner` means
    /// both sides.
    #[must_use]
    pub fn from_filter(filter: Option<&str>) -> Self {
        match filter.map(str::trim) {
            Some("customer") => Self::Customer,
            Some("owner") => Self::Owner,
            _ => Self::All,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_from_json() {
        let patch: OrderPatch =
            serde_json::from_str(r#"{"status":"approved","paymentStatus":"paid"}"#).unwrap();
        assert_eq!(patch.status, Some(OrderStatus::Approved));
        assert_eq!(patch.payment_status, Some(PaymentStatus::Paid));

        let empty: OrderPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, OrderPatch::default());
    }

    #[test]
    fn test_patch_rejects_unknown_status() {
        assert!(serde_json::from_str::<OrderPatch>(r#"{"status":"shipped"}"#).is_err());
    }

    #[test]
    fn test_new_order_ignores_client_printer_name() {
        let request: NewOrder = serde_json::from_value(serde_json::json!({
            "printerId": "00000000-0000-0000-0000-000000000001",
            "printerName": "Spoofed",
            "modelFileUrl": "/models/part.stl",
            "modelFileName": "part.stl",
            "totalPrice": 45
        }))
        .unwrap();
        assert_eq!(request.model_file_name, "part.stl");
    }

    #[test]
    fn test_scope_from_filter() {
        assert_eq!(OrderScope::from_filter(Some("owner")), OrderScope::Owner);
        assert_eq!(OrderScope::from_filter(Some("customer")), OrderScope::Customer);
        assert_eq!(OrderScope::from_filter(None), OrderScope::All);
        assert_eq!(OrderScope::from_filter(Some("everyone")), OrderScope::All);
        assert_eq!(OrderScope::from_filter(Some("")), OrderScope::All);
    }
}
