use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Lifecycle state of an order, persisted as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown order status: {0}")]
pub struct ParseOrderStatusError(String);

impl FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(OrderStatus::Processing),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(ParseOrderStatusError(other.to_string())),
        }
    }
}

/// One row of the `orders` table. `order_id` and `order_date` are assigned
/// by the store at insert and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub order_id: i32,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
}

/// The single detail row belonging to an order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetail {
    pub detail_id: i32,
    pub order_id: i32,
    pub customer_name: String,
    pub order_description: String,
    pub customer_contact: String,
}

/// A line item belonging to an order. Prices are exact decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub product_id: i32,
    pub order_id: i32,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub quantity: i32,
}

/// The caller-facing view of one order: the order row, its detail row and
/// all of its products, assembled from three independent reads. Never
/// persisted as such.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderAggregate {
    pub order_id: i32,
    pub order_date: DateTime<Utc>,
    pub status: OrderStatus,
    pub detail: OrderDetail,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone)]
pub struct NewOrderDetail {
    pub customer_name: String,
    pub order_description: String,
    pub customer_contact: String,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub quantity: i32,
}

/// Input to aggregate creation. Ids and the order date are assigned by the
/// store, so only the status and the child rows are supplied.
#[derive(Debug, Clone)]
pub struct NewOrderAggregate {
    pub status: OrderStatus,
    pub detail: NewOrderDetail,
    pub products: Vec<NewProduct>,
}

/// Input to aggregate update. Fields left at `None` (or an empty product
/// list) are filled in from the stored aggregate before any write happens.
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub order_id: i32,
    pub status: OrderStatus,
    pub order_date: Option<DateTime<Utc>>,
    pub detail: Option<OrderDetail>,
    pub products: Option<Vec<Product>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_text_form() {
        for status in [
            OrderStatus::Processing,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!("PROCESSING".parse::<OrderStatus>().is_err());
    }
}
