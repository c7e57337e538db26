//! Repository contracts the aggregate service is composed from. Each
//! implementation draws one pooled connection per call and releases it
//! before returning; no call holds a connection across operations.

use super::errors::OrderError;
use super::order::{
    NewOrderDetail, NewProduct, Order, OrderDetail, OrderStatus, Product,
};

pub trait OrderRepository: Send + Sync + 'static {
    fn find_by_id(&self, order_id: i32) -> Result<Option<Order>, OrderError>;
    fn find_all(&self) -> Result<Vec<Order>, OrderError>;
    /// Insert a new order row and return its store-assigned id.
    fn create(&self, status: OrderStatus) -> Result<i32, OrderError>;
    /// Fails with `OrderNotFound` when no row matches `order.order_id`.
    fn update(&self, order: &Order) -> Result<(), OrderError>;
    /// Fails with `OrderNotFound` when no row matches; child rows are
    /// removed by the schema's cascading foreign keys.
    fn delete(&self, order_id: i32) -> Result<(), OrderError>;
}

pub trait OrderDetailRepository: Send + Sync + 'static {
    fn find_by_id(&self, detail_id: i32) -> Result<Option<OrderDetail>, OrderError>;
    fn find_all(&self) -> Result<Vec<OrderDetail>, OrderError>;
    fn find_by_order_id(&self, order_id: i32) -> Result<Option<OrderDetail>, OrderError>;
    fn create(&self, order_id: i32, detail: &NewOrderDetail) -> Result<i32, OrderError>;
    fn update(&self, detail: &OrderDetail) -> Result<(), OrderError>;
    fn delete(&self, detail_id: i32) -> Result<(), OrderError>;
    fn delete_by_order_id(&self, order_id: i32) -> Result<(), OrderError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    fn find_by_id(&self, product_id: i32) -> Result<Option<Product>, OrderError>;
    fn find_all(&self) -> Result<Vec<Product>, OrderError>;
    fn find_by_order_id(&self, order_id: i32) -> Result<Vec<Product>, OrderError>;
    fn create(&self, order_id: i32, product: &NewProduct) -> Result<i32, OrderError>;
    fn update(&self, product: &Product) -> Result<(), OrderError>;
    fn delete(&self, product_id: i32) -> Result<(), OrderError>;
    fn delete_by_order_id(&self, order_id: i32) -> Result<(), OrderError>;
}
