use crate::domain::errors::OrderError;
use crate::domain::order::{NewOrderAggregate, Order, OrderAggregate, OrderDetail, OrderUpdate, Product};
use crate::domain::ports::{OrderDetailRepository, OrderRepository, ProductRepository};

/// Assembles and disassembles the three-table order aggregate. The three
/// writes of `create_order`/`update_order` are issued sequentially on
/// independent connections; there is no cross-table transaction, so a later
/// failure does not undo earlier writes. The error reports which step
/// failed instead.
pub struct OrderService<O, D, P> {
    orders: O,
    details: D,
    products: P,
}

impl<O, D, P> OrderService<O, D, P>
where
    O: OrderRepository,
    D: OrderDetailRepository,
    P: ProductRepository,
{
    pub fn new(orders: O, details: D, products: P) -> Self {
        Self {
            orders,
            details,
            products,
        }
    }

    /// Read one aggregate. A detail row missing for an existing order is a
    /// broken aggregate and surfaces as an error, never as a partial result.
    pub fn get_order(&self, order_id: i32) -> Result<OrderAggregate, OrderError> {
        let order = self
            .orders
            .find_by_id(order_id)?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        let products = self.products.find_by_order_id(order_id)?;
        let detail = self
            .details
            .find_by_order_id(order_id)?
            .ok_or(OrderError::DetailNotFound(order_id))?;
        Ok(OrderAggregate {
            order_id: order.order_id,
            order_date: order.order_date,
            status: order.status,
            detail,
            products,
        })
    }

    /// One aggregate per order row, in listing order. Issues the per-order
    /// sub-reads of [`OrderService::get_order`] for each row.
    pub fn get_all_orders(&self) -> Result<Vec<OrderAggregate>, OrderError> {
        let orders = self.orders.find_all()?;
        orders
            .into_iter()
            .map(|order| self.get_order(order.order_id))
            .collect()
    }

    /// Insert the order row, then its detail, then each product, threading
    /// the store-assigned order id through the child inserts. Returns that
    /// id. A failure part-way leaves the rows already written in place.
    pub fn create_order(&self, input: NewOrderAggregate) -> Result<i32, OrderError> {
        let order_id = self
            .orders
            .create(input.status)
            .map_err(|e| OrderError::OrderCreation(format!("inserting order: {e}")))?;
        self.details.create(order_id, &input.detail).map_err(|e| {
            OrderError::OrderCreation(format!("inserting detail for order {order_id}: {e}"))
        })?;
        for product in &input.products {
            self.products.create(order_id, product).map_err(|e| {
                OrderError::OrderCreation(format!(
                    "inserting product '{}' for order {order_id}: {e}",
                    product.name
                ))
            })?;
        }
        Ok(order_id)
    }

    /// Update an existing aggregate. Unset fields fall back to the stored
    /// values before any write: a missing date keeps the stored date, a
    /// missing detail rewrites the stored detail, a missing or empty product
    /// list rewrites the stored products. The order, detail and product rows
    /// are then updated independently, in that order.
    pub fn update_order(&self, update: OrderUpdate) -> Result<(), OrderError> {
        let order_id = update.order_id;
        let existing = self
            .orders
            .find_by_id(order_id)
            .map_err(|e| OrderError::OrderUpdate(order_id, e.to_string()))?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        let order_date = update.order_date.unwrap_or(existing.order_date);
        let detail = match update.detail {
            Some(detail) => detail,
            None => self
                .details
                .find_by_order_id(order_id)
                .map_err(|e| OrderError::OrderUpdate(order_id, e.to_string()))?
                .ok_or(OrderError::DetailNotFound(order_id))?,
        };
        let products = match update.products {
            Some(products) if !products.is_empty() => products,
            _ => self
                .products
                .find_by_order_id(order_id)
                .map_err(|e| OrderError::OrderUpdate(order_id, e.to_string()))?,
        };

        let order = Order {
            order_id,
            order_date,
            status: update.status,
        };
        self.orders
            .update(&order)
            .map_err(|e| OrderError::OrderUpdate(order_id, e.to_string()))?;

        let detail = OrderDetail { order_id, ..detail };
        self.details
            .update(&detail)
            .map_err(|e| OrderError::OrderUpdate(order_id, e.to_string()))?;

        for product in products {
            let product = Product { order_id, ..product };
            self.products
                .update(&product)
                .map_err(|e| OrderError::OrderUpdate(order_id, e.to_string()))?;
        }
        Ok(())
    }

    /// Delete the order row only; the detail and product rows are removed by
    /// the schema's cascading foreign keys. Deleting an order that does not
    /// exist is an error, not a no-op.
    pub fn delete_order(&self, order_id: i32) -> Result<(), OrderError> {
        self.orders
            .delete(order_id)
            .map_err(|e| OrderError::OrderDeletion(order_id, e.to_string()))
    }
}
