use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::OrderError;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::ports::OrderRepository;
use crate::schema::orders;

use super::models::{NewOrderRow, OrderRow};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_order(row: OrderRow) -> Result<Order, OrderError> {
    let status = row
        .status
        .parse::<OrderStatus>()
        .map_err(|e| OrderError::database(format!("decoding order {}", row.order_id), e))?;
    Ok(Order {
        order_id: row.order_id,
        order_date: row.order_date,
        status,
    })
}

impl OrderRepository for DieselOrderRepository {
    fn find_by_id(&self, order_id: i32) -> Result<Option<Order>, OrderError> {
        let mut conn = self.pool.acquire()?;
        let row = orders::table
            .filter(orders::order_id.eq(order_id))
            .select(OrderRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(|e| OrderError::database(format!("fetching order {order_id}"), e))?;
        row.map(map_order).transpose()
    }

    fn find_all(&self) -> Result<Vec<Order>, OrderError> {
        let mut conn = self.pool.acquire()?;
        let rows = orders::table
            .select(OrderRow::as_select())
            .order(orders::order_id.asc())
            .load(&mut *conn)
            .map_err(|e| OrderError::database("listing orders", e))?;
        rows.into_iter().map(map_order).collect()
    }

    fn create(&self, status: OrderStatus) -> Result<i32, OrderError> {
        let mut conn = self.pool.acquire()?;
        diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                status: status.as_str().to_string(),
            })
            .returning(orders::order_id)
            .get_result(&mut *conn)
            .map_err(|e| OrderError::database("creating order", e))
    }

    fn update(&self, order: &Order) -> Result<(), OrderError> {
        let mut conn = self.pool.acquire()?;
        let affected = diesel::update(orders::table.filter(orders::order_id.eq(order.order_id)))
            .set((
                orders::order_date.eq(order.order_date),
                orders::status.eq(order.status.as_str()),
            ))
            .execute(&mut *conn)
            .map_err(|e| OrderError::database(format!("updating order {}", order.order_id), e))?;
        if affected == 0 {
            return Err(OrderError::OrderNotFound(order.order_id));
        }
        Ok(())
    }

    fn delete(&self, order_id: i32) -> Result<(), OrderError> {
        let mut conn = self.pool.acquire()?;
        let affected = diesel::delete(orders::table.filter(orders::order_id.eq(order_id)))
            .execute(&mut *conn)
            .map_err(|e| OrderError::database(format!("deleting order {order_id}"), e))?;
        if affected == 0 {
            return Err(OrderError::OrderNotFound(order_id));
        }
        Ok(())
    }
}
