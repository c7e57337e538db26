use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::OrderError;
use crate::domain::order::{NewOrderDetail, OrderDetail};
use crate::domain::ports::OrderDetailRepository;
use crate::schema::order_details;

use super::models::{NewOrderDetailRow, OrderDetailRow};

pub struct DieselOrderDetailRepository {
    pool: DbPool,
}

impl DieselOrderDetailRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_detail(row: OrderDetailRow) -> OrderDetail {
    OrderDetail {
        detail_id: row.detail_id,
        order_id: row.order_id,
        customer_name: row.customer_name,
        order_description: row.order_description,
        customer_contact: row.customer_contact,
    }
}

impl OrderDetailRepository for DieselOrderDetailRepository {
    fn find_by_id(&self, detail_id: i32) -> Result<Option<OrderDetail>, OrderError> {
        let mut conn = self.pool.acquire()?;
        let row = order_details::table
            .filter(order_details::detail_id.eq(detail_id))
            .select(OrderDetailRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(|e| OrderError::database(format!("fetching order detail {detail_id}"), e))?;
        Ok(row.map(map_detail))
    }

    fn find_all(&self) -> Result<Vec<OrderDetail>, OrderError> {
        let mut conn = self.pool.acquire()?;
        let rows = order_details::table
            .select(OrderDetailRow::as_select())
            .order(order_details::detail_id.asc())
            .load(&mut *conn)
            .map_err(|e| OrderError::database("listing order details", e))?;
        Ok(rows.into_iter().map(map_detail).collect())
    }

    fn find_by_order_id(&self, order_id: i32) -> Result<Option<OrderDetail>, OrderError> {
        let mut conn = self.pool.acquire()?;
        let row = order_details::table
            .filter(order_details::order_id.eq(order_id))
            .select(OrderDetailRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(|e| {
                OrderError::database(format!("fetching detail for order {order_id}"), e)
            })?;
        Ok(row.map(map_detail))
    }

    fn create(&self, order_id: i32, detail: &NewOrderDetail) -> Result<i32, OrderError> {
        let mut conn = self.pool.acquire()?;
        diesel::insert_into(order_details::table)
            .values(&NewOrderDetailRow {
                order_id,
                customer_name: detail.customer_name.clone(),
                order_description: detail.order_description.clone(),
                customer_contact: detail.customer_contact.clone(),
            })
            .returning(order_details::detail_id)
            .get_result(&mut *conn)
            .map_err(|e| OrderError::database(format!("creating detail for order {order_id}"), e))
    }

    fn update(&self, detail: &OrderDetail) -> Result<(), OrderError> {
        let mut conn = self.pool.acquire()?;
        let affected = diesel::update(
            order_details::table.filter(order_details::detail_id.eq(detail.detail_id)),
        )
        .set((
            order_details::order_id.eq(detail.order_id),
            order_details::customer_name.eq(&detail.customer_name),
            order_details::order_description.eq(&detail.order_description),
            order_details::customer_contact.eq(&detail.customer_contact),
        ))
        .execute(&mut *conn)
        .map_err(|e| {
            OrderError::database(format!("updating order detail {}", detail.detail_id), e)
        })?;
        if affected == 0 {
            return Err(OrderError::database(
                format!("updating order detail {}", detail.detail_id),
                "no rows affected",
            ));
        }
        Ok(())
    }

    fn delete(&self, detail_id: i32) -> Result<(), OrderError> {
        let mut conn = self.pool.acquire()?;
        let affected =
            diesel::delete(order_details::table.filter(order_details::detail_id.eq(detail_id)))
                .execute(&mut *conn)
                .map_err(|e| {
                    OrderError::database(format!("deleting order detail {detail_id}"), e)
                })?;
        if affected == 0 {
            return Err(OrderError::database(
                format!("deleting order detail {detail_id}"),
                "no rows affected",
            ));
        }
        Ok(())
    }

    fn delete_by_order_id(&self, order_id: i32) -> Result<(), OrderError> {
        let mut conn = self.pool.acquire()?;
        let affected =
            diesel::delete(order_details::table.filter(order_details::order_id.eq(order_id)))
                .execute(&mut *conn)
                .map_err(|e| {
                    OrderError::database(format!("deleting details for order {order_id}"), e)
                })?;
        if affected == 0 {
            return Err(OrderError::database(
                format!("deleting details for order {order_id}"),
                "no rows affected",
            ));
        }
        Ok(())
    }
}
