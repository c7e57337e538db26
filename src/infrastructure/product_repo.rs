use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::OrderError;
use crate::domain::order::{NewProduct, Product};
use crate::domain::ports::ProductRepository;
use crate::schema::products;

use super::models::{NewProductRow, ProductRow};

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_product(row: ProductRow) -> Product {
    Product {
        product_id: row.product_id,
        order_id: row.order_id,
        name: row.name,
        description: row.description,
        price: row.price,
        quantity: row.quantity,
    }
}

impl ProductRepository for DieselProductRepository {
    fn find_by_id(&self, product_id: i32) -> Result<Option<Product>, OrderError> {
        let mut conn = self.pool.acquire()?;
        let row = products::table
            .filter(products::product_id.eq(product_id))
            .select(ProductRow::as_select())
            .first(&mut *conn)
            .optional()
            .map_err(|e| OrderError::database(format!("fetching product {product_id}"), e))?;
        Ok(row.map(map_product))
    }

    fn find_all(&self) -> Result<Vec<Product>, OrderError> {
        let mut conn = self.pool.acquire()?;
        let rows = products::table
            .select(ProductRow::as_select())
            .order(products::product_id.asc())
            .load(&mut *conn)
            .map_err(|e| OrderError::database("listing products", e))?;
        Ok(rows.into_iter().map(map_product).collect())
    }

    fn find_by_order_id(&self, order_id: i32) -> Result<Vec<Product>, OrderError> {
        let mut conn = self.pool.acquire()?;
        let rows = products::table
            .filter(products::order_id.eq(order_id))
            .select(ProductRow::as_select())
            .order(products::product_id.asc())
            .load(&mut *conn)
            .map_err(|e| {
                OrderError::database(format!("fetching products for order {order_id}"), e)
            })?;
        Ok(rows.into_iter().map(map_product).collect())
    }

    fn create(&self, order_id: i32, product: &NewProduct) -> Result<i32, OrderError> {
        let mut conn = self.pool.acquire()?;
        diesel::insert_into(products::table)
            .values(&NewProductRow {
                order_id,
                name: product.name.clone(),
                description: product.description.clone(),
                price: product.price.clone(),
                quantity: product.quantity,
            })
            .returning(products::product_id)
            .get_result(&mut *conn)
            .map_err(|e| OrderError::database(format!("creating product for order {order_id}"), e))
    }

    fn update(&self, product: &Product) -> Result<(), OrderError> {
        let mut conn = self.pool.acquire()?;
        let affected =
            diesel::update(products::table.filter(products::product_id.eq(product.product_id)))
                .set((
                    products::order_id.eq(product.order_id),
                    products::name.eq(&product.name),
                    products::description.eq(&product.description),
                    products::price.eq(&product.price),
                    products::quantity.eq(product.quantity),
                ))
                .execute(&mut *conn)
                .map_err(|e| {
                    OrderError::database(format!("updating product {}", product.product_id), e)
                })?;
        if affected == 0 {
            return Err(OrderError::database(
                format!("updating product {}", product.product_id),
                "no rows affected",
            ));
        }
        Ok(())
    }

    fn delete(&self, product_id: i32) -> Result<(), OrderError> {
        let mut conn = self.pool.acquire()?;
        let affected = diesel::delete(products::table.filter(products::product_id.eq(product_id)))
            .execute(&mut *conn)
            .map_err(|e| OrderError::database(format!("deleting product {product_id}"), e))?;
        if affected == 0 {
            return Err(OrderError::database(
                format!("deleting product {product_id}"),
                "no rows affected",
            ));
        }
        Ok(())
    }

    fn delete_by_order_id(&self, order_id: i32) -> Result<(), OrderError> {
        let mut conn = self.pool.acquire()?;
        let affected = diesel::delete(products::table.filter(products::order_id.eq(order_id)))
            .execute(&mut *conn)
            .map_err(|e| {
                OrderError::database(format!("deleting products for order {order_id}"), e)
            })?;
        if affected == 0 {
            return Err(OrderError::database(
                format!("deleting products for order {order_id}"),
                "no rows affected",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::domain::order::OrderStatus;
    use crate::domain::ports::OrderRepository;
    use crate::infrastructure::order_repo::DieselOrderRepository;
    use crate::infrastructure::test_support::setup_db;

    fn sample_product(name: &str, price: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: format!("{name} description"),
            price: BigDecimal::from_str(price).expect("valid decimal"),
            quantity: 3,
        }
    }

    #[tokio::test]
    async fn create_and_find_by_order_id_roundtrip() {
        let (_container, pool) = setup_db().await;
        let orders = DieselOrderRepository::new(pool.clone());
        let repo = DieselProductRepository::new(pool);

        let order_id = orders.create(OrderStatus::Processing).expect("create failed");
        let first = repo
            .create(order_id, &sample_product("widget", "9.99"))
            .expect("create failed");
        let second = repo
            .create(order_id, &sample_product("gadget", "120.50"))
            .expect("create failed");

        let found = repo.find_by_order_id(order_id).expect("find failed");
        assert_eq!(
            found.iter().map(|p| p.product_id).collect::<Vec<_>>(),
            vec![first, second]
        );
        assert_eq!(found[0].price, BigDecimal::from_str("9.99").unwrap());
        assert!(found.iter().all(|p| p.order_id == order_id));
    }

    #[tokio::test]
    async fn find_by_order_id_is_empty_for_order_without_products() {
        let (_container, pool) = setup_db().await;
        let orders = DieselOrderRepository::new(pool.clone());
        let repo = DieselProductRepository::new(pool);

        let order_id = orders.create(OrderStatus::Processing).expect("create failed");

        assert!(repo
            .find_by_order_id(order_id)
            .expect("find should not error")
            .is_empty());
    }

    #[tokio::test]
    async fn update_persists_price_and_quantity() {
        let (_container, pool) = setup_db().await;
        let orders = DieselOrderRepository::new(pool.clone());
        let repo = DieselProductRepository::new(pool);

        let order_id = orders.create(OrderStatus::Processing).expect("create failed");
        let product_id = repo
            .create(order_id, &sample_product("widget", "9.99"))
            .expect("create failed");
        let mut product = repo
            .find_by_id(product_id)
            .expect("find failed")
            .expect("product should exist");
        product.price = BigDecimal::from_str("8.49").expect("valid decimal");
        product.quantity = 7;

        repo.update(&product).expect("update failed");

        let reread = repo
            .find_by_id(product_id)
            .expect("find failed")
            .expect("product should exist");
        assert_eq!(reread.price, BigDecimal::from_str("8.49").unwrap());
        assert_eq!(reread.quantity, 7);
    }

    #[tokio::test]
    async fn update_of_missing_product_is_an_error() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        let result = repo.update(&Product {
            product_id: 4242,
            order_id: 1,
            name: "ghost".to_string(),
            description: String::new(),
            price: BigDecimal::from_str("1.00").unwrap(),
            quantity: 1,
        });

        assert!(matches!(result, Err(OrderError::Database { .. })));
    }

    #[tokio::test]
    async fn deleting_the_order_cascades_to_its_products() {
        let (_container, pool) = setup_db().await;
        let orders = DieselOrderRepository::new(pool.clone());
        let repo = DieselProductRepository::new(pool);

        let order_id = orders.create(OrderStatus::Processing).expect("create failed");
        repo.create(order_id, &sample_product("widget", "9.99"))
            .expect("create failed");
        repo.create(order_id, &sample_product("gadget", "120.50"))
            .expect("create failed");

        orders.delete(order_id).expect("delete failed");

        assert!(repo
            .find_by_order_id(order_id)
            .expect("find should not error")
            .is_empty());
    }

    #[tokio::test]
    async fn delete_removes_a_single_product() {
        let (_container, pool) = setup_db().await;
        let orders = DieselOrderRepository::new(pool.clone());
        let repo = DieselProductRepository::new(pool);

        let order_id = orders.create(OrderStatus::Processing).expect("create failed");
        let product_id = repo
            .create(order_id, &sample_product("widget", "9.99"))
            .expect("create failed");

        repo.delete(product_id).expect("delete failed");

        assert!(repo
            .find_by_id(product_id)
            .expect("find should not error")
            .is_none());
    }
}
