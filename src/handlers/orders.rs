use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::order::{
    NewOrderAggregate, NewOrderDetail, NewProduct, OrderAggregate, OrderDetail, OrderStatus,
    OrderUpdate, Product,
};
use crate::errors::AppError;
use crate::AppService;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderDetailRequest {
    pub customer_name: String,
    pub order_description: String,
    pub customer_contact: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub price: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    /// One of "processing", "completed", "cancelled"
    pub status: String,
    pub detail: OrderDetailRequest,
    #[serde(default)]
    pub products: Vec<ProductRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateOrderResponse {
    pub order_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderDetailRequest {
    pub detail_id: i32,
    pub customer_name: String,
    pub order_description: String,
    pub customer_contact: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub product_id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: i32,
}

/// Omitted fields keep their stored values; a missing or empty product list
/// leaves the stored products untouched.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderRequest {
    pub status: String,
    pub order_date: Option<DateTime<Utc>>,
    pub detail: Option<UpdateOrderDetailRequest>,
    pub products: Option<Vec<UpdateProductRequest>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailResponse {
    pub detail_id: i32,
    pub order_id: i32,
    pub customer_name: String,
    pub order_description: String,
    pub customer_contact: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub product_id: i32,
    pub order_id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub order_id: i32,
    pub order_date: String,
    pub status: String,
    pub detail: OrderDetailResponse,
    pub products: Vec<ProductResponse>,
}

// ── Mapping between DTOs and domain types ────────────────────────────────────

fn parse_status(status: &str) -> Result<OrderStatus, AppError> {
    status
        .parse()
        .map_err(|e: crate::domain::order::ParseOrderStatusError| {
            AppError::BadRequest(e.to_string())
        })
}

fn parse_price(price: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(price)
        .map_err(|e| AppError::BadRequest(format!("Invalid price '{price}': {e}")))
}

impl CreateOrderRequest {
    fn into_domain(self) -> Result<NewOrderAggregate, AppError> {
        let status = parse_status(&self.status)?;
        let products = self
            .products
            .into_iter()
            .map(|p| {
                Ok(NewProduct {
                    price: parse_price(&p.price)?,
                    name: p.name,
                    description: p.description,
                    quantity: p.quantity,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;
        Ok(NewOrderAggregate {
            status,
            detail: NewOrderDetail {
                customer_name: self.detail.customer_name,
                order_description: self.detail.order_description,
                customer_contact: self.detail.customer_contact,
            },
            products,
        })
    }
}

impl UpdateOrderRequest {
    fn into_domain(self, order_id: i32) -> Result<OrderUpdate, AppError> {
        let status = parse_status(&self.status)?;
        let detail = self.detail.map(|d| OrderDetail {
            detail_id: d.detail_id,
            order_id,
            customer_name: d.customer_name,
            order_description: d.order_description,
            customer_contact: d.customer_contact,
        });
        let products = self
            .products
            .map(|products| {
                products
                    .into_iter()
                    .map(|p| {
                        Ok(Product {
                            price: parse_price(&p.price)?,
                            product_id: p.product_id,
                            order_id,
                            name: p.name,
                            description: p.description,
                            quantity: p.quantity,
                        })
                    })
                    .collect::<Result<Vec<_>, AppError>>()
            })
            .transpose()?;
        Ok(OrderUpdate {
            order_id,
            status,
            order_date: self.order_date,
            detail,
            products,
        })
    }
}

impl From<OrderDetail> for OrderDetailResponse {
    fn from(detail: OrderDetail) -> Self {
        Self {
            detail_id: detail.detail_id,
            order_id: detail.order_id,
            customer_name: detail.customer_name,
            order_description: detail.order_description,
            customer_contact: detail.customer_contact,
        }
    }
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            product_id: product.product_id,
            order_id: product.order_id,
            name: product.name,
            description: product.description,
            price: product.price.to_string(),
            quantity: product.quantity,
        }
    }
}

impl From<OrderAggregate> for OrderResponse {
    fn from(aggregate: OrderAggregate) -> Self {
        Self {
            order_id: aggregate.order_id,
            order_date: aggregate.order_date.to_rfc3339(),
            status: aggregate.status.to_string(),
            detail: aggregate.detail.into(),
            products: aggregate.products.into_iter().map(Into::into).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders
///
/// Returns every order as a full aggregate (order, detail, products).
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "All order aggregates", body = [OrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(service: web::Data<AppService>) -> Result<HttpResponse, AppError> {
    let aggregates = web::block(move || service.get_all_orders())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<OrderResponse> = aggregates.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    service: web::Data<AppService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let aggregate = web::block(move || service.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(aggregate)))
}

/// POST /orders
///
/// Creates a new order together with its detail and products. The three
/// inserts run sequentially; the response carries the store-assigned id.
#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = CreateOrderResponse),
        (status = 400, description = "Malformed status or price"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn create_order(
    service: web::Data<AppService>,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner().into_domain()?;
    let order_id = web::block(move || service.create_order(input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(CreateOrderResponse { order_id }))
}

/// PUT /orders/{id}
///
/// Updates an existing order aggregate. The id in the path wins over any id
/// in the body; omitted fields keep their stored values.
#[utoipa::path(
    put,
    path = "/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated"),
        (status = 400, description = "Malformed status or price"),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn update_order(
    service: web::Data<AppService>,
    path: web::Path<i32>,
    body: web::Json<UpdateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let update = body.into_inner().into_domain(order_id)?;
    web::block(move || service.update_order(update))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().finish())
}

/// DELETE /orders/{id}
#[utoipa::path(
    delete,
    path = "/orders/{id}",
    params(
        ("id" = i32, Path, description = "Order id"),
    ),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 500, description = "Deletion failed"),
    ),
    tag = "orders"
)]
pub async fn delete_order(
    service: web::Data<AppService>,
    path: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    web::block(move || service.delete_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
