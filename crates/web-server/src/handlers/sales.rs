use crate::handlers::today;
use crate::{error::AppError, identity::CurrentUser, AppState};
use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use core_types::{InventorySnapshot, NewSale, Sale};
use std::sync::Arc;

/// # GET /api/sales
pub async fn list_sales(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Sale>>, AppError> {
    Ok(Json(state.store.list_sales(user_id).await?))
}

/// # POST /api/sales
/// Without an explicit `total_amount` the total is the sum of the line subtotals.
pub async fn record_sale(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    WithRejection(Json(input), _): WithRejection<Json<NewSale>, AppError>,
) -> Result<(StatusCode, Json<Sale>), AppError> {
    let sale = state.store.record_sale(user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// # POST /api/snapshots
/// Records today's inventory value, replacing an earlier snapshot from the same day.
pub async fn record_snapshot(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<(StatusCode, Json<InventorySnapshot>), AppError> {
    let snapshot = state.store.record_snapshot(user_id, today()).await?;
    tracing::info!(user_id = %user_id, value = %snapshot.total_value, "Inventory snapshot recorded.");
    Ok((StatusCode::CREATED, Json(snapshot)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{category, product, state_with};
    use core_types::{NewSaleItem, PaymentMethod, SaleStatus};
    use database::MemoryStore;
    use rust_decimal_macros::dec;
    use axum::response::IntoResponse;
    use std::marker::PhantomData;
    use uuid::Uuid;

    #[tokio::test]
    async fn recorded_sales_are_listed_with_totals() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let kitchen = category(&store, user, "Kitchen").await;
        let mug = product(&store, user, kitchen.id, "Mug", 5).await;
        let state = state_with(store);

        let input = NewSale {
            invoice_id: Some("INV-1".to_string()),
            sale_date: None,
            payment_method: PaymentMethod::Cash,
            status: SaleStatus::Completed,
            total_amount: None,
            items: vec![NewSaleItem {
                product_id: mug.id,
                quantity: 3,
                price: dec!(9.99),
            }],
        };
        let (status, Json(sale)) = record_sale(
            State(state.clone()),
            CurrentUser(user),
            WithRejection(Json(input), PhantomData),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(sale.total_amount, dec!(29.97));

        let Json(sales) = list_sales(State(state), CurrentUser(user)).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].invoice_id, "INV-1");
    }

    #[tokio::test]
    async fn overflowing_sale_lines_are_validation_errors() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let kitchen = category(&store, user, "Kitchen").await;
        let mug = product(&store, user, kitchen.id, "Mug", 5).await;
        let state = state_with(store);

        let input: NewSale = serde_json::from_value(serde_json::json!({
            "items": [{ "product_id": mug.id, "quantity": 2, "price": "79228162514264337593543950335" }]
        }))
        .unwrap();
        let err = record_sale(
            State(state.clone()),
            CurrentUser(user),
            WithRejection(Json(input), PhantomData),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);

        let Json(sales) = list_sales(State(state), CurrentUser(user)).await.unwrap();
        assert!(sales.is_empty());
    }

    #[tokio::test]
    async fn snapshot_reflects_current_stock() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let kitchen = category(&store, user, "Kitchen").await;
        product(&store, user, kitchen.id, "Mug", 5).await;
        product(&store, user, kitchen.id, "Bowl", 2).await;
        let state = state_with(store);

        let (_, Json(first)) = record_snapshot(State(state.clone()), CurrentUser(user)).await.unwrap();
        let (_, Json(second)) = record_snapshot(State(state), CurrentUser(user)).await.unwrap();

        assert_eq!(first.total_value, dec!(28));
        assert_eq!(first.total_products, 2);
        assert_eq!(first.id, second.id);
        assert_eq!(first.date, today());
    }
}
