use crate::{error::AppError, identity::CurrentUser, AppState};
use analytics::ProductView;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::WithRejection;
use core_types::{NewProduct, ProductFilter};
use std::sync::Arc;
use uuid::Uuid;

/// # GET /api/products
/// Supports `search`, `category`, `status` and `low_stock` query filters.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    WithRejection(Query(filter), _): WithRejection<Query<ProductFilter>, AppError>,
) -> Result<Json<Vec<ProductView>>, AppError> {
    let products = state.store.list_products(user_id, &filter).await?;
    Ok(Json(products.into_iter().map(ProductView::from).collect()))
}

/// # GET /api/products/:id
pub async fn get_product(
    Path(product_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<ProductView>, AppError> {
    let product = state.store.get_product(user_id, product_id).await?;
    Ok(Json(product.into()))
}

/// # POST /api/products
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    WithRejection(Json(input), _): WithRejection<Json<NewProduct>, AppError>,
) -> Result<(StatusCode, Json<ProductView>), AppError> {
    let product = state.store.create_product(user_id, &input).await?;
    tracing::info!(user_id = %user_id, product_id = %product.id, "Product created.");
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// # PUT /api/products/:id
pub async fn update_product(
    Path(product_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    CurrentUser(user_id): CurrentUser,
    WithRejection(Json(input), _): WithRejection<Json<NewProduct>, AppError>,
) -> Result<Json<ProductView>, AppError> {
    let product = state.store.update_product(user_id, product_id, &input).await?;
    Ok(Json(product.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{category, new_product, product, state_with};
    use core_types::{CoreError, StockStatus};
    use database::{DbError, MemoryStore};
    use rust_decimal_macros::dec;
    use std::marker::PhantomData;

    fn query(filter: ProductFilter) -> WithRejection<Query<ProductFilter>, AppError> {
        WithRejection(Query(filter), PhantomData)
    }

    fn body(input: NewProduct) -> WithRejection<Json<NewProduct>, AppError> {
        WithRejection(Json(input), PhantomData)
    }

    #[tokio::test]
    async fn created_products_carry_derived_fields() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let kitchen = category(&store, user, "Kitchen").await;
        let state = state_with(store);

        let (status, Json(view)) = create_product(
            State(state),
            CurrentUser(user),
            body(new_product(kitchen.id, "Mug", "MUG-1", 2)),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(view.stock_status, StockStatus::LowStock);
        assert_eq!(view.profit_margin, dec!(150));
    }

    #[tokio::test]
    async fn invalid_products_are_rejected_with_field_errors() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let kitchen = category(&store, user, "Kitchen").await;
        let state = state_with(store);
        let mut input = new_product(kitchen.id, "Mug", "MUG-1", 2);
        input.minimum_stock = 500;

        let err = create_product(State(state), CurrentUser(user), body(input))
            .await
            .unwrap_err();

        match err {
            AppError::Database(DbError::Core(CoreError::Validation(errors))) => {
                assert_eq!(
                    errors.get("minimum_stock"),
                    Some(&["Minimum stock cannot be greater than maximum stock".to_string()][..])
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_users_products_are_not_found() {
        let store = Arc::new(MemoryStore::new());
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let kitchen = category(&store, alice, "Kitchen").await;
        let mug = product(&store, alice, kitchen.id, "Mug", 5).await;
        let state = state_with(store);

        let err = get_product(Path(mug.id), State(state.clone()), CurrentUser(bob))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(DbError::NotFound)));

        let err = update_product(
            Path(mug.id),
            State(state),
            CurrentUser(bob),
            body(new_product(kitchen.id, "Stolen", "X", 1)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Database(DbError::NotFound)));
    }

    #[tokio::test]
    async fn listing_applies_filters() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let kitchen = category(&store, user, "Kitchen").await;
        product(&store, user, kitchen.id, "Teapot", 1).await;
        product(&store, user, kitchen.id, "Mug", 40).await;
        let state = state_with(store);

        let Json(all) = list_products(State(state.clone()), CurrentUser(user), query(ProductFilter::default()))
            .await
            .unwrap();
        let names: Vec<&str> = all.iter().map(|v| v.product.name.as_str()).collect();
        assert_eq!(names, vec!["Mug", "Teapot"]);

        let low = ProductFilter {
            low_stock: true,
            ..ProductFilter::default()
        };
        let Json(low) = list_products(State(state.clone()), CurrentUser(user), query(low))
            .await
            .unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].product.name, "Teapot");

        let search = ProductFilter {
            search: Some("MUG".to_string()),
            ..ProductFilter::default()
        };
        let Json(found) = list_products(State(state), CurrentUser(user), query(search))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn updates_replace_fields() {
        let store = Arc::new(MemoryStore::new());
        let user = Uuid::new_v4();
        let kitchen = category(&store, user, "Kitchen").await;
        let mug = product(&store, user, kitchen.id, "Mug", 5).await;
        let state = state_with(store);
        let mut input = new_product(kitchen.id, "Large Mug", "MUG", 120);
        input.cost = None;

        let Json(view) = update_product(Path(mug.id), State(state), CurrentUser(user), body(input))
            .await
            .unwrap();

        assert_eq!(view.product.id, mug.id);
        assert_eq!(view.product.name, "Large Mug");
        assert_eq!(view.stock_status, StockStatus::Overstocked);
        assert_eq!(view.profit_margin, dec!(0));
    }
}
