//! CarService: the car catalog. Listing, owner views and CRUD over the
//! `cars` table. Filtering and ordering are pushed down into SQL.

use crate::{
    db,
    models::car::{Car, CarInput},
    services::error::{ServiceError, ServiceResult, parse_id},
};
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite, types::Json};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub(crate) const CAR_COLUMNS: &str = "id, name, category, price, rating, status, provider_email, \
     provider_name, image, description, extra, created_at, updated_at";

/// Number of listings shown on the featured view.
pub const FEATURED_LIMIT: i64 = 6;

/// Category value that disables the category filter.
const ALL_CATEGORIES: &str = "all";

/// Case folding shared by the stored `search_name` and the search term.
/// SQLite's own `lower()` only folds ASCII.
fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Ordering for car listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CarSort {
    #[default]
    Newest,
    PriceLow,
    PriceHigh,
    Rating,
}

impl CarSort {
    /// Map the `sort` query value. Anything unrecognised means newest first.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("price-low") => Self::PriceLow,
            Some("price-high") => Self::PriceHigh,
            Some("rating") => Self::Rating,
            _ => Self::Newest,
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            Self::Newest => " ORDER BY created_at DESC, rowid DESC",
            Self::PriceLow => " ORDER BY price ASC, created_at DESC",
            Self::PriceHigh => " ORDER BY price DESC, created_at DESC",
            Self::Rating => " ORDER BY rating DESC, created_at DESC",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ListCarsParams {
    /// Case-insensitive substring of the car name.
    pub search: Option<String>,
    /// Exact category; `all` or empty disables the filter.
    pub category: Option<String>,
    pub sort: CarSort,
}

#[derive(Clone)]
pub struct CarService {
    pub db: Arc<SqlitePool>,
}

impl CarService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// All cars matching the filters. No pagination.
    pub async fn list_cars(&self, params: &ListCarsParams) -> ServiceResult<Vec<Car>> {
        self.query_cars(params, None).await
    }

    /// The newest few cars.
    pub async fn featured_cars(&self) -> ServiceResult<Vec<Car>> {
        self.query_cars(&ListCarsParams::default(), Some(FEATURED_LIMIT))
            .await
    }

    /// Cars listed by `email`, newest first.
    pub async fn cars_by_owner(&self, email: &str) -> ServiceResult<Vec<Car>> {
        let cars = sqlx::query_as::<_, Car>(&format!(
            "SELECT {CAR_COLUMNS} FROM cars WHERE provider_email = ? \
             ORDER BY created_at DESC, rowid DESC"
        ))
        .bind(email)
        .fetch_all(&*self.db)
        .await?;
        Ok(cars)
    }

    pub async fn get_car(&self, raw_id: &str) -> ServiceResult<Car> {
        let id = parse_id(raw_id)?;
        self.fetch_car(id).await
    }

    /// Insert a new listing and return it with its assigned id.
    pub async fn create_car(&self, input: CarInput) -> ServiceResult<Car> {
        let car = Car::from_input(input);

        sqlx::query(&format!(
            "INSERT INTO cars ({CAR_COLUMNS}, search_name) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(car.id)
        .bind(&car.name)
        .bind(&car.category)
        .bind(car.price)
        .bind(car.rating)
        .bind(car.status)
        .bind(&car.provider_email)
        .bind(&car.provider_name)
        .bind(&car.image)
        .bind(&car.description)
        .bind(Json(&car.extra))
        .bind(car.created_at)
        .bind(car.updated_at)
        .bind(car.name.as_deref().map(fold_case))
        .execute(&*self.db)
        .await?;

        info!(car_id = %car.id, provider = ?car.provider_email, "car listed");
        Ok(car)
    }

    /// Partially update a car. Only the columns the caller supplied are
    /// written; provider identity, creation time and id are never touched.
    ///
    /// Free-form fields are merged into the stored set under the write lock,
    /// so concurrent edits to different keys all survive.
    pub async fn update_car(&self, raw_id: &str, input: CarInput) -> ServiceResult<()> {
        let id = parse_id(raw_id)?;
        let changes = input.free_fields();
        let mut tx = db::begin_write(&self.db).await?;

        let Json(mut extra) = sqlx::query_scalar::<_, Json<Map<String, Value>>>(
            "SELECT extra FROM cars WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ServiceError::CarNotFound(id))?;
        extra.extend(changes);

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE cars SET updated_at = ");
        builder.push_bind(Utc::now());
        if let Some(name) = input.name {
            builder.push(", search_name = ");
            builder.push_bind(fold_case(&name));
            builder.push(", name = ");
            builder.push_bind(name);
        }
        if let Some(category) = input.category {
            builder.push(", category = ");
            builder.push_bind(category);
        }
        if let Some(price) = input.price {
            builder.push(", price = ");
            builder.push_bind(price);
        }
        if let Some(rating) = input.rating {
            builder.push(", rating = ");
            builder.push_bind(rating);
        }
        if let Some(status) = input.status {
            builder.push(", status = ");
            builder.push_bind(status);
        }
        if let Some(image) = input.image {
            builder.push(", image = ");
            builder.push_bind(image);
        }
        if let Some(description) = input.description {
            builder.push(", description = ");
            builder.push_bind(description);
        }
        builder.push(", extra = ");
        builder.push_bind(Json(extra));
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let result = builder.build().execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::CarNotFound(id));
        }

        tx.commit().await?;
        info!(car_id = %id, "car updated");
        Ok(())
    }

    /// Remove a car. Refused while a booking still references it.
    pub async fn delete_car(&self, raw_id: &str) -> ServiceResult<()> {
        let id = parse_id(raw_id)?;
        let mut tx = db::begin_write(&self.db).await?;

        let booked: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bookings WHERE car_id = ?)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if booked {
            warn!(car_id = %id, "refusing to delete car with an active booking");
            return Err(ServiceError::CarHasActiveBooking(id));
        }

        let result = sqlx::query("DELETE FROM cars WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::CarNotFound(id));
        }

        tx.commit().await?;
        info!(car_id = %id, "car deleted");
        Ok(())
    }

    async fn fetch_car(&self, id: Uuid) -> ServiceResult<Car> {
        sqlx::query_as::<_, Car>(&format!("SELECT {CAR_COLUMNS} FROM cars WHERE id = ?"))
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .ok_or(ServiceError::CarNotFound(id))
    }

    async fn query_cars(
        &self,
        params: &ListCarsParams,
        limit: Option<i64>,
    ) -> ServiceResult<Vec<Car>> {
        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {CAR_COLUMNS} FROM cars WHERE 1 = 1"));

        if let Some(search) = params.search.as_deref().filter(|s| !s.is_empty()) {
            builder.push(" AND instr(search_name, ");
            builder.push_bind(fold_case(search));
            builder.push(") > 0");
        }

        if let Some(category) = params
            .category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
        {
            builder.push(" AND category = ");
            builder.push_bind(category.to_string());
        }

        builder.push(params.sort.order_by());

        if let Some(limit) = limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        let cars = builder.build_query_as::<Car>().fetch_all(&*self.db).await?;
        Ok(cars)
    }
}
