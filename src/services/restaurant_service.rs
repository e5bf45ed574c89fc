use crate::{
    client::ApiClient,
    dto::restaurants::{RawRestaurant, RecommendedPayload, RestaurantListPayload, RestaurantPage},
    error::{AppError, AppResult},
    models::{Id, Restaurant, RestaurantDetail},
};

/// Distance assumed for restaurants that report none, so they only pass the
/// unbounded `Nearby` bucket.
pub const UNKNOWN_DISTANCE_KM: f64 = 999_999.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceBucket {
    #[default]
    Nearby,
    Within1Km,
    Within3Km,
    Within5Km,
}

impl DistanceBucket {
    pub fn max_km(self) -> Option<f64> {
        match self {
            DistanceBucket::Nearby => None,
            DistanceBucket::Within1Km => Some(1.0),
            DistanceBucket::Within3Km => Some(3.0),
            DistanceBucket::Within5Km => Some(5.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RestaurantFilter {
    pub distance: DistanceBucket,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    /// Zero disables the rating check.
    pub min_rating: f64,
}

impl RestaurantFilter {
    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        if self.min_rating > 0.0 && restaurant.star < self.min_rating {
            return false;
        }

        if let Some(max_km) = self.distance.max_km() {
            if restaurant.distance.unwrap_or(UNKNOWN_DISTANCE_KM) > max_km {
                return false;
            }
        }

        let wanted_min = self.price_min.unwrap_or(0.0);
        let wanted_max = self.price_max.unwrap_or(f64::INFINITY);
        let offered_min = restaurant.price_range.min.unwrap_or(0.0);
        let offered_max = restaurant.price_range.max.unwrap_or(f64::INFINITY);
        !(offered_max < wanted_min || offered_min > wanted_max)
    }

    pub fn apply<'a>(&self, restaurants: &'a [Restaurant]) -> Vec<&'a Restaurant> {
        restaurants.iter().filter(|r| self.matches(r)).collect()
    }
}

#[derive(Clone)]
pub struct RestaurantService {
    client: ApiClient,
}

impl RestaurantService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn recommended(&self) -> AppResult<Vec<Restaurant>> {
        let url = self.client.endpoint("/api/resto/recommended")?;
        let response = self.client.get::<RecommendedPayload>(url).await?;
        Ok(response
            .data
            .unwrap_or_default()
            .recommendations
            .into_iter()
            .map(Restaurant::from)
            .collect())
    }

    /// Full catalogue from the catalogue host.
    pub async fn list_all(&self) -> AppResult<RestaurantPage> {
        let url = self.client.catalog_endpoint("/api/resto")?;
        let response = self.client.get::<RestaurantListPayload>(url).await?;
        Ok(response.data.unwrap_or_default().into())
    }

    pub async fn list_filtered(&self, filter: &RestaurantFilter) -> AppResult<Vec<Restaurant>> {
        let page = self.list_all().await?;
        Ok(page
            .restaurants
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    pub async fn detail(&self, id: Id) -> AppResult<RestaurantDetail> {
        let url = self.client.endpoint(&format!("/api/resto/{id}"))?;
        let response = self.client.get::<RawRestaurant>(url).await?;
        response
            .data
            .map(RestaurantDetail::from)
            .ok_or(AppError::MissingData)
    }
}
