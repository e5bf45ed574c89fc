use serde::Deserialize;

use super::loose;
use crate::{
    models::{Menu, MenuType, PriceRange, Restaurant, RestaurantDetail, Review, ReviewAuthor},
    response::Meta,
};

/// Menu entry as sent by the cart and restaurant endpoints. Depending on the
/// endpoint the fields live on the object itself or under a nested `menu`, and
/// id/name appear under several keys; `into_menu` settles on one shape.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMenu {
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub menu_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub menu_name: Option<String>,
    #[serde(default)]
    pub food_name: Option<String>,
    #[serde(default, deserialize_with = "loose::opt_f64")]
    pub price: Option<f64>,
    #[serde(default, rename = "type")]
    pub menu_type: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub menu: Option<Box<RawMenu>>,
}

impl RawMenu {
    fn or(self, fallback: RawMenu) -> RawMenu {
        RawMenu {
            id: self.id.or(fallback.id),
            menu_id: self.menu_id.or(fallback.menu_id),
            name: self.name.or(fallback.name),
            menu_name: self.menu_name.or(fallback.menu_name),
            food_name: self.food_name.or(fallback.food_name),
            price: self.price.or(fallback.price),
            menu_type: self.menu_type.or(fallback.menu_type),
            image: self.image.or(fallback.image),
            menu: None,
        }
    }

    pub fn into_menu(mut self) -> Menu {
        let src = match self.menu.take() {
            Some(inner) => (*inner).or(self),
            None => self,
        };
        Menu {
            id: src.menu_id.or(src.id).unwrap_or(0),
            name: src
                .menu_name
                .or(src.name)
                .or(src.food_name)
                .unwrap_or_else(|| "Menu".to_string()),
            price: src.price.map_or(0, |p| p.round() as i64),
            menu_type: MenuType::from(src.menu_type.unwrap_or_default()),
            image: src.image.filter(|i| !i.is_empty()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPriceRange {
    #[serde(default, deserialize_with = "loose::opt_f64")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "loose::opt_f64")]
    pub max: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawReviewAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReview {
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub id: Option<i64>,
    #[serde(default)]
    pub user: Option<RawReviewAuthor>,
    #[serde(default, deserialize_with = "loose::opt_f64")]
    pub star: Option<f64>,
    #[serde(default, deserialize_with = "loose::opt_f64")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<RawReview> for Review {
    fn from(raw: RawReview) -> Self {
        let user = raw.user.unwrap_or_default();
        Self {
            id: raw.id.unwrap_or(0),
            user: ReviewAuthor {
                name: user.name.unwrap_or_default(),
                avatar: user.avatar.filter(|a| !a.is_empty()),
            },
            star: raw.star.or(raw.rating).unwrap_or(0.0),
            comment: raw.comment.unwrap_or_default(),
            created_at: raw.created_at.as_deref().and_then(loose::timestamp),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRestaurant {
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose::opt_f64")]
    pub star: Option<f64>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub review_count: Option<i64>,
    #[serde(default, deserialize_with = "loose::opt_i64")]
    pub menu_count: Option<i64>,
    #[serde(default)]
    pub price_range: Option<RawPriceRange>,
    #[serde(default, deserialize_with = "loose::opt_f64")]
    pub distance: Option<f64>,
    #[serde(default)]
    pub menus: Option<Vec<RawMenu>>,
    #[serde(default)]
    pub reviews: Option<Vec<RawReview>>,
}

impl RawRestaurant {
    fn split(self) -> (Restaurant, Vec<RawMenu>, Vec<RawReview>) {
        let price_range = self.price_range.unwrap_or_default();
        let restaurant = Restaurant {
            id: self.id.unwrap_or(0),
            name: self.name.unwrap_or_default(),
            star: self.star.unwrap_or(0.0),
            place: self.place.filter(|p| !p.is_empty()),
            logo: self.logo.filter(|l| !l.is_empty()),
            images: self.images.unwrap_or_default(),
            category: self.category,
            review_count: loose::non_negative_u32(self.review_count),
            menu_count: loose::non_negative_u32(self.menu_count),
            price_range: PriceRange {
                min: price_range.min,
                max: price_range.max,
            },
            distance: self.distance,
        };
        (
            restaurant,
            self.menus.unwrap_or_default(),
            self.reviews.unwrap_or_default(),
        )
    }
}

impl From<RawRestaurant> for Restaurant {
    fn from(raw: RawRestaurant) -> Self {
        raw.split().0
    }
}

impl From<RawRestaurant> for RestaurantDetail {
    fn from(raw: RawRestaurant) -> Self {
        let (restaurant, menus, reviews) = raw.split();
        Self {
            restaurant,
            menus: menus.into_iter().map(RawMenu::into_menu).collect(),
            reviews: reviews.into_iter().map(Review::from).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendedPayload {
    #[serde(default)]
    pub recommendations: Vec<RawRestaurant>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RestaurantListPayload {
    #[serde(default)]
    pub restaurants: Vec<RawRestaurant>,
    #[serde(default)]
    pub pagination: Option<Meta>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestaurantPage {
    pub restaurants: Vec<Restaurant>,
    pub pagination: Meta,
}

impl From<RestaurantListPayload> for RestaurantPage {
    fn from(payload: RestaurantListPayload) -> Self {
        Self {
            restaurants: payload
                .restaurants
                .into_iter()
                .map(Restaurant::from)
                .collect(),
            pagination: payload.pagination.unwrap_or_default(),
        }
    }
}
