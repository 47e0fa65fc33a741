//! Retail catalog state and its reducer
//!
//! Kept apart from the job board: own state, own fields, own mutations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::store::Reducer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Product {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            attributes: Map::new(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        ["name", "nombre", "title"]
            .iter()
            .find_map(|key| self.attributes.get(*key).and_then(Value::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: i64,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,

    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogState {
    pub token: Option<String>,
    pub products: Vec<Product>,
    pub supermarket: Vec<Product>,
    pub coupons: Vec<Coupon>,
    pub favorites: Vec<Favorite>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogField {
    Token,
    Products,
    Supermarket,
    Coupons,
    Favorites,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogMutation {
    Hydrated(String),
    LoggedOut,
    ProductsLoaded(Vec<Product>),
    SupermarketLoaded(Vec<Product>),
    CouponsLoaded(Vec<Coupon>),
    FavoritesLoaded(Vec<Favorite>),
}

impl Reducer for CatalogState {
    type Mutation = CatalogMutation;
    type Field = CatalogField;

    fn reduce(self, mutation: CatalogMutation) -> Self {
        match mutation {
            CatalogMutation::Hydrated(token) => CatalogState {
                token: Some(token),
                ..self
            },
            CatalogMutation::LoggedOut => CatalogState {
                token: None,
                favorites: Vec::new(),
                ..self
            },
            CatalogMutation::ProductsLoaded(products) => CatalogState { products, ..self },
            CatalogMutation::SupermarketLoaded(supermarket) => CatalogState {
                supermarket,
                ..self
            },
            CatalogMutation::CouponsLoaded(coupons) => CatalogState { coupons, ..self },
            CatalogMutation::FavoritesLoaded(favorites) => CatalogState { favorites, ..self },
        }
    }

    fn touched(mutation: &CatalogMutation) -> Vec<CatalogField> {
        match mutation {
            CatalogMutation::Hydrated(_) => vec![CatalogField::Token],
            CatalogMutation::LoggedOut => vec![CatalogField::Token, CatalogField::Favorites],
            CatalogMutation::ProductsLoaded(_) => vec![CatalogField::Products],
            CatalogMutation::SupermarketLoaded(_) => vec![CatalogField::Supermarket],
            CatalogMutation::CouponsLoaded(_) => vec![CatalogField::Coupons],
            CatalogMutation::FavoritesLoaded(_) => vec![CatalogField::Favorites],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_loads_replace_one_field() {
        let state = CatalogState {
            token: Some("t".to_string()),
            coupons: vec![Coupon {
                id: 1,
                attributes: Map::new(),
            }],
            ..CatalogState::default()
        };

        let state = state.reduce(CatalogMutation::ProductsLoaded(vec![Product::new(5)]));

        assert_eq!(state.products, vec![Product::new(5)]);
        assert_eq!(state.coupons.len(), 1);
        assert_eq!(state.token.as_deref(), Some("t"));
    }

    #[test]
    fn test_logout_drops_personal_data_only() {
        let state = CatalogState {
            token: Some("t".to_string()),
            products: vec![Product::new(1)],
            favorites: vec![Favorite {
                id: 1,
                attributes: Map::new(),
            }],
            ..CatalogState::default()
        };

        let state = state.reduce(CatalogMutation::LoggedOut);

        assert!(state.token.is_none());
        assert!(state.favorites.is_empty());
        assert_eq!(state.products.len(), 1);
    }

    #[test]
    fn test_product_name() {
        let product: Product =
            serde_json::from_value(json!({"id": 2, "nombre": "Leche", "precio": 1.2})).unwrap();
        assert_eq!(product.name(), Some("Leche"));
        assert_eq!(product.attributes["precio"], json!(1.2));
    }

    #[test]
    fn test_touched_fields() {
        assert_eq!(
            CatalogState::touched(&CatalogMutation::SupermarketLoaded(vec![])),
            vec![CatalogField::Supermarket]
        );
    }
}
