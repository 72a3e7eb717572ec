//! Wire types of the data API.

use serde::{Deserialize, Serialize};

/// Search hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// Product with its ingredient list, as returned by `GET /api/products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub id: i64,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub alt_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub functions: Vec<String>,
}

/// Entry of a user's product collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProduct {
    #[serde(default)]
    pub id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub added_at: String,
}

/// Body of `POST /api/products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub brand: String,
    pub title: String,
    pub details: String,
    pub image: String,
    pub ingredients: Vec<IngredientRef>,
}

/// Filters for product search. Empty id lists are omitted from the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub query: String,
    pub limit: u32,
    pub offset: u32,
    pub brand_ids: Vec<i64>,
    pub ingredient_ids: Vec<i64>,
    pub function_ids: Vec<i64>,
    pub highlight_ids: Vec<i64>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>, limit: u32) -> Self {
        Self {
            query: query.into(),
            limit,
            ..Self::default()
        }
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_brands(mut self, ids: Vec<i64>) -> Self {
        self.brand_ids = ids;
        self
    }

    pub fn with_ingredients(mut self, ids: Vec<i64>) -> Self {
        self.ingredient_ids = ids;
        self
    }

    /// Query-string pairs in the order the API documents them.
    pub(crate) fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query", self.query.clone()),
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
        ];
        for (key, ids) in [
            ("brand_ids", &self.brand_ids),
            ("ingredient_ids", &self.ingredient_ids),
            ("function_ids", &self.function_ids),
            ("highlight_ids", &self.highlight_ids),
        ] {
            if !ids.is_empty() {
                params.push((key, format_id_list(ids)));
            }
        }
        params
    }
}

/// `[1,2,3]`, the list syntax the search endpoint expects.
pub fn format_id_list(ids: &[i64]) -> String {
    let joined = ids
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",");
    format!("[{joined}]")
}
