//! HTTP client for the product and profile data API.
//!
//! Every user-scoped call carries the Telegram user id in the `tg-id` header.
//! Any status of 400 or above becomes [`ApiError::Status`] with the response
//! body attached.

mod types;

pub use types::{
    Ingredient, IngredientRef, NewProduct, Product, ProductDetail, SearchQuery, UserProduct,
    format_id_list,
};

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::UserId;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::profile::{ProfileUpdate, StoredProfile};

/// Header carrying the Telegram user id.
pub const USER_HEADER: &str = "tg-id";

/// Client for the data API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("skincare-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn search_products(&self, query: &SearchQuery) -> Result<Vec<Product>, ApiError> {
        let req = self
            .request(Method::GET, "/products/search", None)
            .query(&query.to_params());
        self.fetch_json("/products/search", req).await
    }

    pub async fn get_product(&self, id: i64) -> Result<ProductDetail, ApiError> {
        let req = self
            .request(Method::GET, "/api/products", None)
            .query(&[("id", id)]);
        self.fetch_json("/api/products", req).await
    }

    pub async fn get_ingredient(&self, id: i64) -> Result<Ingredient, ApiError> {
        let req = self
            .request(Method::GET, "/api/ingredients", None)
            .query(&[("id", id)]);
        self.fetch_json("/api/ingredients", req).await
    }

    pub async fn user_products(&self, user: UserId) -> Result<Vec<UserProduct>, ApiError> {
        let req = self.request(Method::GET, "/user/products", Some(user));
        // The API answers `null` for an empty collection.
        let products: Option<Vec<UserProduct>> = self.fetch_json("/user/products", req).await?;
        Ok(products.unwrap_or_default())
    }

    pub async fn add_user_product(&self, user: UserId, product_id: i64) -> Result<(), ApiError> {
        let req = self
            .request(Method::POST, "/api/user/products", Some(user))
            .query(&[("id", product_id)]);
        self.execute("/api/user/products", req).await
    }

    pub async fn remove_user_product(&self, user: UserId, product_id: i64) -> Result<(), ApiError> {
        let req = self
            .request(Method::DELETE, "/api/user/products", Some(user))
            .query(&[("id", product_id)]);
        self.execute("/api/user/products", req).await
    }

    pub async fn get_profile(&self, user: UserId) -> Result<StoredProfile, ApiError> {
        let req = self.request(Method::GET, "/user/profile", Some(user));
        self.fetch_json("/user/profile", req).await
    }

    pub async fn update_profile(
        &self,
        user: UserId,
        profile: &ProfileUpdate,
    ) -> Result<(), ApiError> {
        tracing::debug!(user, ?profile, "Updating remote profile");
        let req = self
            .request(Method::PUT, "/user/profile", Some(user))
            .json(profile);
        self.execute("/user/profile", req).await
    }

    pub async fn empty_profile(&self, user: UserId) -> Result<(), ApiError> {
        let req = self.request(Method::POST, "/user/profile/empty", Some(user));
        self.execute("/user/profile/empty", req).await
    }

    pub async fn create_product(&self, user: UserId, product: &NewProduct) -> Result<(), ApiError> {
        let req = self
            .request(Method::POST, "/api/products", Some(user))
            .json(product);
        self.execute("/api/products", req).await
    }

    fn request(&self, method: Method, path: &str, user: Option<UserId>) -> RequestBuilder {
        let req = self.client.request(method, format!("{}{}", self.base_url, path));
        match user {
            Some(user) => req.header(USER_HEADER, user.to_string()),
            None => req,
        }
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        req: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(path, req).await?;
        serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }

    /// Mutations answer with small status objects; only the status matters.
    async fn execute(&self, path: &str, req: RequestBuilder) -> Result<(), ApiError> {
        self.send(path, req).await.map(|_| ())
    }

    async fn send(&self, path: &str, req: RequestBuilder) -> Result<String, ApiError> {
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    path: path.to_string(),
                }
            } else {
                ApiError::RequestFailed {
                    path: path.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse {
                path: path.to_string(),
                reason: format!("failed to read body: {e}"),
            })?;

        tracing::debug!(path, status = status.as_u16(), "Data API response");

        if status.as_u16() >= 400 {
            return Err(ApiError::Status {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

/// Read-only product lookups used by the bot's search and detail views.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>, ApiError>;

    async fn product(&self, id: i64) -> Result<ProductDetail, ApiError>;
}

#[async_trait]
impl ProductCatalog for ApiClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Product>, ApiError> {
        self.search_products(query).await
    }

    async fn product(&self, id: i64) -> Result<ProductDetail, ApiError> {
        self.get_product(id).await
    }
}
