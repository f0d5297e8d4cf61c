//! Common type definitions and newtypes for Shelf.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Numeric identifier of a catalog entity.
///
/// Identifiers come from the catalog database and are always positive
/// integers. They order naturally, which gives the source of record a stable
/// ordering for paginated scans.
///
/// # Example
///
/// ```
/// use shelf_core::EntityId;
///
/// let id: EntityId = "42".parse().unwrap();
/// assert_eq!(id.get(), 42);
/// assert_eq!(id.to_string(), "42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric value.
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for EntityId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|e| CoreError::invalid_id(s, e.to_string()))
    }
}

/// The kinds of catalog entity that are cached.
///
/// Each kind owns its own key namespace segment (see [`EntityKind::key_segment`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A catalog product.
    Product,
    /// A purchasable variant of a product.
    ProductVariant,
}

impl EntityKind {
    /// All cached kinds, in warmup order.
    pub const ALL: [EntityKind; 2] = [EntityKind::Product, EntityKind::ProductVariant];

    /// Returns the segment used in cache keys (`product`, `variant`).
    pub fn key_segment(&self) -> &'static str {
        match self {
            EntityKind::Product => "product",
            EntityKind::ProductVariant => "variant",
        }
    }

    /// Returns a human readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::Product => "Product",
            EntityKind::ProductVariant => "ProductVariant",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_segment())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "product" | "products" => Ok(EntityKind::Product),
            "variant" | "variants" | "product_variant" | "productvariant" | "product-variant" => {
                Ok(EntityKind::ProductVariant)
            },
            _ => Err(CoreError::UnknownEntityKind(s.to_string())),
        }
    }
}

/// The API a request came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApiType {
    /// Administrative API.
    Admin,
    /// Storefront API.
    #[default]
    Shop,
}

/// Context of the request on whose behalf the source of record is queried.
///
/// The cache layer never inspects it beyond logging; it is forwarded to the
/// source of record unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    /// Sales channel token the request is scoped to.
    pub channel: String,
    /// API the request came through.
    pub api_type: ApiType,
    /// Whether the caller is authorized.
    pub is_authorized: bool,
    /// Correlation id, when the request came over HTTP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl RequestContext {
    /// Name of the default sales channel.
    pub const DEFAULT_CHANNEL: &'static str = "__default_channel__";

    /// Creates a storefront context on the given channel.
    pub fn shop(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            api_type: ApiType::Shop,
            is_authorized: false,
            request_id: None,
        }
    }

    /// Authorized admin context on the default channel.
    ///
    /// Used by background work (warmup, repopulation) that has no caller.
    pub fn system() -> Self {
        Self {
            channel: Self::DEFAULT_CHANNEL.to_string(),
            api_type: ApiType::Admin,
            is_authorized: true,
            request_id: None,
        }
    }

    /// Attaches a request id.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::shop(Self::DEFAULT_CHANNEL)
    }
}
