pub mod category;
pub mod config;
pub mod constants;
pub mod error;
pub mod next_data;
pub mod query;
pub mod ratelimit;
pub mod requests;
pub mod safe_access;
mod scraper;
pub mod text_manipulators;
pub mod vehicles;

pub use category::{Category, FromHtml};
pub use config::{RequestOptions, ScraperConfig};
pub use error::{
    ConfigError, Error, FailureKind, MaxRequestAttemptsExceededError, RequestError, Result,
    TransportError, TransportErrorKind,
};
pub use next_data::{FieldFormat, NextData, StructureError};
pub use query::{NumberRange, OrderBy, QueryFilters};
pub use ratelimit::{RateLimiter, WaitStrategy};
pub use requests::{HttpRequest, HttpTransport, QueryParams, Response, Transport};
pub use safe_access::{FieldError, FieldResult, FieldValue, SafeAccess};
pub use scraper::Scraper;
pub use vehicles::{
    OrderVehiclesBy, TagError, VehicleCategory, VehicleData, VehicleTag, VehiclesCategory,
    VehiclesNextData, VehiclesQueryFilters,
};
