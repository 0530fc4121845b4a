//! Store-map domain: store rows, GeoJSON features, filters and viewer state.

pub mod allow_list;
mod app_config;
pub mod brands;
pub mod builder;
mod config;
pub mod controller;
mod error;
pub mod features;
pub mod filter;
pub mod persist;
pub mod popup;
pub mod records;

pub use allow_list::AllowList;
pub use app_config::{AppConfig, DataSource, Environment};
pub use brands::{load_brands, BrandStyle, BrandsFile};
pub use builder::{build_features, BuildOptions, BuildReport};
pub use config::{load_app_config, load_app_config_from_env};
pub use controller::{Command, Controller, Event, Ticket};
pub use error::{ConfigError, FilterError, ParseError, StoreError};
pub use features::{FeatureCollection, Point, PointFeature, StoreProperties};
pub use filter::{apply_filters, BrandFilter, CodeFilter, FilterState};
pub use persist::{KeyValueStore, PersistedState, ViewState};
pub use popup::PopupDetails;
pub use records::{parse_store_records, StoreRecord};
