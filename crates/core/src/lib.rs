//! Deployment status core
//!
//! Shared building blocks for the bluelight responder and CLI:
//! - **Regions** (`region`) - the five fixed status partitions
//! - **Fetching** (`fetch`) - one bounded GET per region, failures folded into data
//! - **Coordination** (`coordinator`) - concurrent fan-out/fan-in over all regions
//! - **Indicators** (`indicator`) - status token to colour mapping
//! - **Configuration** (`config`) - layered file/env/override loading

pub mod board;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod fetch;
pub mod indicator;
pub mod region;

pub use board::{FetchOutcome, StatusBoard, StatusReport};
pub use coordinator::FetchCoordinator;
pub use errors::{FetchError, UnknownRegion};
pub use fetch::{HttpStatusSource, StatusFetcher, StatusSource};
pub use indicator::Indicator;
pub use region::Region;
