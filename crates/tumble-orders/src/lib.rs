//! Order management for the Tumble platform.
//!
//! [`service`] holds the write paths — placement and manager status
//! changes — and [`feed`] holds the read path: a live, search-filterable
//! mirror of the order store for one subscription filter.

pub mod feed;
pub mod service;

pub use feed::OrderFeed;
pub use service::OrderService;
