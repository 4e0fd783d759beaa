//! Registry builder for CDC WONDER datasets. Probes the numbered controller
//! endpoints to discover canonical static pages, classifies them into health
//! topics, and crawls the documentation pages for additional links.

pub mod catalog;
pub mod domain;
pub mod error;
pub mod harvest;
pub mod mine;
pub mod output;
pub mod probe;
pub mod progress;
pub mod report;
pub mod scan;
pub mod select;
pub mod store;
pub mod taxonomy;
pub mod years;
