//! Analysis modules.
//!
//! The aggregator is the reusable core; popularity selection, correlation
//! and yearly trends build the remaining report sections.

pub mod aggregator;
pub mod correlation;
pub mod popularity;
pub mod trend;

pub use aggregator::*;
pub use correlation::{correlation_matrix, CorrelationMatrix};
pub use popularity::{select_loved_movies, PopularityOptions};
pub use trend::{yearly_mean, YearPoint};
