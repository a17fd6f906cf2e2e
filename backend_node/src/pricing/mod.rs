//! Price recommendation backed by a pre-trained regression model.

mod model;

pub use model::{PriceAssessment, PriceBand, PriceModel, PricingError};
