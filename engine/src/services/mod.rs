// Sales views: the transformer and the combined overview built on top of it
pub mod overview;
pub mod transformer;

pub use overview::SalesOverview;
pub use transformer::SalesTransformer;
