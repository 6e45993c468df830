// Domain layer - measurement models and pure transformations
pub mod asset;
pub mod lenient;
pub mod measurement;
pub mod report;
pub mod series;
pub mod window;
