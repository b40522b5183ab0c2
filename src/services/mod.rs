pub mod aggregation;
pub mod clock_in_service;
pub mod items_service;

pub use aggregation::AggregationReporter;
pub use clock_in_service::ClockInService;
pub use items_service::ItemsService;
