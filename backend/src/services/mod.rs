//! Business logic services for the Route Billing Platform

pub mod bill;
pub mod export;
pub mod item;
pub mod route;
pub mod summary;

pub use bill::BillService;
pub use export::ExportService;
pub use item::ItemService;
pub use route::RouteService;
pub use summary::SummaryService;
