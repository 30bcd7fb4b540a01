pub mod filters;
pub mod salesperson_repo;
pub use salesperson_repo::SalespersonRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod ledger_repo;
pub use ledger_repo::LedgerRepository;
pub mod closure_repo;
pub use closure_repo::ClosureRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod analytics_repo;
pub use analytics_repo::AnalyticsRepository;
pub mod historical_repo;
pub use historical_repo::HistoricalRepository;
