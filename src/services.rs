pub mod analytics_service;
pub mod client_service;
pub mod closure_service;
pub mod dashboard_service;
pub mod document_service;
pub mod historical_service;
pub mod import_service;
pub mod ledger_service;
pub mod salesperson_service;
