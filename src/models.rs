pub mod analytics;
pub mod client;
pub mod closure;
pub mod dashboard;
pub mod historical;
pub mod import;
pub mod ledger;
pub mod salesperson;
pub mod scope;
