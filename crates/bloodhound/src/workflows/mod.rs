pub mod ledger;
pub mod registry;
pub mod vendors;
