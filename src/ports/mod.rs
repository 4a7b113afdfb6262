pub mod geo;
pub mod identity;
pub mod ledger;
pub mod notifier;
pub mod offers;
pub mod requests;
pub mod schedules;
