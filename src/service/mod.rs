pub mod availability;
pub mod busy_set;
pub mod calendar_store;
pub mod keep_service;
pub mod selector;
pub mod slot_grid;
