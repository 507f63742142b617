pub mod event;
pub mod interval;
