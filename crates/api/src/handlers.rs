pub mod availability;
pub mod booking;
pub mod settings;
pub mod slot_block;
