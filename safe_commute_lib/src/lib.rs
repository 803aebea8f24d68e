pub mod alert;
pub mod coordinate;
pub mod sample;
