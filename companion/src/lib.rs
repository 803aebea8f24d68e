pub mod checkin;
pub mod dispatch;
pub mod error;
pub mod monitor;
pub mod position;
pub mod simulate;
pub mod status;
pub mod stillness;
