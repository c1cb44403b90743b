//! Background tasks.

pub mod seat_poller;
