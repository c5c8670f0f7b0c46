//! Interfaces between the generator and its consumer.

pub mod update_receiver;
