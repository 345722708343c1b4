//! File helpers shared by the option store.

pub mod lock;
