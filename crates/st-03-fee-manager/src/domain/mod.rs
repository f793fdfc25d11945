//! Domain layer: fee floor and lock allowance.

pub mod fee_calculator;
pub mod value_time_lock;
