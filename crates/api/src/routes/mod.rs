//! Route handlers

pub mod conditions;
pub mod forecast;
pub mod pressure;
pub mod samples;
