//! Command handlers

pub mod configure;
pub mod lookup;
pub mod run;
