//! UI components.

pub mod river;
