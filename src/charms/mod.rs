//! The example charms. Each is an independent entry point; none shares state
//! with another.

pub mod bare;
pub mod hook_printer;
pub mod push_nested;
pub mod relation_departed;
