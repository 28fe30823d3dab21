//! kpmouse library exports for testing

pub mod backend;
pub mod core;
pub mod dispatch;

#[cfg(test)]
pub mod test_support;
