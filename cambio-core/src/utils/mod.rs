pub mod money;
pub mod sanitize;
