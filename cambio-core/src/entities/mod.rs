pub mod form;
pub mod order;
pub mod proof;
pub mod rate;
pub mod reward;
pub mod session;

pub use cambio_sdk::objects::{Currency, PaymentMethod, TradeDirection};
