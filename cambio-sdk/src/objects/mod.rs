pub mod checkout;
pub mod deep_link;
pub mod market;
pub mod orders;
pub mod rates;

pub use checkout::{
    CheckoutStateResponse, FeedbackPromptResponse, FormPatch, GoToStepRequest, HandoffResponse,
    HandoffStatus, OpenCheckoutRequest, RecoveryResponse,
};
pub use deep_link::{DeepLinkAction, DeepLinkError, FeedbackDeepLink};
pub use market::{Currency, TradeDirection};
pub use orders::{
    CreateOrderRequest, CreateOrderResponse, OrderDestination, OrderStatus, PaymentMethod,
    ProofUploadResponse,
};
pub use rates::{RateQuote, RatesResponse};
