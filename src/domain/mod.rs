//! Domain layer - Core business logic and domain models
//!
//! This module contains the payment order model, its status transitions and the
//! collaborator contracts, independent of HTTP, Redis or the gateway's wire format.

pub mod health;
pub mod payments;
pub mod ports;

pub use health::{HealthResponse, HealthStatus};
pub use payments::{
    OrderStatus, Payer, PaymentCallback, PaymentOrder, StatusTransition, TransitionOutcome,
};
pub use ports::{GatewayOrder, GatewayOrderRequest, OrderNotes, PaymentGateway, PaymentOrderStore};
