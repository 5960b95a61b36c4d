//! Domain types for work orders and their audit trail.

pub mod order;

pub use order::{
    ChangeType, NO_COMPANY, Order, OrderChange, OrderDraft, OrderPatch, OrderPriority, OrderStatus,
};
