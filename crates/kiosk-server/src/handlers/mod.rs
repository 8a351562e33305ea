//! Route handlers, one module per resource.

pub mod branches;
pub mod kiosk;
pub mod subscribe;
