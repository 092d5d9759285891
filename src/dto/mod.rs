//! Response bodies for the demo endpoints.

pub mod health;
