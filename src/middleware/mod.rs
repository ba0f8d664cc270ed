//! HTTP middleware
//!
//! Bearer authentication and request logging

pub mod auth;
pub mod logging;
