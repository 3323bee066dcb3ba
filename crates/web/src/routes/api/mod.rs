//! JSON API used by the constructor page and external clients.

pub mod businesses;
