//! HTTP request handlers for the variant web service

pub mod annotate;
pub mod cache;
pub mod health;
pub mod notation;
pub mod recode;
