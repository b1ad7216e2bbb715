//! Command handlers

pub mod bookmark;
pub mod config;
pub mod html;
pub mod tag;
