// src/lib.rs

//! Profile sniffer library: captures feed, highlight and carousel data from a
//! browser's network traffic and normalizes it into canonical records.

pub mod browser;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
