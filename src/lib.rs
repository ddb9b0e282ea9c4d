// src/lib.rs

//! Internship Digest Library
//!
//! Polls employer career pages, remembers every posting by URL, and sends a
//! daily digest of the postings first seen that day.

pub mod error;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
