// src/models/mod.rs

pub mod content;
pub mod policy;
pub mod review;
