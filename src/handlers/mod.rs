// src/handlers/mod.rs

pub mod content;
pub mod system;
pub mod review;
