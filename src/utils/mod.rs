// src/utils/mod.rs

pub mod compliance;
pub mod disclaimer;
pub mod html;
pub mod style;
