// src/models/mod.rs

pub mod comment;
pub mod community;
pub mod flair;
pub mod post;
pub mod user;
