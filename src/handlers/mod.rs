// src/handlers/mod.rs

pub mod auth;
pub mod comment;
pub mod community;
pub mod flair;
pub mod post;
pub mod profile;
pub mod search;
