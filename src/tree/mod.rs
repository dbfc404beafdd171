// src/tree/mod.rs
//
// The comment-tree core: traversal/aggregation over the reference graph a
// post's comments form, cascade deletion, root-post resolution and post
// ranking. Everything here walks id references through the store; nothing
// is denormalized except the owning-post id each comment records.

pub mod cascade;
pub mod rank;
pub mod resolve;
pub mod traverse;

pub use rank::SortMode;
pub use traverse::CommentLookup;
