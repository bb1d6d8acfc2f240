//! Inventory navigator: lazy containment-tree navigation and a class-aware
//! action catalogue over a network inventory.

pub mod actions;
pub mod api;
pub mod config;
pub mod db;
pub mod directory;
pub mod models;
pub mod tree;
