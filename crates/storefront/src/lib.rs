//! Corner Shop Storefront library.
//!
//! The storefront keeps everything on the local machine: a static product
//! catalog, a cart, a mock account system and a checkout flow, all mirrored
//! into a key-value store under the keys `cart`, `user` and `users`.
//!
//! # Architecture
//!
//! - [`storage`] - `KeyValueStore` trait with in-memory and file backends
//! - [`db`] - Repositories reading and writing the persisted records
//! - [`catalog`] and [`cart`] - Product listing and the cart model
//! - [`services`] - Auth, account management, checkout and contact forms
//! - [`state`] - The [`Storefront`] application state tying it together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod validation;

pub use error::{AppError, Result};
pub use state::Storefront;
