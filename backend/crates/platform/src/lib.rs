//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (OS randomness, SHA-256, session tokens)
//! - Password hashing (Argon2id with configurable cost)
//! - Cookie management

pub mod cookie;
pub mod crypto;
pub mod password;
