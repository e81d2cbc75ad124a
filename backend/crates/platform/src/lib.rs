//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (secure random, SHA-256, Base64, opaque tokens)
//! - Password policy and hashing (Argon2id)

pub mod crypto;
pub mod password;
