//! # GoodMem Server
//!
//! A multi-tenant server that stores, vectorizes, and retrieves
//! "memories" — content blobs attached to user-owned containers called
//! spaces. This crate is the request-handling and persistence core: the
//! `goodmem.v1` gRPC services, the PostgreSQL + pgvector access layer, the
//! API-key principal resolver, system bootstrap, and the 1:1 REST adapter.
//!
//! ## Module Map
//!
//! - [`api`] - wire model (prost messages + tonic service glue)
//! - [`auth`] - permissions, roles, principals, and the resolver
//! - [`config`] - environment-driven configuration
//! - [`crypto`] - AES-256-GCM credential encryption at rest
//! - [`database`] - pool, migrations, and the per-entity query modules
//! - [`error`] - the bounded error taxonomy
//! - [`grpc`] - the tonic listener
//! - [`ids`] - identifier & time codec
//! - [`keys`] - API key generation, hashing, verification
//! - [`models`] - domain entities and state machines
//! - [`pagination`] - opaque cursor tokens
//! - [`rest`] - the axum REST adapter
//! - [`services`] - per-resource handlers shared by both transports

pub mod api;
pub mod auth;
pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
pub mod grpc;
pub mod ids;
pub mod keys;
pub mod models;
pub mod pagination;
pub mod rest;
pub mod services;
