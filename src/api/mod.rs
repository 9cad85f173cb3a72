//! # Wire Model
//!
//! Hand-maintained protobuf message definitions and tonic service glue for
//! the `goodmem.v1` API. The message structs carry `prost` derives and the
//! `*_server` modules mirror the shape `tonic-build` would generate, so the
//! crate builds without a system `protoc`; the wire format is standard
//! protobuf over gRPC.
//!
//! Conventions on this surface:
//!
//! - identifier fields are 16-byte binary values (`bytes`),
//! - timestamps are `google.protobuf.Timestamp` pairs,
//! - enums reserve the zero value as unspecified and invalid on input,
//! - label updates travel as a `label_update_strategy` one-of wrapping
//!   either `replace_labels` or `merge_labels`.

pub mod v1;
