//! `goodmem.v1` messages, enums, and service definitions.
//!
//! Kept in one file, messages first and the per-service server modules at
//! the end, mirroring the layout of vendored protobuf modules.

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Shared messages
// ---------------------------------------------------------------------------

/// Wrapper for a string-to-string map used inside one-of fields.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StringMap {
    #[prost(map = "string, string", tag = "1")]
    pub labels: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ApiKeyStatus {
    Unspecified = 0,
    Active = 1,
    Inactive = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ProviderType {
    Unspecified = 0,
    Openai = 1,
    Vllm = 2,
    Tei = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Modality {
    Unspecified = 0,
    Text = 1,
    Image = 2,
    Audio = 3,
    Video = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SortOrder {
    Unspecified = 0,
    Ascending = 1,
    Descending = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ProcessingStatus {
    Unspecified = 0,
    Pending = 1,
    Processing = 2,
    Completed = 3,
    Failed = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum VectorStatus {
    Unspecified = 0,
    Pending = 1,
    Generated = 2,
    Failed = 3,
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct User {
    #[prost(bytes = "vec", tag = "1")]
    pub user_id: Vec<u8>,
    #[prost(string, optional, tag = "2")]
    pub username: Option<String>,
    #[prost(string, tag = "3")]
    pub email: String,
    #[prost(string, optional, tag = "4")]
    pub display_name: Option<String>,
    #[prost(message, optional, tag = "5")]
    pub created_at: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "6")]
    pub updated_at: Option<::prost_types::Timestamp>,
}

/// Lookup precedence: `user_id` wins over `email`; with neither set the
/// caller is returned.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetUserRequest {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub user_id: Option<Vec<u8>>,
    #[prost(string, optional, tag = "2")]
    pub email: Option<String>,
}

// ---------------------------------------------------------------------------
// ApiKey
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ApiKey {
    #[prost(bytes = "vec", tag = "1")]
    pub api_key_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub user_id: Vec<u8>,
    #[prost(string, tag = "3")]
    pub key_prefix: String,
    #[prost(enumeration = "ApiKeyStatus", tag = "4")]
    pub status: i32,
    #[prost(map = "string, string", tag = "5")]
    pub labels: HashMap<String, String>,
    #[prost(message, optional, tag = "6")]
    pub expires_at: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "7")]
    pub last_used_at: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "8")]
    pub created_at: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "9")]
    pub updated_at: Option<::prost_types::Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateApiKeyRequest {
    #[prost(map = "string, string", tag = "1")]
    pub labels: HashMap<String, String>,
    #[prost(message, optional, tag = "2")]
    pub expires_at: Option<::prost_types::Timestamp>,
}

/// The only message that ever carries a raw API key.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateApiKeyResponse {
    #[prost(message, optional, tag = "1")]
    pub api_key: Option<ApiKey>,
    #[prost(string, tag = "2")]
    pub raw_api_key: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListApiKeysRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListApiKeysResponse {
    #[prost(message, repeated, tag = "1")]
    pub keys: Vec<ApiKey>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateApiKeyRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub api_key_id: Vec<u8>,
    #[prost(enumeration = "ApiKeyStatus", optional, tag = "2")]
    pub status: Option<i32>,
    #[prost(oneof = "update_api_key_request::LabelUpdateStrategy", tags = "3, 4")]
    pub label_update_strategy: Option<update_api_key_request::LabelUpdateStrategy>,
}

pub mod update_api_key_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum LabelUpdateStrategy {
        #[prost(message, tag = "3")]
        ReplaceLabels(super::StringMap),
        #[prost(message, tag = "4")]
        MergeLabels(super::StringMap),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteApiKeyRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub api_key_id: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteApiKeyResponse {}

// ---------------------------------------------------------------------------
// Embedder
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Embedder {
    #[prost(bytes = "vec", tag = "1")]
    pub embedder_id: Vec<u8>,
    #[prost(string, tag = "2")]
    pub display_name: String,
    #[prost(string, optional, tag = "3")]
    pub description: Option<String>,
    #[prost(enumeration = "ProviderType", tag = "4")]
    pub provider_type: i32,
    #[prost(string, tag = "5")]
    pub endpoint_url: String,
    #[prost(string, tag = "6")]
    pub api_path: String,
    #[prost(string, tag = "7")]
    pub model_identifier: String,
    #[prost(int32, tag = "8")]
    pub dimensionality: i32,
    #[prost(int32, optional, tag = "9")]
    pub max_sequence_length: Option<i32>,
    #[prost(enumeration = "Modality", repeated, tag = "10")]
    pub supported_modalities: Vec<i32>,
    /// Present only on single-resource reads the caller is entitled to;
    /// always empty in list responses.
    #[prost(string, tag = "11")]
    pub credentials: String,
    #[prost(map = "string, string", tag = "12")]
    pub labels: HashMap<String, String>,
    #[prost(string, optional, tag = "13")]
    pub version: Option<String>,
    #[prost(string, optional, tag = "14")]
    pub monitoring_endpoint: Option<String>,
    #[prost(bytes = "vec", tag = "15")]
    pub owner_id: Vec<u8>,
    #[prost(message, optional, tag = "16")]
    pub created_at: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "17")]
    pub updated_at: Option<::prost_types::Timestamp>,
    #[prost(bytes = "vec", tag = "18")]
    pub created_by: Vec<u8>,
    #[prost(bytes = "vec", tag = "19")]
    pub updated_by: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateEmbedderRequest {
    #[prost(string, tag = "1")]
    pub display_name: String,
    #[prost(string, optional, tag = "2")]
    pub description: Option<String>,
    #[prost(enumeration = "ProviderType", tag = "3")]
    pub provider_type: i32,
    #[prost(string, tag = "4")]
    pub endpoint_url: String,
    #[prost(string, optional, tag = "5")]
    pub api_path: Option<String>,
    #[prost(string, tag = "6")]
    pub model_identifier: String,
    #[prost(int32, tag = "7")]
    pub dimensionality: i32,
    #[prost(int32, optional, tag = "8")]
    pub max_sequence_length: Option<i32>,
    #[prost(enumeration = "Modality", repeated, tag = "9")]
    pub supported_modalities: Vec<i32>,
    #[prost(string, tag = "10")]
    pub credentials: String,
    #[prost(map = "string, string", tag = "11")]
    pub labels: HashMap<String, String>,
    #[prost(string, optional, tag = "12")]
    pub version: Option<String>,
    #[prost(string, optional, tag = "13")]
    pub monitoring_endpoint: Option<String>,
    #[prost(bytes = "vec", optional, tag = "14")]
    pub owner_id: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetEmbedderRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub embedder_id: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListEmbeddersRequest {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub owner_id: Option<Vec<u8>>,
    #[prost(enumeration = "ProviderType", optional, tag = "2")]
    pub provider_type: Option<i32>,
    #[prost(map = "string, string", tag = "3")]
    pub label_selectors: HashMap<String, String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListEmbeddersResponse {
    #[prost(message, repeated, tag = "1")]
    pub embedders: Vec<Embedder>,
}

/// `provider_type` is present only so attempts to change it can be
/// rejected explicitly; it is immutable after creation.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateEmbedderRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub embedder_id: Vec<u8>,
    #[prost(string, optional, tag = "2")]
    pub display_name: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub description: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub endpoint_url: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub api_path: Option<String>,
    #[prost(string, optional, tag = "6")]
    pub model_identifier: Option<String>,
    #[prost(int32, optional, tag = "7")]
    pub dimensionality: Option<i32>,
    #[prost(int32, optional, tag = "8")]
    pub max_sequence_length: Option<i32>,
    #[prost(enumeration = "Modality", repeated, tag = "9")]
    pub supported_modalities: Vec<i32>,
    #[prost(string, optional, tag = "10")]
    pub credentials: Option<String>,
    #[prost(string, optional, tag = "11")]
    pub version: Option<String>,
    #[prost(string, optional, tag = "12")]
    pub monitoring_endpoint: Option<String>,
    #[prost(enumeration = "ProviderType", optional, tag = "13")]
    pub provider_type: Option<i32>,
    #[prost(oneof = "update_embedder_request::LabelUpdateStrategy", tags = "14, 15")]
    pub label_update_strategy: Option<update_embedder_request::LabelUpdateStrategy>,
}

pub mod update_embedder_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum LabelUpdateStrategy {
        #[prost(message, tag = "14")]
        ReplaceLabels(super::StringMap),
        #[prost(message, tag = "15")]
        MergeLabels(super::StringMap),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteEmbedderRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub embedder_id: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteEmbedderResponse {}

// ---------------------------------------------------------------------------
// Space
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Space {
    #[prost(bytes = "vec", tag = "1")]
    pub space_id: Vec<u8>,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(map = "string, string", tag = "3")]
    pub labels: HashMap<String, String>,
    #[prost(bytes = "vec", tag = "4")]
    pub embedder_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    pub owner_id: Vec<u8>,
    #[prost(bool, tag = "6")]
    pub public_read: bool,
    #[prost(message, optional, tag = "7")]
    pub created_at: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "8")]
    pub updated_at: Option<::prost_types::Timestamp>,
    #[prost(bytes = "vec", tag = "9")]
    pub created_by: Vec<u8>,
    #[prost(bytes = "vec", tag = "10")]
    pub updated_by: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateSpaceRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(bytes = "vec", tag = "2")]
    pub embedder_id: Vec<u8>,
    #[prost(map = "string, string", tag = "3")]
    pub labels: HashMap<String, String>,
    #[prost(bool, optional, tag = "4")]
    pub public_read: Option<bool>,
    #[prost(bytes = "vec", optional, tag = "5")]
    pub owner_id: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetSpaceRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub space_id: Vec<u8>,
}

/// Filter parameters are ignored when `next_token` is supplied; the token
/// carries the original query shape.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListSpacesRequest {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub owner_id: Option<Vec<u8>>,
    #[prost(map = "string, string", tag = "2")]
    pub label_selectors: HashMap<String, String>,
    /// Glob pattern: `*` matches any sequence, `?` one character.
    #[prost(string, optional, tag = "3")]
    pub name_filter: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub sort_by: Option<String>,
    #[prost(enumeration = "SortOrder", optional, tag = "5")]
    pub sort_order: Option<i32>,
    #[prost(int32, optional, tag = "6")]
    pub max_results: Option<i32>,
    #[prost(string, optional, tag = "7")]
    pub next_token: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListSpacesResponse {
    #[prost(message, repeated, tag = "1")]
    pub spaces: Vec<Space>,
    /// Present iff further pages exist.
    #[prost(string, optional, tag = "2")]
    pub next_token: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateSpaceRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub space_id: Vec<u8>,
    #[prost(string, optional, tag = "2")]
    pub name: Option<String>,
    #[prost(bool, optional, tag = "3")]
    pub public_read: Option<bool>,
    #[prost(oneof = "update_space_request::LabelUpdateStrategy", tags = "4, 5")]
    pub label_update_strategy: Option<update_space_request::LabelUpdateStrategy>,
}

pub mod update_space_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum LabelUpdateStrategy {
        #[prost(message, tag = "4")]
        ReplaceLabels(super::StringMap),
        #[prost(message, tag = "5")]
        MergeLabels(super::StringMap),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteSpaceRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub space_id: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteSpaceResponse {}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Memory {
    #[prost(bytes = "vec", tag = "1")]
    pub memory_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub space_id: Vec<u8>,
    #[prost(string, tag = "3")]
    pub original_content_ref: String,
    #[prost(string, tag = "4")]
    pub content_type: String,
    #[prost(map = "string, string", tag = "5")]
    pub metadata: HashMap<String, String>,
    #[prost(enumeration = "ProcessingStatus", tag = "6")]
    pub processing_status: i32,
    #[prost(message, optional, tag = "7")]
    pub created_at: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "8")]
    pub updated_at: Option<::prost_types::Timestamp>,
    #[prost(bytes = "vec", tag = "9")]
    pub created_by: Vec<u8>,
    #[prost(bytes = "vec", tag = "10")]
    pub updated_by: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MemoryChunk {
    #[prost(bytes = "vec", tag = "1")]
    pub chunk_id: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub memory_id: Vec<u8>,
    #[prost(int32, tag = "3")]
    pub chunk_sequence_number: i32,
    #[prost(string, tag = "4")]
    pub chunk_text: String,
    #[prost(float, repeated, tag = "5")]
    pub embedding_vector: Vec<f32>,
    #[prost(enumeration = "VectorStatus", tag = "6")]
    pub vector_status: i32,
    #[prost(int32, optional, tag = "7")]
    pub start_offset: Option<i32>,
    #[prost(int32, optional, tag = "8")]
    pub end_offset: Option<i32>,
    #[prost(message, optional, tag = "9")]
    pub created_at: Option<::prost_types::Timestamp>,
    #[prost(message, optional, tag = "10")]
    pub updated_at: Option<::prost_types::Timestamp>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateMemoryRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub space_id: Vec<u8>,
    #[prost(string, tag = "2")]
    pub original_content_ref: String,
    #[prost(string, tag = "3")]
    pub content_type: String,
    #[prost(map = "string, string", tag = "4")]
    pub metadata: HashMap<String, String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetMemoryRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub memory_id: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListMemoriesRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub space_id: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListMemoriesResponse {
    #[prost(message, repeated, tag = "1")]
    pub memories: Vec<Memory>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteMemoryRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub memory_id: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteMemoryResponse {}

/// Similarity search over a space's generated chunks. The caller supplies
/// the query vector; the server never contacts embedding providers.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchMemoryChunksRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub space_id: Vec<u8>,
    #[prost(float, repeated, tag = "2")]
    pub query_vector: Vec<f32>,
    #[prost(int32, optional, tag = "3")]
    pub top_k: Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchMemoryChunksResponse {
    /// Ordered by L2 distance ascending.
    #[prost(message, repeated, tag = "1")]
    pub chunks: Vec<MemoryChunk>,
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InitializeSystemRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InitializeSystemResponse {
    #[prost(bool, tag = "1")]
    pub already_initialized: bool,
    /// Empty when the system was already initialized.
    #[prost(string, tag = "2")]
    pub root_api_key: String,
    #[prost(bytes = "vec", tag = "3")]
    pub user_id: Vec<u8>,
    #[prost(string, tag = "4")]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Server modules (tonic glue, hand-maintained in the generated shape)
// ---------------------------------------------------------------------------

/// Expands the routing boilerplate of one unary method inside a server's
/// `call` implementation.
macro_rules! unary_route {
    ($trait_:ident, $inner:expr, $req:expr, $svc:ident, $request_ty:ty, $response_ty:ty, $method:ident) => {{
        struct $svc<T: $trait_>(std::sync::Arc<T>);
        impl<T: $trait_> tonic::server::UnaryService<$request_ty> for $svc<T> {
            type Response = $response_ty;
            type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
            fn call(&mut self, request: tonic::Request<$request_ty>) -> Self::Future {
                let inner = std::sync::Arc::clone(&self.0);
                Box::pin(async move { inner.$method(request).await })
            }
        }
        let inner = std::sync::Arc::clone($inner);
        let req = $req;
        Box::pin(async move {
            let mut grpc = tonic::server::Grpc::new(tonic::codec::ProstCodec::default());
            Ok(grpc.unary($svc(inner), req).await)
        })
    }};
}

/// Expands the shared server struct plumbing (constructors, `Clone`,
/// `NamedService`).
macro_rules! service_server_plumbing {
    ($server:ident, $trait_:ident, $name:literal) => {
        #[derive(Debug)]
        pub struct $server<T: $trait_> {
            inner: std::sync::Arc<T>,
        }

        impl<T: $trait_> $server<T> {
            pub fn new(inner: T) -> Self {
                Self {
                    inner: std::sync::Arc::new(inner),
                }
            }

            pub fn from_arc(inner: std::sync::Arc<T>) -> Self {
                Self { inner }
            }
        }

        impl<T: $trait_> Clone for $server<T> {
            fn clone(&self) -> Self {
                Self {
                    inner: std::sync::Arc::clone(&self.inner),
                }
            }
        }

        impl<T: $trait_> tonic::server::NamedService for $server<T> {
            const NAME: &'static str = $name;
        }
    };
}

/// Trailers-only response for unknown methods on a known service.
macro_rules! unimplemented_route {
    () => {
        Box::pin(async move {
            Ok(http::Response::builder()
                .status(200)
                .header("grpc-status", "12")
                .header("content-type", "application/grpc")
                .body(empty_body())
                .unwrap())
        })
    };
}

pub mod system_service_server {
    use tonic::codegen::*;

    #[async_trait]
    pub trait SystemService: Send + Sync + 'static {
        /// The only unauthenticated method of the API.
        async fn initialize_system(
            &self,
            request: tonic::Request<super::InitializeSystemRequest>,
        ) -> Result<tonic::Response<super::InitializeSystemResponse>, tonic::Status>;
    }

    service_server_plumbing!(SystemServiceServer, SystemService, "goodmem.v1.SystemService");

    impl<T, B> Service<http::Request<B>> for SystemServiceServer<T>
    where
        T: SystemService,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/goodmem.v1.SystemService/InitializeSystem" => unary_route!(
                    SystemService,
                    &self.inner,
                    req,
                    InitializeSystemSvc,
                    super::InitializeSystemRequest,
                    super::InitializeSystemResponse,
                    initialize_system
                ),
                _ => unimplemented_route!(),
            }
        }
    }
}

pub mod user_service_server {
    use tonic::codegen::*;

    #[async_trait]
    pub trait UserService: Send + Sync + 'static {
        async fn get_user(
            &self,
            request: tonic::Request<super::GetUserRequest>,
        ) -> Result<tonic::Response<super::User>, tonic::Status>;
    }

    service_server_plumbing!(UserServiceServer, UserService, "goodmem.v1.UserService");

    impl<T, B> Service<http::Request<B>> for UserServiceServer<T>
    where
        T: UserService,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/goodmem.v1.UserService/GetUser" => unary_route!(
                    UserService,
                    &self.inner,
                    req,
                    GetUserSvc,
                    super::GetUserRequest,
                    super::User,
                    get_user
                ),
                _ => unimplemented_route!(),
            }
        }
    }
}

pub mod api_key_service_server {
    use tonic::codegen::*;

    #[async_trait]
    pub trait ApiKeyService: Send + Sync + 'static {
        async fn create_api_key(
            &self,
            request: tonic::Request<super::CreateApiKeyRequest>,
        ) -> Result<tonic::Response<super::CreateApiKeyResponse>, tonic::Status>;

        async fn list_api_keys(
            &self,
            request: tonic::Request<super::ListApiKeysRequest>,
        ) -> Result<tonic::Response<super::ListApiKeysResponse>, tonic::Status>;

        async fn update_api_key(
            &self,
            request: tonic::Request<super::UpdateApiKeyRequest>,
        ) -> Result<tonic::Response<super::ApiKey>, tonic::Status>;

        async fn delete_api_key(
            &self,
            request: tonic::Request<super::DeleteApiKeyRequest>,
        ) -> Result<tonic::Response<super::DeleteApiKeyResponse>, tonic::Status>;
    }

    service_server_plumbing!(ApiKeyServiceServer, ApiKeyService, "goodmem.v1.ApiKeyService");

    impl<T, B> Service<http::Request<B>> for ApiKeyServiceServer<T>
    where
        T: ApiKeyService,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/goodmem.v1.ApiKeyService/CreateApiKey" => unary_route!(
                    ApiKeyService,
                    &self.inner,
                    req,
                    CreateApiKeySvc,
                    super::CreateApiKeyRequest,
                    super::CreateApiKeyResponse,
                    create_api_key
                ),
                "/goodmem.v1.ApiKeyService/ListApiKeys" => unary_route!(
                    ApiKeyService,
                    &self.inner,
                    req,
                    ListApiKeysSvc,
                    super::ListApiKeysRequest,
                    super::ListApiKeysResponse,
                    list_api_keys
                ),
                "/goodmem.v1.ApiKeyService/UpdateApiKey" => unary_route!(
                    ApiKeyService,
                    &self.inner,
                    req,
                    UpdateApiKeySvc,
                    super::UpdateApiKeyRequest,
                    super::ApiKey,
                    update_api_key
                ),
                "/goodmem.v1.ApiKeyService/DeleteApiKey" => unary_route!(
                    ApiKeyService,
                    &self.inner,
                    req,
                    DeleteApiKeySvc,
                    super::DeleteApiKeyRequest,
                    super::DeleteApiKeyResponse,
                    delete_api_key
                ),
                _ => unimplemented_route!(),
            }
        }
    }
}

pub mod embedder_service_server {
    use tonic::codegen::*;

    #[async_trait]
    pub trait EmbedderService: Send + Sync + 'static {
        async fn create_embedder(
            &self,
            request: tonic::Request<super::CreateEmbedderRequest>,
        ) -> Result<tonic::Response<super::Embedder>, tonic::Status>;

        async fn get_embedder(
            &self,
            request: tonic::Request<super::GetEmbedderRequest>,
        ) -> Result<tonic::Response<super::Embedder>, tonic::Status>;

        async fn list_embedders(
            &self,
            request: tonic::Request<super::ListEmbeddersRequest>,
        ) -> Result<tonic::Response<super::ListEmbeddersResponse>, tonic::Status>;

        async fn update_embedder(
            &self,
            request: tonic::Request<super::UpdateEmbedderRequest>,
        ) -> Result<tonic::Response<super::Embedder>, tonic::Status>;

        async fn delete_embedder(
            &self,
            request: tonic::Request<super::DeleteEmbedderRequest>,
        ) -> Result<tonic::Response<super::DeleteEmbedderResponse>, tonic::Status>;
    }

    service_server_plumbing!(
        EmbedderServiceServer,
        EmbedderService,
        "goodmem.v1.EmbedderService"
    );

    impl<T, B> Service<http::Request<B>> for EmbedderServiceServer<T>
    where
        T: EmbedderService,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/goodmem.v1.EmbedderService/CreateEmbedder" => unary_route!(
                    EmbedderService,
                    &self.inner,
                    req,
                    CreateEmbedderSvc,
                    super::CreateEmbedderRequest,
                    super::Embedder,
                    create_embedder
                ),
                "/goodmem.v1.EmbedderService/GetEmbedder" => unary_route!(
                    EmbedderService,
                    &self.inner,
                    req,
                    GetEmbedderSvc,
                    super::GetEmbedderRequest,
                    super::Embedder,
                    get_embedder
                ),
                "/goodmem.v1.EmbedderService/ListEmbedders" => unary_route!(
                    EmbedderService,
                    &self.inner,
                    req,
                    ListEmbeddersSvc,
                    super::ListEmbeddersRequest,
                    super::ListEmbeddersResponse,
                    list_embedders
                ),
                "/goodmem.v1.EmbedderService/UpdateEmbedder" => unary_route!(
                    EmbedderService,
                    &self.inner,
                    req,
                    UpdateEmbedderSvc,
                    super::UpdateEmbedderRequest,
                    super::Embedder,
                    update_embedder
                ),
                "/goodmem.v1.EmbedderService/DeleteEmbedder" => unary_route!(
                    EmbedderService,
                    &self.inner,
                    req,
                    DeleteEmbedderSvc,
                    super::DeleteEmbedderRequest,
                    super::DeleteEmbedderResponse,
                    delete_embedder
                ),
                _ => unimplemented_route!(),
            }
        }
    }
}

pub mod space_service_server {
    use tonic::codegen::*;

    #[async_trait]
    pub trait SpaceService: Send + Sync + 'static {
        async fn create_space(
            &self,
            request: tonic::Request<super::CreateSpaceRequest>,
        ) -> Result<tonic::Response<super::Space>, tonic::Status>;

        async fn get_space(
            &self,
            request: tonic::Request<super::GetSpaceRequest>,
        ) -> Result<tonic::Response<super::Space>, tonic::Status>;

        async fn list_spaces(
            &self,
            request: tonic::Request<super::ListSpacesRequest>,
        ) -> Result<tonic::Response<super::ListSpacesResponse>, tonic::Status>;

        async fn update_space(
            &self,
            request: tonic::Request<super::UpdateSpaceRequest>,
        ) -> Result<tonic::Response<super::Space>, tonic::Status>;

        async fn delete_space(
            &self,
            request: tonic::Request<super::DeleteSpaceRequest>,
        ) -> Result<tonic::Response<super::DeleteSpaceResponse>, tonic::Status>;
    }

    service_server_plumbing!(SpaceServiceServer, SpaceService, "goodmem.v1.SpaceService");

    impl<T, B> Service<http::Request<B>> for SpaceServiceServer<T>
    where
        T: SpaceService,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/goodmem.v1.SpaceService/CreateSpace" => unary_route!(
                    SpaceService,
                    &self.inner,
                    req,
                    CreateSpaceSvc,
                    super::CreateSpaceRequest,
                    super::Space,
                    create_space
                ),
                "/goodmem.v1.SpaceService/GetSpace" => unary_route!(
                    SpaceService,
                    &self.inner,
                    req,
                    GetSpaceSvc,
                    super::GetSpaceRequest,
                    super::Space,
                    get_space
                ),
                "/goodmem.v1.SpaceService/ListSpaces" => unary_route!(
                    SpaceService,
                    &self.inner,
                    req,
                    ListSpacesSvc,
                    super::ListSpacesRequest,
                    super::ListSpacesResponse,
                    list_spaces
                ),
                "/goodmem.v1.SpaceService/UpdateSpace" => unary_route!(
                    SpaceService,
                    &self.inner,
                    req,
                    UpdateSpaceSvc,
                    super::UpdateSpaceRequest,
                    super::Space,
                    update_space
                ),
                "/goodmem.v1.SpaceService/DeleteSpace" => unary_route!(
                    SpaceService,
                    &self.inner,
                    req,
                    DeleteSpaceSvc,
                    super::DeleteSpaceRequest,
                    super::DeleteSpaceResponse,
                    delete_space
                ),
                _ => unimplemented_route!(),
            }
        }
    }
}

pub mod memory_service_server {
    use tonic::codegen::*;

    #[async_trait]
    pub trait MemoryService: Send + Sync + 'static {
        async fn create_memory(
            &self,
            request: tonic::Request<super::CreateMemoryRequest>,
        ) -> Result<tonic::Response<super::Memory>, tonic::Status>;

        async fn get_memory(
            &self,
            request: tonic::Request<super::GetMemoryRequest>,
        ) -> Result<tonic::Response<super::Memory>, tonic::Status>;

        async fn list_memories(
            &self,
            request: tonic::Request<super::ListMemoriesRequest>,
        ) -> Result<tonic::Response<super::ListMemoriesResponse>, tonic::Status>;

        async fn delete_memory(
            &self,
            request: tonic::Request<super::DeleteMemoryRequest>,
        ) -> Result<tonic::Response<super::DeleteMemoryResponse>, tonic::Status>;

        async fn search_memory_chunks(
            &self,
            request: tonic::Request<super::SearchMemoryChunksRequest>,
        ) -> Result<tonic::Response<super::SearchMemoryChunksResponse>, tonic::Status>;
    }

    service_server_plumbing!(MemoryServiceServer, MemoryService, "goodmem.v1.MemoryService");

    impl<T, B> Service<http::Request<B>> for MemoryServiceServer<T>
    where
        T: MemoryService,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = std::convert::Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            match req.uri().path() {
                "/goodmem.v1.MemoryService/CreateMemory" => unary_route!(
                    MemoryService,
                    &self.inner,
                    req,
                    CreateMemorySvc,
                    super::CreateMemoryRequest,
                    super::Memory,
                    create_memory
                ),
                "/goodmem.v1.MemoryService/GetMemory" => unary_route!(
                    MemoryService,
                    &self.inner,
                    req,
                    GetMemorySvc,
                    super::GetMemoryRequest,
                    super::Memory,
                    get_memory
                ),
                "/goodmem.v1.MemoryService/ListMemories" => unary_route!(
                    MemoryService,
                    &self.inner,
                    req,
                    ListMemoriesSvc,
                    super::ListMemoriesRequest,
                    super::ListMemoriesResponse,
                    list_memories
                ),
                "/goodmem.v1.MemoryService/DeleteMemory" => unary_route!(
                    MemoryService,
                    &self.inner,
                    req,
                    DeleteMemorySvc,
                    super::DeleteMemoryRequest,
                    super::DeleteMemoryResponse,
                    delete_memory
                ),
                "/goodmem.v1.MemoryService/SearchMemoryChunks" => unary_route!(
                    MemoryService,
                    &self.inner,
                    req,
                    SearchMemoryChunksSvc,
                    super::SearchMemoryChunksRequest,
                    super::SearchMemoryChunksResponse,
                    search_memory_chunks
                ),
                _ => unimplemented_route!(),
            }
        }
    }
}
