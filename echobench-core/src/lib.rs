//! echobench core library
//!
//! Echo services and clients for comparing host frameworks and wire formats.
//! Provides payload shapes, the seeded item cache, serializer adapters,
//! service hosts, client variants, suite dispatch and configuration parsing.

pub mod cache;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod frame;
pub mod host;
pub mod metrics;
pub mod payload;
pub mod suite;
pub mod types;

// Re-export commonly used types
pub use cache::ItemCache;
pub use client::{AnyClient, ClientKind, EchoClient, PooledClient, RawClient};
pub use codec::{Codec, Format};
pub use config::{BenchConfig, BenchmarkSettings, ConfigLoader, SuiteEntry};
pub use error::{BenchError, BenchResult, CodecError, HardValidationError, HostError, TransportError};
pub use host::{Host, HostKind};
pub use payload::{LargeItem, Payload, PayloadKind, SmallItem};
pub use suite::{AnySuite, ClientOperation, EchoSuite, SuiteSpec};
pub use types::{InvocationParams, ItemCount, Port};
