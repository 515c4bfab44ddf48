//! On-chain facts for Dareboard subjects.
//!
//! The verification engine never talks to a node directly; it asks a
//! [`FactSource`] for the [`Fact`] behind a subject. [`RpcFactSource`] is the
//! production implementation over HTTP JSON-RPC.

pub mod error;
pub mod fact;
pub mod rpc;
pub mod source;

pub use error::ChainError;
pub use fact::Fact;
pub use rpc::RpcFactSource;
pub use source::FactSource;
