mod client;
mod decode;
mod encoding;
mod http;
mod native_type;

pub use client::{BackendClient, BackendId, ClientFactory, QualifiedName, Query};
pub use decode::decode_cell;
pub use encoding::canonical_text;
pub use http::{HttpJsonClient, HttpJsonClientFactory, decode_response};
pub use native_type::{NativeMapping, ValueEncoding, map_native_type};

#[cfg(test)]
mod decode_test;
