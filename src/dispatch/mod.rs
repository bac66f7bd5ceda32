//! Concurrent dispatch of built jobs over a shared transport

pub mod pool;
pub mod request;
pub mod transport;

pub use pool::{interpret_response, DispatchOptions, Dispatcher, ResultSender};
pub use request::{Endpoint, FormPayload, TransportResponse};
pub use transport::{HttpTransport, Transport, TransportError};
