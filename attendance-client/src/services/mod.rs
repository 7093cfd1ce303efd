//! Acquisition and derivation services

pub mod acquisition;
pub mod local_store;
pub mod record_extractor;
pub mod remote_resolver;
pub mod transport;

pub use acquisition::AcquisitionPipeline;
pub use local_store::{LocalStore, StorageId};
pub use remote_resolver::{Acceptance, ProviderDescriptor, RemoteSourceResolver};
pub use transport::{
    DatasetTransport, HttpTransport, ResourceRequest, StaticToken, TokenProvider,
    TransportError, TransportResponse,
};
