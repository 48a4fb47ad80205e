//! Request middleware: the shared-secret gate and metrics recording.

pub mod metrics;
pub mod secret_gate;

pub use metrics::track_requests;
pub use secret_gate::secret_gate;
