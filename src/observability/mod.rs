//! Observability: structured logging setup lives in `main`, metrics here.

pub mod metrics;
