//! Astrology engine abstraction.
//!
//! # Data Flow
//! ```text
//! validated SubjectSpec / ChartSpec
//!     → AstrologyEngine (capability trait)
//!     → remote.rs (HTTP JSON client, one attempt, per-call timeout)
//!     → engine-shaped JSON payloads back to the handlers
//! ```
//!
//! # Design Decisions
//! - The engine is an opaque collaborator: this crate never computes
//!   planetary positions or renders SVGs itself
//! - Trait object (`Arc<dyn AstrologyEngine>`) at the seam so handlers and
//!   tests are independent of the backing implementation
//! - No retries; failures surface immediately

pub mod remote;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

pub use remote::RemoteEngine;
pub use types::{
    AspectsKind, AspectsSpec, ChartRender, ChartSpec, ChartType, EngineError, EngineResult,
    EphemerisSpec, RelationshipScore, SubjectSpec, GEOCODING_ERROR_MARKER,
};

/// Capability interface of the external astrology engine.
#[async_trait]
pub trait AstrologyEngine: Send + Sync {
    /// Compute the full astrological data for one subject.
    async fn compute_subject(&self, subject: &SubjectSpec) -> EngineResult<Value>;

    /// Render a chart SVG (natal, synastry, transit or composite) and return
    /// it together with the aspects drawn in it.
    async fn render_chart(&self, spec: &ChartSpec) -> EngineResult<ChartRender>;

    /// Compute an aspect list without rendering.
    async fn compute_aspects(&self, spec: &AspectsSpec) -> EngineResult<Vec<Value>>;

    /// Score the relationship between two subjects (Discepolo method).
    async fn relationship_score(
        &self,
        first: &SubjectSpec,
        second: &SubjectSpec,
    ) -> EngineResult<RelationshipScore>;

    /// Compute the midpoint composite subject of two subjects.
    async fn composite_subject(
        &self,
        first: &SubjectSpec,
        second: &SubjectSpec,
    ) -> EngineResult<Value>;

    /// Compute position snapshots over a date range.
    async fn ephemeris_range(&self, spec: &EphemerisSpec) -> EngineResult<Vec<Value>>;
}
