//! Wire-facing data shapes.
//!
//! # Data Flow
//! ```text
//! JSON body
//!     → request.rs (shape only, via serde)
//!     → validation (ranges + cross-field rules)
//!     → engine::types::SubjectSpec (resolved, engine-ready)
//! ```

pub mod request;

pub use request::{
    ActiveAspect, BirthChartRequest, BirthDataRequest, BirthFields, ChartOptions, CityQuery,
    EphemerisDataRequest, NatalAspectsRequest, PairAspectsRequest, PairChartRequest,
    RelationshipScoreRequest, SubjectPayload, TransitChartRequest, TransitSubjectPayload,
};
