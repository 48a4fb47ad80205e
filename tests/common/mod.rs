//! Shared test harness: a scripted stub engine, state builders and request
//! helpers for driving the router without binding a socket.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use astro_gateway::config::Settings;
use astro_gateway::engine::{
    AspectsSpec, AstrologyEngine, ChartRender, ChartSpec, EngineError, EngineResult,
    EphemerisSpec, RelationshipScore, SubjectSpec,
};
use astro_gateway::geonames::GeonamesClient;
use astro_gateway::{build_router, AppState};

pub const TEST_SECRET_HEADER: &str = "X-Proxy-Secret";
pub const TEST_SECRET: &str = "test-secret";

/// How the stub engine should respond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StubFailure {
    #[default]
    None,
    Geocoding,
    Rejected,
    Upstream,
}

/// A scripted engine that records every call it receives.
#[derive(Default)]
pub struct StubEngine {
    pub failure: StubFailure,
    pub subject_calls: AtomicUsize,
    pub chart_calls: AtomicUsize,
    pub aspect_calls: AtomicUsize,
    pub score_calls: AtomicUsize,
    pub composite_calls: AtomicUsize,
    pub ephemeris_calls: AtomicUsize,
    pub captured_subjects: Mutex<Vec<SubjectSpec>>,
    pub captured_charts: Mutex<Vec<ChartSpec>>,
    pub captured_aspects: Mutex<Vec<AspectsSpec>>,
    pub captured_ephemeris: Mutex<Vec<EphemerisSpec>>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_with(failure: StubFailure) -> Self {
        Self {
            failure,
            ..Self::default()
        }
    }

    fn check_failure(&self) -> EngineResult<()> {
        match self.failure {
            StubFailure::None => Ok(()),
            StubFailure::Geocoding => Err(EngineError::NoGeocodingData),
            StubFailure::Rejected => Err(EngineError::Rejected("rejected by engine".to_string())),
            StubFailure::Upstream => Err(EngineError::Upstream("engine exploded".to_string())),
        }
    }

    /// Calls across every trait method; zero means nothing reached the
    /// engine.
    pub fn total_calls(&self) -> usize {
        self.subject_calls.load(Ordering::SeqCst)
            + self.chart_calls.load(Ordering::SeqCst)
            + self.aspect_calls.load(Ordering::SeqCst)
            + self.score_calls.load(Ordering::SeqCst)
            + self.composite_calls.load(Ordering::SeqCst)
            + self.ephemeris_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AstrologyEngine for StubEngine {
    async fn compute_subject(&self, subject: &SubjectSpec) -> EngineResult<Value> {
        self.subject_calls.fetch_add(1, Ordering::SeqCst);
        self.captured_subjects.lock().unwrap().push(subject.clone());
        self.check_failure()?;
        Ok(json!({"name": subject.name, "sun": {"sign": "Ari"}}))
    }

    async fn render_chart(&self, spec: &ChartSpec) -> EngineResult<ChartRender> {
        self.chart_calls.fetch_add(1, Ordering::SeqCst);
        self.captured_charts.lock().unwrap().push(spec.clone());
        self.check_failure()?;
        Ok(ChartRender {
            svg: "<svg/>".to_string(),
            aspects: vec![json!({"p1_name": "Sun", "p2_name": "Moon", "aspect": "trine"})],
        })
    }

    async fn compute_aspects(&self, spec: &AspectsSpec) -> EngineResult<Vec<Value>> {
        self.aspect_calls.fetch_add(1, Ordering::SeqCst);
        self.captured_aspects.lock().unwrap().push(spec.clone());
        self.check_failure()?;
        Ok(vec![json!({"p1_name": "Sun", "p2_name": "Moon", "aspect": "trine"})])
    }

    async fn relationship_score(
        &self,
        _first: &SubjectSpec,
        _second: &SubjectSpec,
    ) -> EngineResult<RelationshipScore> {
        self.score_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(RelationshipScore {
            score: 24.0,
            score_description: "Exceptional relationship".to_string(),
            is_destiny_sign: false,
            aspects: vec![json!({"p1_name": "Sun", "p2_name": "Sun", "aspect": "conjunction"})],
        })
    }

    async fn composite_subject(
        &self,
        first: &SubjectSpec,
        second: &SubjectSpec,
    ) -> EngineResult<Value> {
        self.composite_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        Ok(json!({
            "name": format!("{} and {} Composite", first.name, second.name),
            "first_subject": {"name": first.name},
            "second_subject": {"name": second.name},
        }))
    }

    async fn ephemeris_range(&self, spec: &EphemerisSpec) -> EngineResult<Vec<Value>> {
        self.ephemeris_calls.fetch_add(1, Ordering::SeqCst);
        self.captured_ephemeris.lock().unwrap().push(spec.clone());
        self.check_failure()?;
        Ok(vec![json!({"date": "2023-01-01T00:00:00", "planets": []})])
    }
}

/// Settings with the gate enabled, pointing all collaborators at
/// unroutable addresses (the stub engine intercepts before any IO).
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.general.environment = "test".to_string();
    settings.gate.header_name = TEST_SECRET_HEADER.to_string();
    settings.gate.secret_keys = vec![TEST_SECRET.to_string()];
    settings.geonames.username = "test".to_string();
    settings.geonames.base_url = "http://127.0.0.1:9".to_string();
    settings.engine.base_url = "http://127.0.0.1:9".to_string();
    settings
}

/// Build a router around the given stub engine and settings.
pub fn router_with(settings: Settings, engine: Arc<StubEngine>) -> Router {
    let http = reqwest::Client::new();
    let geonames = GeonamesClient::new(http.clone(), &settings.geonames);
    build_router(AppState::new(Arc::new(settings), engine, geonames, http))
}

/// Build a router with default test settings and a fresh stub engine.
pub fn test_router() -> (Router, Arc<StubEngine>) {
    let engine = Arc::new(StubEngine::new());
    (router_with(test_settings(), engine.clone()), engine)
}

/// Fire one request at the router and decode the JSON response.
pub async fn send_json(
    router: &Router,
    method: &str,
    path: &str,
    secret: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(secret) = secret {
        builder = builder.header(TEST_SECRET_HEADER, secret);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// A subject payload with explicit coordinates.
pub fn explicit_subject(name: &str) -> Value {
    json!({
        "name": name,
        "year": 1980, "month": 12, "day": 12,
        "hour": 12, "minute": 12,
        "city": "London", "nation": "GB",
        "latitude": 51.4825766, "longitude": -0.0076589,
        "timezone": "Europe/London"
    })
}

/// A subject payload relying on geocoding resolution.
pub fn online_subject(name: &str) -> Value {
    json!({
        "name": name,
        "year": 1993, "month": 6, "day": 10,
        "hour": 12, "minute": 15,
        "city": "Roma", "nation": "IT",
        "geonames_username": "demo"
    })
}
