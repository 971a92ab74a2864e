//! Shared fixtures for pipeline integration tests: a scripted model
//! provider, fault-injecting sinks, and report/upload builders.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use solescan::provider::{InferenceRequest, ModelProvider, ProviderError};
use solescan::storage::{BlobRef, BlobSink, FsBlobStore, StorageError};
use solescan::views::{View, ViewImage};

/// Provider that replays a fixed sequence of results and records what
/// it was asked.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<String, ProviderError>>>,
    requests: Mutex<Vec<InferenceRequest>>,
    calls: AtomicU32,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
        }
    }

    /// Provider that answers every call with the same text.
    pub fn always(response: &str) -> Self {
        Self::new((0..8).map(|_| Ok(response.to_string())).collect())
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<InferenceRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn generate(&self, request: &InferenceRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("provider called more times than scripted")
    }

    fn model_version(&self) -> &str {
        "scripted-model"
    }
}

/// Blob sink that fails writes for selected views and delegates the
/// rest to a real filesystem store.
pub struct FlakyBlobSink {
    inner: FsBlobStore,
    fail_views: HashSet<View>,
}

impl FlakyBlobSink {
    pub fn new(inner: FsBlobStore, fail_views: impl IntoIterator<Item = View>) -> Self {
        Self {
            inner,
            fail_views: fail_views.into_iter().collect(),
        }
    }
}

#[async_trait]
impl BlobSink for FlakyBlobSink {
    async fn put_view(
        &self,
        run_id: &str,
        view: View,
        image: &ViewImage,
    ) -> Result<BlobRef, StorageError> {
        if self.fail_views.contains(&view) {
            return Err(StorageError::WriteBlob {
                path: format!("uploads/{}/{}", run_id, view.label()).into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "injected failure"),
            });
        }
        self.inner.put_view(run_id, view, image).await
    }
}

pub fn transient_503() -> ProviderError {
    ProviderError::Status {
        status: 503,
        message: "The model is overloaded".into(),
    }
}

pub fn transient_429() -> ProviderError {
    ProviderError::Status {
        status: 429,
        message: "Resource has been exhausted".into(),
    }
}

pub fn fatal_401() -> ProviderError {
    ProviderError::Status {
        status: 401,
        message: "API key not valid".into(),
    }
}

/// A contract-valid report document whose audit lists exactly the given
/// received views; the rest are listed as missing.
pub fn report_json(received: &[View]) -> String {
    let missing: Vec<View> = View::ALL
        .into_iter()
        .filter(|v| !received.contains(v))
        .collect();

    json!({
        "analysis_audit": {
            "is_complete_scan": missing.is_empty(),
            "received_views": received,
            "missing_views": missing,
            "limitations_summary": if missing.is_empty() {
                "Full scan; no limitations.".to_string()
            } else {
                format!("{} view(s) unavailable.", missing.len())
            }
        },
        "shoe_info": {
            "detected_brand_model": "Pegasus 40",
            "category": "ROAD",
            "confidence_score": 82.0
        },
        "component_health": {
            "outsole": {
                "condition_score": 58.0,
                "wear_pattern": "HEEL_STRIKE",
                "technical_observation": "Lateral heel rubber worn flat."
            },
            "midsole": {
                "life_remaining_percentage": 45.0,
                "compression_status": "SURFACE_WRINKLES",
                "medial_vs_lateral_variance": "BALANCED",
                "technical_observation": "Even wrinkling across the foam."
            },
            "upper": {
                "status": "GOOD",
                "observation": "No tears or holes."
            }
        },
        "biomechanics": {
            "foot_strike_detected": "HEEL",
            "pronation_assessment": "NEUTRAL",
            "injury_risk_factors": ["Reduced heel cushioning"]
        },
        "verdict": {
            "status_code": "YELLOW",
            "display_title": "Monitor Wear",
            "estimated_km_left": "200-350 km",
            "final_prescription": "Replace within two months at current mileage."
        }
    })
    .to_string()
}

/// An upload map carrying a small JPEG payload for each given view.
pub fn uploads(views: &[View]) -> HashMap<View, ViewImage> {
    views
        .iter()
        .map(|view| {
            (
                *view,
                ViewImage::new(
                    format!("jpeg-bytes-{}", view.label()).into_bytes(),
                    "image/jpeg",
                ),
            )
        })
        .collect()
}
