use std::{fmt, sync::Arc};

use actix_web::web;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::store::ActivityStore;

// Store Types

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Generate,
    Decode,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Generate => "generate",
            ActivityKind::Decode => "decode",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One logged generate or decode operation. Only the store builds these.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: u64,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

// JSON Types

#[derive(Deserialize)]
pub struct GenerateQr {
    pub url: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQr {
    pub qr_code_data_url: String,
}

#[derive(Serialize, Deserialize)]
pub struct DecodedQr {
    pub url: String,
}

// Server Types

#[derive(Serialize, Deserialize)]
pub struct Success {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct Failure {
    pub message: String,
}

pub struct AppState {
    pub store: Arc<dyn ActivityStore>,
    pub max_upload_bytes: usize,
}

pub type AppData = web::Data<AppState>;
