use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateUrlPayload {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUrlPayload {
    pub id: String,
    pub old_url: String,
    pub new_url: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteUrlPayload {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUrlResponse {
    pub id: String,
    pub shortened_url: String,
}

#[derive(Debug, Serialize)]
pub struct UpdateUrlResponse {
    pub id: String,
    pub shortened_url: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DeleteUrlResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
