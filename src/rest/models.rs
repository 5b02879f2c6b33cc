use serde::{Deserialize, Serialize};

use crate::content::BlogPost;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
}

#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Serialize, Deserialize)]
pub struct ReorderRequest {
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct BlogResponse {
    #[serde(flatten)]
    pub post: BlogPost,
    pub reading_time: String,
}

impl From<BlogPost> for BlogResponse {
    fn from(post: BlogPost) -> Self {
        Self {
            reading_time: post.reading_time(),
            post,
        }
    }
}
