use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub duration: String,
    pub image: String,
    pub highlights: Vec<String>,
    pub rating: f64,
    pub category: String,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Package {
    pub fn new(request: CreatePackageRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: request.title,
            description: request.description,
            price: request.price,
            duration: request.duration,
            image: request.image,
            highlights: request.highlights,
            rating: request.rating,
            category: request.category,
            featured: request.featured,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePackageRequest {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub duration: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePackageRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub duration: Option<String>,
    pub image: Option<String>,
    pub highlights: Option<Vec<String>>,
    pub rating: Option<f64>,
    pub category: Option<String>,
    pub featured: Option<bool>,
}
