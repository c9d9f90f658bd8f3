use serde::Deserialize;

// Query parameters for the service catalog
#[derive(Debug, Default, Deserialize)]
pub struct CategoryParams {
    #[serde(default)]
    pub category: Option<String>,
}

// Query parameters for the FAQ search
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

// Body for a single field update
#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    pub value: String,
}
