use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::BookingError;
use crate::models::content::{ClinicInfo, FaqCategory, ServiceItem};

pub const ALL_CATEGORIES: &str = "All";

/// Static site content loaded from the JSON fixtures in `data/`
#[derive(Debug, Clone)]
pub struct ContentStore {
    pub clinic: ClinicInfo,
    pub services: Vec<ServiceItem>,
    pub faq: Vec<FaqCategory>,
}

fn load_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T, BookingError> {
    let path = dir.join(file);
    let raw = fs::read_to_string(&path)
        .map_err(|e| BookingError::Content(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| BookingError::Content(format!("{}: {}", path.display(), e)))
}

impl ContentStore {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, BookingError> {
        let dir = dir.as_ref();

        let store = Self {
            clinic: load_json(dir, "clinic-info.json")?,
            services: load_json(dir, "services.json")?,
            faq: load_json(dir, "faq.json")?,
        };

        info!(
            "Loaded {} services and {} FAQ categories from {}",
            store.services.len(),
            store.faq.len(),
            dir.display()
        );

        Ok(store)
    }

    pub fn has_service_named(&self, name: &str) -> bool {
        self.services.iter().any(|s| s.name == name)
    }
}

/// "All" followed by each distinct category in first-seen order
pub fn service_categories(services: &[ServiceItem]) -> Vec<String> {
    let mut categories = vec![ALL_CATEGORIES.to_string()];
    for service in services {
        if !categories.contains(&service.category) {
            categories.push(service.category.clone());
        }
    }
    categories
}

pub fn services_in_category<'a>(
    services: &'a [ServiceItem],
    category: Option<&str>,
) -> Vec<&'a ServiceItem> {
    match category {
        None => services.iter().collect(),
        Some(c) if c.eq_ignore_ascii_case(ALL_CATEGORIES) => services.iter().collect(),
        Some(c) => services.iter().filter(|s| s.category == c).collect(),
    }
}

/// Case-insensitive substring search over questions and answers.
/// Categories with no matching question are dropped.
pub fn search_faq(faq: &[FaqCategory], query: &str) -> Vec<FaqCategory> {
    let needle = query.to_lowercase();

    faq.iter()
        .map(|category| FaqCategory {
            category: category.category.clone(),
            questions: category
                .questions
                .iter()
                .filter(|q| {
                    q.question.to_lowercase().contains(&needle)
                        || q.answer.to_lowercase().contains(&needle)
                })
                .cloned()
                .collect(),
        })
        .filter(|category| !category.questions.is_empty())
        .collect()
}
