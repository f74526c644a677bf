use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::catalog::{Accent, Catalog, Gender, Voice};

#[derive(Debug, Deserialize)]
pub struct VoicesQuery {
    pub gender: Option<Gender>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceResponse {
    pub id: String,
    pub display_name: String,
    pub gender: Gender,
    pub gender_label: String,
    pub style_label: String,
    pub default: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccentResponse {
    pub id: String,
    pub label: String,
    pub default: bool,
}

pub struct CatalogController {
    catalog: Arc<Catalog>,
}

impl CatalogController {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// GET /api/voices[?gender=female|male]
    pub async fn list_voices(
        State(controller): State<Arc<CatalogController>>,
        Query(query): Query<VoicesQuery>,
    ) -> Json<Vec<VoiceResponse>> {
        let catalog = &controller.catalog;
        let default_id = &catalog.default_voice().id;

        let voices: Vec<&Voice> = match query.gender {
            Some(gender) => catalog.voices_by_gender(gender).collect(),
            None => catalog.voices().iter().collect(),
        };

        Json(
            voices
                .into_iter()
                .map(|v| VoiceResponse {
                    id: v.id.clone(),
                    display_name: v.display_name.clone(),
                    gender: v.gender,
                    gender_label: v.gender.label().to_string(),
                    style_label: v.style.label().to_string(),
                    default: &v.id == default_id,
                })
                .collect(),
        )
    }

    /// GET /api/accents
    pub async fn list_accents(
        State(controller): State<Arc<CatalogController>>,
    ) -> Json<Vec<AccentResponse>> {
        let default_id = &controller.catalog.default_accent().id;

        Json(
            controller
                .catalog
                .accents()
                .iter()
                .map(|a: &Accent| AccentResponse {
                    id: a.id.clone(),
                    label: a.label.clone(),
                    default: &a.id == default_id,
                })
                .collect(),
        )
    }
}
