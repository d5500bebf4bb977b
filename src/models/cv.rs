use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::{EducationEntry, ExperienceEntry};

pub const DEFAULT_CV_TITLE: &str = "My CV";

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema,
)]
#[sqlx(type_name = "cv_template", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CvTemplate {
    #[default]
    Classic,
    Modern,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CvLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CvProject {
    pub name: String,
    pub description: String,
    pub link: String,
}

/// CvData
///
/// The free-form CV document, stored as JSONB. Unknown keys are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CvData {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub links: Vec<CvLink>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<CvProject>,
}

/// Cv
///
/// A job seeker's CV from the `cvs` table. At most one per owner has `is_default` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Cv {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub template: CvTemplate,
    #[sqlx(json)]
    pub data: CvData,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cv {
    pub fn new(user_id: Uuid, input: CvInput, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: input.title_or_default(),
            template: input.template.unwrap_or_default(),
            data: input.data.unwrap_or_default(),
            is_default: input.is_default.unwrap_or(false),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, input: CvInput, now: DateTime<Utc>) {
        if let Some(title) = input.title_update() {
            self.title = title;
        }
        if let Some(template) = input.template {
            self.template = template;
        }
        if let Some(data) = input.data {
            self.data = data;
        }
        if let Some(is_default) = input.is_default {
            self.is_default = is_default;
        }
        self.updated_at = now;
    }
}

/// CvInput
///
/// Body of POST /api/cv and PUT /api/cv/{id}. On update, absent fields are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct CvInput {
    pub title: Option<String>,
    pub template: Option<CvTemplate>,
    pub data: Option<CvData>,
    pub is_default: Option<bool>,
}

impl CvInput {
    fn title_or_default(&self) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_CV_TITLE)
            .to_string()
    }

    /// New title for an update, `None` when the title is left as is.
    pub fn title_update(&self) -> Option<String> {
        self.title.as_ref().map(|_| self.title_or_default())
    }

    pub fn wants_default(&self) -> bool {
        self.is_default == Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_falls_back() {
        let cv = Cv::new(
            Uuid::new_v4(),
            CvInput {
                title: Some("   ".into()),
                ..Default::default()
            },
            Utc::now(),
        );
        assert_eq!(cv.title, DEFAULT_CV_TITLE);
        assert_eq!(cv.template, CvTemplate::Classic);
        assert!(!cv.is_default);
    }

    #[test]
    fn cv_data_ignores_unknown_keys() {
        let data: CvData =
            serde_json::from_str(r#"{"fullName":"Ada","skills":["rust"],"color":"red"}"#).unwrap();
        assert_eq!(data.full_name, "Ada");
        assert_eq!(data.skills, vec!["rust".to_string()]);
    }
}
