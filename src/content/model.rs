use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{html, skills::Skills};
use crate::error::ContentError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Experience,
    Project,
    Blog,
}

impl ContentKind {
    pub fn table(self) -> &'static str {
        match self {
            ContentKind::Experience => "experiences",
            ContentKind::Project => "projects",
            ContentKind::Blog => "blogs",
        }
    }

    /// Blog posts are ordered by publication date, never by hand.
    pub fn is_orderable(self) -> bool {
        !matches!(self, ContentKind::Blog)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentKind::Experience => "experience",
            ContentKind::Project => "project",
            ContentKind::Blog => "blog",
        })
    }
}

/// Whether a draft is about to create a row or replace an existing one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Create,
    Update,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub id: i64,
    pub display_order: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience {
    pub id: i64,
    pub period: String,
    pub company: String,
    pub job_title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceDraft {
    pub period: String,
    pub company: String,
    pub job_title: String,
    pub description: Option<String>,
    pub link: Option<String>,
    pub display_order: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: String,
    pub skills: Skills,
    pub github: Option<String>,
    pub live: Option<String>,
    pub display_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    /// Required on create. On update an absent image keeps the stored one.
    pub image: Option<String>,
    pub skills: Skills,
    pub github: Option<String>,
    pub live: Option<String>,
    pub display_order: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogPost {
    pub id: i64,
    pub title: String,
    pub excerpt: Option<String>,
    /// Sanitized HTML fragment.
    pub content: String,
    pub image: Option<String>,
    pub author: Option<String>,
    pub read_time: Option<String>,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    /// The author-supplied reading time, or one derived from the body length.
    pub fn reading_time(&self) -> String {
        match self.read_time.as_deref() {
            Some(custom) => custom.to_string(),
            None => format!("{} min read", html::reading_minutes(&self.content)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogDraft {
    pub title: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub image: Option<String>,
    pub author: Option<String>,
    pub read_time: Option<String>,
}

impl ExperienceDraft {
    pub fn validate(self, _intent: Intent) -> Result<Self, ContentError> {
        Ok(Self {
            period: required("period", self.period)?,
            company: required("company", self.company)?,
            job_title: required("job_title", self.job_title)?,
            description: optional(self.description),
            link: optional(self.link),
            display_order: self.display_order,
        })
    }
}

impl ProjectDraft {
    pub fn validate(self, intent: Intent) -> Result<Self, ContentError> {
        let title = required("title", self.title)?;
        let description = required("description", self.description)?;
        if self.skills.is_empty() {
            return Err(ContentError::validation(
                "skills",
                "at least one skill is required",
            ));
        }
        let image = optional(self.image);
        if intent == Intent::Create && image.is_none() {
            return Err(ContentError::validation("image", "image is required"));
        }
        Ok(Self {
            title,
            description,
            image,
            skills: self.skills,
            github: optional(self.github),
            live: optional(self.live),
            display_order: self.display_order,
        })
    }
}

impl BlogDraft {
    pub fn validate(self, _intent: Intent) -> Result<Self, ContentError> {
        let title = required("title", self.title)?;
        let content = required("content", html::sanitize(&self.content))?;
        Ok(Self {
            title,
            excerpt: optional(self.excerpt),
            content,
            image: optional(self.image),
            author: optional(self.author),
            read_time: optional(self.read_time),
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, ContentError> {
    if value.trim().is_empty() {
        return Err(ContentError::validation(
            field,
            format!("{field} is required"),
        ));
    }
    Ok(value)
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_draft() -> ProjectDraft {
        ProjectDraft {
            title: "Traffic Signal Optimization".into(),
            description: "Reinforcement learning for signal control".into(),
            image: Some("/placeholder.svg".into()),
            skills: Skills::parse("Python, RL"),
            github: Some("  ".into()),
            live: None,
            display_order: None,
        }
    }

    #[test]
    fn experience_requires_period_company_and_title() {
        let draft = ExperienceDraft {
            period: "2023 - Present".into(),
            company: " ".into(),
            job_title: "Developer".into(),
            ..Default::default()
        };
        let err = draft.validate(Intent::Create).unwrap_err();
        assert!(matches!(
            err,
            ContentError::Validation {
                field: "company",
                ..
            }
        ));
    }

    #[test]
    fn project_validation_blanks_optional_links() {
        let draft = project_draft().validate(Intent::Create).unwrap();
        assert_eq!(draft.github, None);
        assert_eq!(draft.image.as_deref(), Some("/placeholder.svg"));
    }

    #[test]
    fn project_image_required_only_on_create() {
        let draft = ProjectDraft {
            image: None,
            ..project_draft()
        };
        let err = draft.clone().validate(Intent::Create).unwrap_err();
        assert!(matches!(err, ContentError::Validation { field: "image", .. }));
        assert!(draft.validate(Intent::Update).is_ok());
    }

    #[test]
    fn project_requires_skills() {
        let draft = ProjectDraft {
            skills: Skills::parse(" , "),
            ..project_draft()
        };
        let err = draft.validate(Intent::Create).unwrap_err();
        assert!(matches!(err, ContentError::Validation { field: "skills", .. }));
    }

    #[test]
    fn blog_content_must_survive_sanitizing() {
        let draft = BlogDraft {
            title: "Hello".into(),
            content: "<script>alert(1)</script>".into(),
            ..Default::default()
        };
        let err = draft.validate(Intent::Create).unwrap_err();
        assert!(matches!(err, ContentError::Validation { field: "content", .. }));
    }

    #[test]
    fn blog_reading_time_prefers_custom_value() {
        let now = Utc::now();
        let mut post = BlogPost {
            id: 1,
            title: "t".into(),
            excerpt: None,
            content: format!("<p>{}</p>", vec!["w"; 450].join(" ")),
            image: None,
            author: None,
            read_time: None,
            published_at: now,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(post.reading_time(), "3 min read");
        post.read_time = Some("10 min read".into());
        assert_eq!(post.reading_time(), "10 min read");
    }

    #[test]
    fn project_draft_accepts_joined_skills() {
        let draft: ProjectDraft = serde_json::from_str(
            r#"{"title":"X","description":"d","image":"/i.png","skills":"A, B"}"#,
        )
        .unwrap();
        assert_eq!(draft.skills.as_slice(), ["A", "B"]);
    }
}
