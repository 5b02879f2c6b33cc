use std::sync::Arc;

use anyhow::{Context, Result};

use crate::content::{Experience, ExperienceDraft, Project, ProjectDraft, Repository, Skills};
use crate::storage::Storage;

const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

pub async fn run<S>(storage: Arc<S>) -> Result<()>
where
    S: Storage + Send + Sync + 'static,
{
    let experiences = Repository::<S, Experience>::new(storage.clone());
    if experiences.count().await? == 0 {
        for draft in sample_experiences() {
            experiences.create(draft).await.context("seeding experiences")?;
        }
    } else {
        log::info!("experiences already present, skipping");
    }

    let projects = Repository::<S, Project>::new(storage);
    if projects.count().await? == 0 {
        for draft in sample_projects() {
            projects.create(draft).await.context("seeding projects")?;
        }
    } else {
        log::info!("projects already present, skipping");
    }

    log::info!("🌱 seed complete");
    Ok(())
}

fn experience(
    order: i64,
    period: &str,
    company: &str,
    title: &str,
    desc: &str,
    link: &str,
) -> ExperienceDraft {
    ExperienceDraft {
        period: period.into(),
        company: company.into(),
        job_title: title.into(),
        description: Some(desc.into()),
        link: Some(link.into()),
        display_order: Some(order),
    }
}

pub fn sample_experiences() -> Vec<ExperienceDraft> {
    vec![
        experience(
            0,
            "2023 - Present",
            "Tech Solutions Inc.",
            "Full Stack Developer",
            "Developed web applications using React, Node.js, and SQLite. Implemented responsive designs and RESTful APIs.",
            "https://techsolutions.com",
        ),
        experience(
            1,
            "2022 - 2023",
            "Digital Innovations",
            "Frontend Developer",
            "Built user interfaces with modern JavaScript frameworks. Collaborated with design teams to create intuitive user experiences.",
            "https://digitalinnovations.com",
        ),
        experience(
            2,
            "2021 - 2022",
            "Startup Ventures",
            "Junior Developer",
            "Assisted in developing web applications and learning industry best practices.",
            "https://startupventures.com",
        ),
    ]
}

pub fn sample_projects() -> Vec<ProjectDraft> {
    vec![
        ProjectDraft {
            title: "BiteWise AI Nutrition Assistant".into(),
            description: "A Telegram-based AI nutrition assistant with calorie tracking, food recognition from photos and hydration reminders.".into(),
            image: Some(PLACEHOLDER_IMAGE.into()),
            skills: Skills::parse("Python,AI/ML,Telegram Bot API,Computer Vision,NLP"),
            github: Some("https://github.com/bitewise".into()),
            live: Some("https://t.me/BiteWiseBot".into()),
            display_order: Some(0),
        },
        ProjectDraft {
            title: "Traffic Signal Optimization".into(),
            description: "Reinforcement learning applied to real-time traffic signal control.".into(),
            image: Some(PLACEHOLDER_IMAGE.into()),
            skills: Skills::parse("Python,Reinforcement Learning,Data Analysis,Machine Learning"),
            github: None,
            live: None,
            display_order: Some(1),
        },
        ProjectDraft {
            title: "Web Development Projects".into(),
            description: "Responsive web applications built with TypeScript and React.".into(),
            image: Some(PLACEHOLDER_IMAGE.into()),
            skills: Skills::parse("JavaScript,TypeScript,React,CSS,Responsive Design"),
            github: None,
            live: Some("https://unlockadmissions.com".into()),
            display_order: Some(2),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentKind;
    use crate::storage::{MemoryStorage, StorageRead};

    #[tokio::test]
    async fn seed_fills_empty_collections_once() {
        let storage = Arc::new(MemoryStorage::new());
        run(storage.clone()).await.unwrap();
        run(storage.clone()).await.unwrap();

        assert_eq!(storage.count(ContentKind::Experience).unwrap(), 3);
        assert_eq!(storage.count(ContentKind::Project).unwrap(), 3);
        let projects = storage.list_projects().unwrap();
        assert_eq!(projects[0].title, "BiteWise AI Nutrition Assistant");
        assert_eq!(projects[0].skills.len(), 5);
    }

    #[test]
    fn samples_pass_validation() {
        use crate::content::Intent;
        for draft in sample_experiences() {
            draft.validate(Intent::Create).unwrap();
        }
        for draft in sample_projects() {
            draft.validate(Intent::Create).unwrap();
        }
    }
}
