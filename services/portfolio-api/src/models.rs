// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Data models for contact submissions, projects and skills.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Contact form body as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// Stored contact submission.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// Tagged by the spam classifier; never blocks storage
    pub is_spam: bool,
    /// Set by an admin
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    /// Originating network address (empty when unknown)
    pub source_addr: String,
}

/// Accepted contact submission response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactReceipt {
    pub id: i64,
    pub message: String,
}

/// Filters for listing submissions.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ContactFilter {
    #[serde(default)]
    pub unread_only: bool,
    #[serde(default)]
    pub spam: Option<bool>,
}

/// Read flag update.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadUpdate {
    #[serde(default = "default_read")]
    pub is_read: bool,
}

fn default_read() -> bool {
    true
}

/// New portfolio project.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub repo_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

/// Stored portfolio project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

/// Project row; `tech_stack` is stored as a JSON array.
#[derive(Debug, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tech_stack: String,
    pub repo_url: Option<String>,
    pub live_url: Option<String>,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
}

/// Encode technology tags for the `tech_stack` column.
pub fn encode_tech_stack(tags: &[String]) -> serde_json::Result<String> {
    let tags: Vec<&str> = tags.iter().map(|t| t.trim()).collect();
    serde_json::to_string(&tags)
}

impl TryFrom<ProjectRow> for Project {
    type Error = serde_json::Error;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        let tech_stack = if row.tech_stack.is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&row.tech_stack)?
        };

        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            tech_stack,
            repo_url: row.repo_url,
            live_url: row.live_url,
            featured: row.featured,
            created_at: row.created_at,
        })
    }
}

/// Filters for listing projects.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProjectFilter {
    #[serde(default)]
    pub featured: bool,
}

/// New skill.
#[derive(Debug, Clone, Deserialize)]
pub struct NewSkill {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub proficiency: u8,
}

/// Stored skill.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub proficiency: i64,
}

/// Skills sharing a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGroup {
    pub category: String,
    pub skills: Vec<Skill>,
}

/// Filters for listing skills.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SkillFilter {
    #[serde(default)]
    pub grouped: bool,
}

/// Group skills by category, keeping the incoming order within a group.
pub fn group_skills(skills: Vec<Skill>) -> Vec<SkillGroup> {
    let mut groups: Vec<SkillGroup> = Vec::new();
    for skill in skills {
        match groups.iter_mut().find(|g| g.category == skill.category) {
            Some(group) => group.skills.push(skill),
            None => groups.push(SkillGroup {
                category: skill.category.clone(),
                skills: vec![skill],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_row(tech_stack: String) -> ProjectRow {
        ProjectRow {
            id: 1,
            title: "Site".to_string(),
            description: "Portfolio".to_string(),
            tech_stack,
            repo_url: None,
            live_url: None,
            featured: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_tech_stack_keeps_commas_inside_tags() {
        let tags = vec![" Node.js, Express".to_string(), "sqlite".to_string()];
        let row = project_row(encode_tech_stack(&tags).unwrap());
        let project = Project::try_from(row).unwrap();
        assert_eq!(project.tech_stack, vec!["Node.js, Express", "sqlite"]);
    }

    #[test]
    fn test_empty_tech_stack_column() {
        let project = Project::try_from(project_row(String::new())).unwrap();
        assert!(project.tech_stack.is_empty());
        assert!(Project::try_from(project_row("rust,axum".to_string())).is_err());
    }

    #[test]
    fn test_group_skills() {
        let skill = |id, name: &str, category: &str| Skill {
            id,
            name: name.to_string(),
            category: category.to_string(),
            proficiency: 50,
        };
        let groups = group_skills(vec![
            skill(1, "Rust", "Languages"),
            skill(2, "Docker", "Tooling"),
            skill(3, "Python", "Languages"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "Languages");
        assert_eq!(groups[0].skills.len(), 2);
        assert_eq!(groups[1].skills[0].name, "Docker");
    }
}
