// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form and admin input validation.
//!
//! Contact rules:
//! - name: at least `min_name_len` characters, no digits
//! - email: syntactically valid address
//! - subject and message: non-empty, bounded length
//!
//! Every failing field is reported, not just the first.

use crate::config::ValidationConfig;
use crate::models::{NewContact, NewProject, NewSkill};
use email_address::EmailAddress;
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Validation failure for a request body.
#[derive(Debug, Clone, Error)]
#[error("Invalid input: {}", summary(.0))]
pub struct ValidationError(pub Vec<FieldError>);

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }
}

/// Collects field errors while validating one body.
#[derive(Default)]
struct Report(Vec<FieldError>);

impl Report {
    fn reject(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.0.is_empty() {
            Ok(value)
        } else {
            debug!(errors = %summary(&self.0), "Validation failed");
            Err(ValidationError(self.0))
        }
    }
}

/// Validator for inbound bodies.
#[derive(Debug, Clone)]
pub struct ContactValidator {
    config: ValidationConfig,
}

impl ContactValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a contact submission and return it with fields trimmed.
    pub fn validate(&self, contact: NewContact) -> Result<NewContact, ValidationError> {
        let contact = NewContact {
            name: contact.name.trim().to_string(),
            email: contact.email.trim().to_string(),
            subject: contact.subject.trim().to_string(),
            message: contact.message.trim().to_string(),
        };
        let mut report = Report::default();

        let name_len = contact.name.chars().count();
        if name_len < self.config.min_name_len {
            report.reject(
                "name",
                format!(
                    "Name must be at least {} characters long.",
                    self.config.min_name_len
                ),
            );
        } else if name_len > self.config.max_name_len {
            report.reject(
                "name",
                format!("Name must be at most {} characters long.", self.config.max_name_len),
            );
        } else if contact.name.chars().any(|c| c.is_ascii_digit()) {
            report.reject("name", "Name should not contain numbers.");
        }

        if !is_valid_email(&contact.email) {
            report.reject("email", "Please enter a valid email address.");
        }

        check_text(
            &mut report,
            "subject",
            "Subject",
            &contact.subject,
            self.config.max_subject_len,
        );
        check_text(
            &mut report,
            "message",
            "Message",
            &contact.message,
            self.config.max_message_len,
        );

        report.finish(contact)
    }

    /// Validate a new project.
    pub fn validate_project(&self, project: NewProject) -> Result<NewProject, ValidationError> {
        let mut report = Report::default();

        check_text(&mut report, "title", "Title", &project.title, 200);
        check_text(
            &mut report,
            "description",
            "Description",
            &project.description,
            self.config.max_message_len,
        );
        if let Some(url) = project.repo_url.as_deref() {
            if !is_http_url(url) {
                report.reject("repo_url", "Repository URL must be an http(s) URL.");
            }
        }
        if let Some(url) = project.live_url.as_deref() {
            if !is_http_url(url) {
                report.reject("live_url", "Live URL must be an http(s) URL.");
            }
        }
        if project.tech_stack.iter().any(|t| t.trim().is_empty()) {
            report.reject("tech_stack", "Technology tags cannot be empty.");
        }

        report.finish(project)
    }

    /// Validate a new skill.
    pub fn validate_skill(&self, skill: NewSkill) -> Result<NewSkill, ValidationError> {
        let mut report = Report::default();

        check_text(&mut report, "name", "Name", &skill.name, 100);
        check_text(&mut report, "category", "Category", &skill.category, 100);
        if skill.proficiency > 100 {
            report.reject("proficiency", "Proficiency must be between 0 and 100.");
        }

        report.finish(skill)
    }
}

fn check_text(report: &mut Report, field: &'static str, label: &str, value: &str, max: usize) {
    if value.trim().is_empty() {
        report.reject(field, format!("{label} cannot be empty."));
    } else if value.chars().count() > max {
        report.reject(field, format!("{label} must be at most {max} characters long."));
    }
}

/// Email check: RFC syntax via `email_address`, plus a dotted domain as the
/// contact form requires.
fn is_valid_email(email: &str) -> bool {
    match EmailAddress::from_str(email) {
        Ok(addr) => {
            let domain = addr.domain();
            domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        Err(_) => false,
    }
}

fn is_http_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}
