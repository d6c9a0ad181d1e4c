//! Preset templates and job descriptions.
//!
//! Two lookup tables, each holding one built-in default plus whatever the
//! content directories provide. Keys are display names derived from
//! filenames; a discovered file that collides with a built-in key wins.

pub mod loader;

use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;

pub const DEFAULT_TEMPLATE_KEY: &str = "Default Modern Template";
pub const DEFAULT_DESCRIPTION_KEY: &str = "Senior Software Engineer (Backend)";

pub const DEFAULT_JOB_AD_TEMPLATE: &str = r#"**Job Title:** [Insert Job Title Here]
**Company:** [Your Company Name]
**Location:** [Location - e.g., Remote, City, State]

**About Us:**
[Provide a brief, engaging description of your company culture, mission, and values. What makes your company a great place to work?]

**Job Summary:**
[Briefly (2-3 sentences) describe the main purpose and essence of this role. What will this person achieve?]

**Key Responsibilities:**
*   [Responsibility 1: Action-oriented, e.g., "Develop and maintain..."]
*   [Responsibility 2: Be specific]
*   [Responsibility 3]

**Qualifications & Skills:**
*   **Required:**
    *   [Qualification 1: e.g., Bachelor's degree in Computer Science or equivalent experience]
    *   [Skill 1: e.g., X+ years of experience in Y technology]
    *   [Skill 2: e.g., Proficiency in Z software/language]
*   **Preferred (Bonus Points):**
    *   [Optional Skill 1: e.g., Experience with A]
    *   [Optional Certification: e.g., Certification B]

**Why Join Us? (Benefits & Perks):**
*   [Benefit 1: e.g., Competitive salary and comprehensive benefits package (health, dental, vision)]
*   [Benefit 2: e.g., Opportunities for professional growth and development]
*   [Benefit 3: e.g., Flexible work arrangements / Remote options]
*   [Benefit 4: e.g., A collaborative, innovative, and inclusive work environment]

**How to Apply:**
[Clear instructions on how to apply. e.g., "Interested candidates are invited to submit their resume and a cover letter outlining their suitability for the role to [email_address] / via our careers page: [Link]"]

**Equal Opportunity Employer Statement:**
[Your Company Name] is an equal opportunity employer. We celebrate diversity and are committed to creating an inclusive environment for all employees."#;

pub const DEFAULT_JOB_DESCRIPTION: &str = r#"Role: Senior Software Engineer (Backend Focus)
Team: Core Platform Engineering
Reports to: Engineering Manager

We are seeking a highly skilled Senior Software Engineer to join our innovative Core Platform team.
This individual will play a key role in designing, developing, and deploying robust and scalable backend systems that power our flagship products.
The ideal candidate is passionate about building high-performance services, enjoys tackling complex technical challenges, and thrives in a collaborative, fast-paced environment.

Primary Responsibilities:
- Architect and implement new microservices and APIs.
- Optimize existing backend systems for performance, scalability, and reliability.
- Collaborate with frontend developers, product managers, and other stakeholders to deliver new features.
- Write clean, maintainable, and well-tested code (Python, Go).
- Mentor junior engineers and contribute to best practices within the team.
- Participate in code reviews and design discussions.
- Troubleshoot and resolve production issues.

Required Qualifications:
- 5+ years of professional software development experience with a focus on backend systems.
- Strong proficiency in Python and/or Go.
- Extensive experience with designing and building RESTful APIs and microservices.
- Solid understanding of database technologies (e.g., PostgreSQL, MongoDB, Cassandra).
- Experience with cloud platforms (AWS, GCP, or Azure), including serverless and containerization (Docker, Kubernetes).
- Familiarity with message queues (e.g., Kafka, RabbitMQ) and caching mechanisms (e.g., Redis).
- Excellent problem-solving and analytical skills.
- Bachelor's degree in Computer Science or a related field, or equivalent practical experience.

Preferred Qualifications:
- Experience with gRPC.
- Knowledge of data streaming technologies.
- Contributions to open-source projects."#;

/// Read-only after startup; shared across all sessions.
#[derive(Debug, Clone)]
pub struct PresetLibrary {
    pub templates: BTreeMap<String, String>,
    pub descriptions: BTreeMap<String, String>,
}

impl PresetLibrary {
    /// Just the two built-in defaults, no directory scan.
    pub fn builtin() -> Self {
        let mut templates = BTreeMap::new();
        templates.insert(
            DEFAULT_TEMPLATE_KEY.to_string(),
            DEFAULT_JOB_AD_TEMPLATE.to_string(),
        );
        let mut descriptions = BTreeMap::new();
        descriptions.insert(
            DEFAULT_DESCRIPTION_KEY.to_string(),
            DEFAULT_JOB_DESCRIPTION.to_string(),
        );
        Self {
            templates,
            descriptions,
        }
    }

    /// Built-ins plus presets discovered in the content directories.
    /// A discovered key that collides with a built-in overrides it.
    pub fn load(templates_dir: &Path, descriptions_dir: &Path) -> Self {
        let mut library = Self::builtin();
        library.templates.extend(loader::scan_presets(templates_dir));
        library
            .descriptions
            .extend(loader::scan_presets(descriptions_dir));
        info!(
            "Preset library loaded: {} templates, {} descriptions",
            library.templates.len(),
            library.descriptions.len()
        );
        library
    }

    pub fn default_template(&self) -> &str {
        self.templates
            .get(DEFAULT_TEMPLATE_KEY)
            .map(String::as_str)
            .unwrap_or(DEFAULT_JOB_AD_TEMPLATE)
    }

    pub fn default_description(&self) -> &str {
        self.descriptions
            .get(DEFAULT_DESCRIPTION_KEY)
            .map(String::as_str)
            .unwrap_or(DEFAULT_JOB_DESCRIPTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_library_has_one_entry_per_table() {
        let lib = PresetLibrary::builtin();
        assert_eq!(lib.templates.len(), 1);
        assert_eq!(lib.descriptions.len(), 1);
        assert!(lib.default_template().contains("**Job Title:**"));
        assert!(lib.default_description().contains("Senior Software Engineer"));
    }

    #[test]
    fn test_load_merges_discovered_presets() {
        let templates = tempfile::tempdir().unwrap();
        let descriptions = tempfile::tempdir().unwrap();
        std::fs::write(
            templates.path().join("startup_template.txt"),
            "**Job Title:** [Role]\nMove fast.",
        )
        .unwrap();

        let lib = PresetLibrary::load(templates.path(), descriptions.path());
        assert_eq!(lib.templates.len(), 2);
        assert!(lib.templates.contains_key("Startup Template"));
        assert_eq!(lib.descriptions.len(), 1);
    }

    #[test]
    fn test_discovered_file_overrides_builtin_on_collision() {
        let templates = tempfile::tempdir().unwrap();
        let descriptions = tempfile::tempdir().unwrap();
        let mut f =
            std::fs::File::create(templates.path().join("default_modern_template.txt")).unwrap();
        f.write_all(b"overridden body").unwrap();

        let lib = PresetLibrary::load(templates.path(), descriptions.path());
        assert_eq!(lib.templates.len(), 1); // same key, last-loaded wins
        assert_eq!(lib.default_template(), "overridden body");
    }

    #[test]
    fn test_missing_directories_fall_back_to_builtins() {
        let lib = PresetLibrary::load(
            Path::new("/nonexistent/ad_templates"),
            Path::new("/nonexistent/jd_descriptions"),
        );
        assert_eq!(lib.templates.len(), 1);
        assert_eq!(lib.descriptions.len(), 1);
    }
}
