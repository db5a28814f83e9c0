//! The catalogue of content documents served under `/api/data/` and `/api/save/`.

use std::fmt;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::validation;

/// Top-level JSON shape a section document must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Array,
    Object,
    /// The thesis may be a single record or a list of them.
    ObjectOrArray,
}

impl Shape {
    /// True when `value` has this shape.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Shape::Array => value.is_array(),
            Shape::Object => value.is_object(),
            Shape::ObjectOrArray => value.is_array() || value.is_object(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Shape::Array => "JSON array",
            Shape::Object => "JSON object",
            Shape::ObjectOrArray => "JSON object or array",
        }
    }
}

/// A JSON content document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Books,
    Images,
    Projects,
    Trips,
    CvEducation,
    CvWork,
    CvResearch,
    CvProjects,
    CvAchievements,
    CvPositions,
    CvSkills,
    PageContent,
    ResearchJournal,
    ResearchThesis,
    ResearchConference,
    ResearchPatent,
    /// Served under `/api/content/contactBanner`, never under `/api/data/`.
    ContactBanner,
}

impl Section {
    /// Every section reachable through `/api/data/{key}`.
    pub const DATA: [Section; 16] = [
        Section::Books,
        Section::Images,
        Section::Projects,
        Section::Trips,
        Section::CvEducation,
        Section::CvWork,
        Section::CvResearch,
        Section::CvProjects,
        Section::CvAchievements,
        Section::CvPositions,
        Section::CvSkills,
        Section::PageContent,
        Section::ResearchJournal,
        Section::ResearchThesis,
        Section::ResearchConference,
        Section::ResearchPatent,
    ];

    /// URL key, e.g. `research/journal`.
    pub fn key(self) -> &'static str {
        match self {
            Section::Books => "books",
            Section::Images => "images",
            Section::Projects => "projects",
            Section::Trips => "trips",
            Section::CvEducation => "cv/education",
            Section::CvWork => "cv/work",
            Section::CvResearch => "cv/research",
            Section::CvProjects => "cv/projects",
            Section::CvAchievements => "cv/achievements",
            Section::CvPositions => "cv/positions",
            Section::CvSkills => "cv/skills",
            Section::PageContent => "page_content",
            Section::ResearchJournal => "research/journal",
            Section::ResearchThesis => "research/thesis",
            Section::ResearchConference => "research/conference",
            Section::ResearchPatent => "research/patent",
            Section::ContactBanner => "contactBanner",
        }
    }

    /// File name inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Section::Books => "books.json",
            Section::Images => "images.json",
            Section::Projects => "projects.json",
            Section::Trips => "trips.json",
            Section::CvEducation => "cv_education.json",
            Section::CvWork => "cv_work.json",
            Section::CvResearch => "cv_research.json",
            Section::CvProjects => "cv_projects.json",
            Section::CvAchievements => "cv_achievements.json",
            Section::CvPositions => "cv_positions.json",
            Section::CvSkills => "cv_skills.json",
            Section::PageContent => "page_content.json",
            Section::ResearchJournal => "research_journal.json",
            Section::ResearchThesis => "research_thesis.json",
            Section::ResearchConference => "research_conference.json",
            Section::ResearchPatent => "research_patent.json",
            Section::ContactBanner => "contactBanner.json",
        }
    }

    /// Human label used in response messages ("Research Journal data saved successfully.").
    pub fn label(self) -> &'static str {
        match self {
            Section::Books => "Books",
            Section::Images => "Images",
            Section::Projects => "Projects",
            Section::Trips => "Trips",
            Section::CvEducation => "CV Education",
            Section::CvWork => "CV Work",
            Section::CvResearch => "CV Research",
            Section::CvProjects => "CV Projects",
            Section::CvAchievements => "CV Achievements",
            Section::CvPositions => "CV Positions",
            Section::CvSkills => "CV Skills",
            Section::PageContent => "Page content",
            Section::ResearchJournal => "Research Journal",
            Section::ResearchThesis => "Research Thesis",
            Section::ResearchConference => "Research Conference",
            Section::ResearchPatent => "Research Patent",
            Section::ContactBanner => "Contact banner",
        }
    }

    pub fn shape(self) -> Shape {
        match self {
            Section::CvSkills | Section::PageContent | Section::ContactBanner => Shape::Object,
            Section::ResearchThesis => Shape::ObjectOrArray,
            _ => Shape::Array,
        }
    }

    /// Resolve a `/api/data/{key}` path.
    pub fn from_key(key: &str) -> Option<Section> {
        let key = key.trim_matches('/');
        Section::DATA.into_iter().find(|s| s.key() == key)
    }

    /// Resolve the `:section` of `/api/data/:section/order`.
    pub fn from_order_key(key: &str) -> Option<Section> {
        match key {
            "projects" => Some(Section::Projects),
            "journal" => Some(Section::ResearchJournal),
            "conference" => Some(Section::ResearchConference),
            "thesis" => Some(Section::ResearchThesis),
            "patent" => Some(Section::ResearchPatent),
            _ => None,
        }
    }

    /// Check that a stored document has the expected top-level shape.
    pub fn check_shape(self, value: &Value) -> Result<()> {
        if self.shape().matches(value) {
            Ok(())
        } else {
            Err(Error::Parse(format!(
                "Invalid format in {}: expected a {}.",
                self.file_name(),
                self.shape().describe()
            )))
        }
    }

    /// Validate a submitted document before it replaces the stored one.
    pub fn validate(self, value: &Value) -> Result<()> {
        match self {
            Section::Books => validation::books(value),
            Section::Images => validation::images(value),
            Section::Projects => validation::projects(value),
            Section::Trips => validation::trips(value),
            Section::ResearchJournal => validation::journal(value),
            Section::ResearchThesis => validation::thesis(value),
            Section::ResearchConference | Section::ResearchPatent => {
                validation::research_entries(value)
            }
            Section::ContactBanner => validation::contact_banner(value),
            Section::CvSkills | Section::PageContent => validation::object(value),
            Section::CvEducation
            | Section::CvWork
            | Section::CvResearch
            | Section::CvProjects
            | Section::CvAchievements
            | Section::CvPositions => validation::array_of_objects(value),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A raw HTML document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HtmlPage {
    Homepage,
}

impl HtmlPage {
    pub fn file_name(self) -> &'static str {
        match self {
            HtmlPage::Homepage => "homepage.html",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HtmlPage::Homepage => "Homepage content",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_key_roundtrips_every_data_section() {
        for section in Section::DATA {
            assert_eq!(Section::from_key(section.key()), Some(section));
        }
    }

    #[test]
    fn test_from_key_rejects_unknown_and_contact_banner() {
        assert_eq!(Section::from_key("passwords"), None);
        assert_eq!(Section::from_key("contactBanner"), None);
        assert_eq!(Section::from_key("cv"), None);
        assert_eq!(Section::from_key("../books"), None);
    }

    #[test]
    fn test_from_key_tolerates_slashes() {
        assert_eq!(Section::from_key("/cv/skills/"), Some(Section::CvSkills));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(Section::Books.file_name(), "books.json");
        assert_eq!(Section::CvSkills.file_name(), "cv_skills.json");
        assert_eq!(Section::ResearchPatent.file_name(), "research_patent.json");
        assert_eq!(HtmlPage::Homepage.file_name(), "homepage.html");
    }

    #[test]
    fn test_order_keys() {
        assert_eq!(Section::from_order_key("projects"), Some(Section::Projects));
        assert_eq!(Section::from_order_key("journal"), Some(Section::ResearchJournal));
        assert_eq!(Section::from_order_key("thesis"), Some(Section::ResearchThesis));
        assert_eq!(Section::from_order_key("books"), None);
    }

    #[test]
    fn test_check_shape() {
        assert!(Section::Books.check_shape(&json!([])).is_ok());
        assert!(matches!(
            Section::Books.check_shape(&json!({})),
            Err(Error::Parse(_))
        ));
        assert!(Section::CvSkills.check_shape(&json!({})).is_ok());
        assert!(Section::ResearchThesis.check_shape(&json!({})).is_ok());
        assert!(Section::ResearchThesis.check_shape(&json!([])).is_ok());
        assert!(Section::ResearchThesis.check_shape(&json!("x")).is_err());
    }
}
