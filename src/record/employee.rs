//! Employee record type
//!
//! Serialized with camelCase keys so browser viewers can consume the JSON
//! payloads directly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Job title, one of a fixed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "Software Engineer")]
    SoftwareEngineer,
    #[serde(rename = "Product Manager")]
    ProductManager,
    #[serde(rename = "Data Analyst")]
    DataAnalyst,
    #[serde(rename = "UX Designer")]
    UxDesigner,
    #[serde(rename = "DevOps Engineer")]
    DevOpsEngineer,
    #[serde(rename = "QA Engineer")]
    QaEngineer,
    #[serde(rename = "Frontend Developer")]
    FrontendDeveloper,
    #[serde(rename = "Backend Developer")]
    BackendDeveloper,
    #[serde(rename = "Full Stack Developer")]
    FullStackDeveloper,
    #[serde(rename = "Project Manager")]
    ProjectManager,
    #[serde(rename = "Business Analyst")]
    BusinessAnalyst,
    #[serde(rename = "UI Designer")]
    UiDesigner,
}

impl Position {
    /// Every position, in display order
    pub const ALL: [Position; 12] = [
        Position::SoftwareEngineer,
        Position::ProductManager,
        Position::DataAnalyst,
        Position::UxDesigner,
        Position::DevOpsEngineer,
        Position::QaEngineer,
        Position::FrontendDeveloper,
        Position::BackendDeveloper,
        Position::FullStackDeveloper,
        Position::ProjectManager,
        Position::BusinessAnalyst,
        Position::UiDesigner,
    ];

    /// Human-readable title
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::SoftwareEngineer => "Software Engineer",
            Position::ProductManager => "Product Manager",
            Position::DataAnalyst => "Data Analyst",
            Position::UxDesigner => "UX Designer",
            Position::DevOpsEngineer => "DevOps Engineer",
            Position::QaEngineer => "QA Engineer",
            Position::FrontendDeveloper => "Frontend Developer",
            Position::BackendDeveloper => "Backend Developer",
            Position::FullStackDeveloper => "Full Stack Developer",
            Position::ProjectManager => "Project Manager",
            Position::BusinessAnalyst => "Business Analyst",
            Position::UiDesigner => "UI Designer",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Employment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentStatus {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Contract,
    Intern,
}

impl EmploymentStatus {
    pub const ALL: [EmploymentStatus; 4] = [
        EmploymentStatus::FullTime,
        EmploymentStatus::PartTime,
        EmploymentStatus::Contract,
        EmploymentStatus::Intern,
    ];
}

/// A single employee record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Opaque unique id (UUID v4)
    pub id: String,
    pub name: String,
    pub position: Position,
    /// Team number, 1 through 10
    pub team: u8,
    /// Serialized as `YYYY-MM-DD`
    pub birthday: NaiveDate,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub employment_status: EmploymentStatus,
    pub notes: String,
}
