//! View identifiers and layouts.

use serde::{Deserialize, Serialize};

/// Every page the application can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Home,
    Login,
    Register,
    AdoptionList,
    AdoptionDetail,
    CreateAdoption,
    LostPetList,
    LostPetDetail,
    ReportLostPet,
    Help,
    AskQuestion,
    QuestionDetail,
    Donations,
    Profile,
    AdminDashboard,
    AdminAds,
    AdminQuestions,
    AdminUsers,
    NotFound,
}

impl View {
    /// Views that mount a multi-step form.
    pub fn is_wizard(&self) -> bool {
        matches!(self, Self::CreateAdoption | Self::ReportLostPet)
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Home => "home",
            Self::Login => "login",
            Self::Register => "register",
            Self::AdoptionList => "adoption_list",
            Self::AdoptionDetail => "adoption_detail",
            Self::CreateAdoption => "create_adoption",
            Self::LostPetList => "lost_pet_list",
            Self::LostPetDetail => "lost_pet_detail",
            Self::ReportLostPet => "report_lost_pet",
            Self::Help => "help",
            Self::AskQuestion => "ask_question",
            Self::QuestionDetail => "question_detail",
            Self::Donations => "donations",
            Self::Profile => "profile",
            Self::AdminDashboard => "admin_dashboard",
            Self::AdminAds => "admin_ads",
            Self::AdminQuestions => "admin_questions",
            Self::AdminUsers => "admin_users",
            Self::NotFound => "not_found",
        };
        write!(f, "{s}")
    }
}

/// Top-level frame a view is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Ordinary site chrome (header, footer).
    Site,
    /// Back-office chrome (sidebar).
    Admin,
}
