//! Closed string enums shared across entities, filters, and token claims.
//!
//! Stored as their SCREAMING_SNAKE_CASE wire form so database rows, JSON
//! payloads, and JWT claims all agree on the same spelling.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "SUPER_ADMIN")]
    SuperAdmin,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "MANAGER")]
    Manager,
    #[sea_orm(string_value = "EMPLOYEE")]
    Employee,
    #[sea_orm(string_value = "STUDENT")]
    Student,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    #[sea_orm(string_value = "EMPLOYEE")]
    Employee,
    #[sea_orm(string_value = "STUDENT")]
    Student,
    #[sea_orm(string_value = "GENERAL")]
    General,
}

/// Gender of an individual user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    #[sea_orm(string_value = "MALE")]
    Male,
    #[sea_orm(string_value = "FEMALE")]
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstituteType {
    #[sea_orm(string_value = "SCHOOL")]
    School,
    #[sea_orm(string_value = "COLLEGE")]
    College,
    #[sea_orm(string_value = "UNIVERSITY")]
    University,
    #[sea_orm(string_value = "MADRASA")]
    Madrasa,
    #[sea_orm(string_value = "TRAINING_CENTER")]
    TrainingCenter,
}

/// Student population an institute admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstituteGender {
    #[sea_orm(string_value = "MALE")]
    Male,
    #[sea_orm(string_value = "FEMALE")]
    Female,
    #[sea_orm(string_value = "MIXED")]
    Mixed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_is_screaming_snake_case() {
        let json = serde_json::to_string(&UserRole::SuperAdmin).unwrap();
        assert_eq!(json, "\"SUPER_ADMIN\"");
        let parsed: InstituteType = serde_json::from_str("\"TRAINING_CENTER\"").unwrap();
        assert_eq!(parsed, InstituteType::TrainingCenter);
    }

    #[test]
    fn unknown_variant_is_rejected() {
        assert!(serde_json::from_str::<InstituteType>("\"KINDERGARTEN\"").is_err());
    }
}
