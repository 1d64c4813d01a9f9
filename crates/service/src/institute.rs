//! Institute workflows. Institutes always belong to an active company and
//! are removed with a hard delete, unlike companies.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::Utc;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::company;
use models::enums::{Gender, InstituteGender, InstituteType, UserRole};
use models::institute;
use models::user;

use crate::errors::ServiceError;
use crate::listing::{ListOptions, Page, RELATED_TAKE};
use crate::views::{CompanySummary, UserSummary};

const SORTABLE: &[&str] = &["name", "institute_type", "created_at", "updated_at"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstituteInput {
    pub name: String,
    #[serde(rename = "type")]
    pub institute_type: InstituteType,
    pub gender: InstituteGender,
    pub description: Option<String>,
    pub address: Option<String>,
    pub company_id: Uuid,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInstituteInput {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub institute_type: Option<InstituteType>,
    pub gender: Option<InstituteGender>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstituteFilter {
    pub search_term: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub institute_type: Option<InstituteType>,
    pub gender: Option<InstituteGender>,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstituteView {
    #[serde(flatten)]
    pub institute: institute::Model,
    pub company: Option<CompanySummary>,
    pub students: Vec<UserSummary>,
    pub student_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstituteStatistics {
    pub institute_id: Uuid,
    pub total_students: u64,
    pub role_distribution: BTreeMap<UserRole, u64>,
    pub gender_distribution: BTreeMap<Gender, u64>,
}

fn filter_condition(filter: &InstituteFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(term) = filter.search_term.as_deref().filter(|t| !t.trim().is_empty()) {
        let pattern = format!("%{}%", term);
        cond = cond.add(
            Condition::any()
                .add(Expr::col((institute::Entity, institute::Column::Name)).ilike(pattern.clone()))
                .add(
                    Expr::col((institute::Entity, institute::Column::Description))
                        .ilike(pattern.clone()),
                )
                .add(Expr::col((institute::Entity, institute::Column::Address)).ilike(pattern)),
        );
    }
    if let Some(name) = &filter.name {
        cond = cond.add(
            Expr::col((institute::Entity, institute::Column::Name)).ilike(format!("%{}%", name)),
        );
    }
    if let Some(institute_type) = filter.institute_type {
        cond = cond.add(institute::Column::InstituteType.eq(institute_type));
    }
    if let Some(gender) = filter.gender {
        cond = cond.add(institute::Column::Gender.eq(gender));
    }
    if let Some(company_id) = filter.company_id {
        cond = cond.add(institute::Column::CompanyId.eq(company_id));
    }
    cond
}

#[instrument(skip(db, input), fields(name = %input.name, company_id = %input.company_id))]
pub async fn create(
    db: &DatabaseConnection,
    input: CreateInstituteInput,
) -> Result<institute::Model, ServiceError> {
    company::find_active(db, input.company_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Company"))?;

    let created = institute::create(
        db,
        institute::NewInstitute {
            name: input.name,
            institute_type: input.institute_type,
            gender: input.gender,
            description: input.description,
            address: input.address,
            company_id: input.company_id,
        },
    )
    .await?;
    info!(institute_id = %created.id, "institute_created");
    Ok(created)
}

#[instrument(skip(db, filter, opts))]
pub async fn list(
    db: &DatabaseConnection,
    filter: &InstituteFilter,
    opts: &ListOptions,
) -> Result<Page<InstituteView>, ServiceError> {
    let cond = filter_condition(filter);
    let (page, limit, offset) = opts.normalize();
    let (sort_col, order) = opts.sort(SORTABLE, "created_at");
    let sort_col = institute::Column::from_str(sort_col).unwrap_or(institute::Column::CreatedAt);

    let total = institute::Entity::find().filter(cond.clone()).count(db).await?;
    let rows = institute::Entity::find()
        .filter(cond)
        .order_by(sort_col, order)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await?;

    let mut data = Vec::with_capacity(rows.len());
    for row in rows {
        data.push(hydrate(db, row).await?);
    }
    Ok(Page { page, limit, total, data })
}

#[instrument(skip(db))]
pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<InstituteView, ServiceError> {
    let row = institute::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Institute"))?;
    hydrate(db, row).await
}

/// Listing scoped to one company; shares the filter machinery so the page
/// envelope stays identical.
#[instrument(skip(db, opts))]
pub async fn list_by_company(
    db: &DatabaseConnection,
    company_id: Uuid,
    opts: &ListOptions,
) -> Result<Page<InstituteView>, ServiceError> {
    company::find_active(db, company_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Company"))?;
    let filter = InstituteFilter { company_id: Some(company_id), ..Default::default() };
    list(db, &filter, opts).await
}

#[instrument(skip(db, input))]
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateInstituteInput,
) -> Result<institute::Model, ServiceError> {
    let row = institute::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Institute"))?;

    if let Some(name) = &input.name {
        user::validate_name(name)?;
    }
    // reparenting must point at a live company
    if let Some(company_id) = input.company_id {
        company::find_active(db, company_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Company"))?;
    }

    let mut am: institute::ActiveModel = row.into();
    if let Some(name) = input.name {
        am.name = Set(name);
    }
    if let Some(institute_type) = input.institute_type {
        am.institute_type = Set(institute_type);
    }
    if let Some(gender) = input.gender {
        am.gender = Set(gender);
    }
    if let Some(description) = input.description {
        am.description = Set(Some(description));
    }
    if let Some(address) = input.address {
        am.address = Set(Some(address));
    }
    if let Some(company_id) = input.company_id {
        am.company_id = Set(company_id);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Hard delete. Refused while the institute still has active students.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let row = institute::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Institute"))?;

    let students = user::Entity::find()
        .filter(user::Column::InstituteId.eq(id))
        .filter(user::Column::IsActive.eq(true))
        .count(db)
        .await?;
    if students > 0 {
        return Err(ServiceError::BadRequest(
            "Cannot delete institute with active students!".into(),
        ));
    }

    row.delete(db).await?;
    info!(institute_id = %id, "institute_deleted");
    Ok(())
}

#[instrument(skip(db))]
pub async fn statistics(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<InstituteStatistics, ServiceError> {
    institute::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Institute"))?;

    let students: Vec<(UserRole, Gender)> = user::Entity::find()
        .select_only()
        .column(user::Column::Role)
        .column(user::Column::Gender)
        .filter(user::Column::InstituteId.eq(id))
        .filter(user::Column::IsActive.eq(true))
        .into_tuple()
        .all(db)
        .await?;

    let mut role_distribution = BTreeMap::new();
    let mut gender_distribution = BTreeMap::new();
    for (role, gender) in &students {
        *role_distribution.entry(*role).or_insert(0) += 1;
        *gender_distribution.entry(*gender).or_insert(0) += 1;
    }
    Ok(InstituteStatistics {
        institute_id: id,
        total_students: students.len() as u64,
        role_distribution,
        gender_distribution,
    })
}

async fn hydrate(
    db: &DatabaseConnection,
    row: institute::Model,
) -> Result<InstituteView, ServiceError> {
    let company = company::Entity::find_by_id(row.company_id)
        .select_only()
        .column(company::Column::Id)
        .column(company::Column::Name)
        .column(company::Column::Description)
        .into_model::<CompanySummary>()
        .one(db)
        .await?;

    let student_count = user::Entity::find()
        .filter(user::Column::InstituteId.eq(row.id))
        .filter(user::Column::IsActive.eq(true))
        .count(db)
        .await?;
    let students = user::Entity::find()
        .select_only()
        .column(user::Column::Id)
        .column(user::Column::FirstName)
        .column(user::Column::LastName)
        .column(user::Column::Email)
        .column(user::Column::Role)
        .filter(user::Column::InstituteId.eq(row.id))
        .filter(user::Column::IsActive.eq(true))
        .order_by_desc(user::Column::CreatedAt)
        .limit(RELATED_TAKE)
        .into_model::<UserSummary>()
        .all(db)
        .await?;

    Ok(InstituteView { institute: row, company, students, student_count })
}
