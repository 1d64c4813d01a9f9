//! Company workflows: CRUD over the company table plus per-company
//! statistics. Deletion is a soft delete; rows stay behind `is_active`.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::Utc;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::company;
use models::enums::{UserRole, UserType};
use models::institute;
use models::user;

use crate::errors::ServiceError;
use crate::listing::{ListOptions, Page, RELATED_TAKE};
use crate::views::{InstituteSummary, UserSummary};

const SORTABLE: &[&str] = &["name", "email", "created_at", "updated_at"];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyInput {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

/// Query-bag filter for company listings. `search_term` matches any of the
/// text columns; the scalar fields narrow exactly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFilter {
    pub search_term: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

/// Company row plus its bounded related records.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyView {
    #[serde(flatten)]
    pub company: company::Model,
    pub institutes: Vec<InstituteSummary>,
    pub employees: Vec<UserSummary>,
    pub institute_count: u64,
    pub employee_count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyStatistics {
    pub company_id: Uuid,
    pub total_employees: u64,
    pub total_institutes: u64,
    pub role_distribution: BTreeMap<UserRole, u64>,
    pub user_type_distribution: BTreeMap<UserType, u64>,
}

/// Compile the filter into one `Condition`. The same condition feeds both
/// the count and the page fetch.
fn filter_condition(filter: &CompanyFilter) -> Condition {
    let mut cond = Condition::all();
    // soft-deleted rows are hidden unless the caller asks for them
    cond = cond.add(company::Column::IsActive.eq(filter.is_active.unwrap_or(true)));
    if let Some(term) = filter.search_term.as_deref().filter(|t| !t.trim().is_empty()) {
        let pattern = format!("%{}%", term);
        cond = cond.add(
            Condition::any()
                .add(Expr::col((company::Entity, company::Column::Name)).ilike(pattern.clone()))
                .add(
                    Expr::col((company::Entity, company::Column::Description))
                        .ilike(pattern.clone()),
                )
                .add(Expr::col((company::Entity, company::Column::Email)).ilike(pattern.clone()))
                .add(Expr::col((company::Entity, company::Column::Address)).ilike(pattern)),
        );
    }
    if let Some(name) = &filter.name {
        cond = cond
            .add(Expr::col((company::Entity, company::Column::Name)).ilike(format!("%{}%", name)));
    }
    if let Some(email) = &filter.email {
        cond = cond.add(company::Column::Email.eq(email));
    }
    if let Some(phone) = &filter.phone {
        cond = cond.add(company::Column::Phone.eq(phone));
    }
    cond
}

#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create(
    db: &DatabaseConnection,
    input: CreateCompanyInput,
) -> Result<company::Model, ServiceError> {
    let created = company::create(
        db,
        company::NewCompany {
            name: input.name,
            description: input.description,
            address: input.address,
            phone: input.phone,
            email: input.email,
            is_active: true,
        },
    )
    .await?;
    info!(company_id = %created.id, "company_created");
    Ok(created)
}

#[instrument(skip(db, filter, opts))]
pub async fn list(
    db: &DatabaseConnection,
    filter: &CompanyFilter,
    opts: &ListOptions,
) -> Result<Page<CompanyView>, ServiceError> {
    let cond = filter_condition(filter);
    let (page, limit, offset) = opts.normalize();
    let (sort_col, order) = opts.sort(SORTABLE, "created_at");
    let sort_col = company::Column::from_str(sort_col).unwrap_or(company::Column::CreatedAt);

    let total = company::Entity::find().filter(cond.clone()).count(db).await?;
    let rows = company::Entity::find()
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
pub async fn get(db: &DatabaseConnection, id: Uuid) -> Result<CompanyView, ServiceError> {
    let row = company::find_active(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Company"))?;
    hydrate(db, row).await
}

#[instrument(skip(db, input))]
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateCompanyInput,
) -> Result<company::Model, ServiceError> {
    let row = company::find_active(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Company"))?;

    if let Some(name) = &input.name {
        user::validate_name(name)?;
    }
    if let Some(email) = &input.email {
        user::validate_email(email)?;
    }

    let mut am: company::ActiveModel = row.into();
    if let Some(name) = input.name {
        am.name = Set(name);
    }
    if let Some(description) = input.description {
        am.description = Set(Some(description));
    }
    if let Some(address) = input.address {
        am.address = Set(Some(address));
    }
    if let Some(phone) = input.phone {
        am.phone = Set(Some(phone));
    }
    if let Some(email) = input.email {
        am.email = Set(Some(email));
    }
    if let Some(is_active) = input.is_active {
        am.is_active = Set(is_active);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Soft delete. Refused while the company still has active employees or
/// any institutes.
#[instrument(skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let row = company::find_active(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Company"))?;

    let employees = user::Entity::find()
        .filter(user::Column::CompanyId.eq(id))
        .filter(user::Column::IsActive.eq(true))
        .count(db)
        .await?;
    let institutes = institute::Entity::find()
        .filter(institute::Column::CompanyId.eq(id))
        .count(db)
        .await?;
    if employees > 0 || institutes > 0 {
        return Err(ServiceError::BadRequest(
            "Cannot delete company with active employees or institutes!".into(),
        ));
    }

    let mut am: company::ActiveModel = row.into();
    am.is_active = Set(false);
    am.updated_at = Set(Utc::now().into());
    am.update(db).await?;
    info!(company_id = %id, "company_deactivated");
    Ok(())
}

#[instrument(skip(db))]
pub async fn statistics(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<CompanyStatistics, ServiceError> {
    company::find_active(db, id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Company"))?;

    let members: Vec<(UserRole, UserType)> = user::Entity::find()
        .select_only()
        .column(user::Column::Role)
        .column(user::Column::UserType)
        .filter(user::Column::CompanyId.eq(id))
        .filter(user::Column::IsActive.eq(true))
        .into_tuple()
        .all(db)
        .await?;
    let total_institutes = institute::Entity::find()
        .filter(institute::Column::CompanyId.eq(id))
        .count(db)
        .await?;

    let (role_distribution, user_type_distribution) = fold_distributions(&members);
    Ok(CompanyStatistics {
        company_id: id,
        total_employees: members.len() as u64,
        total_institutes,
        role_distribution,
        user_type_distribution,
    })
}

/// Single pass over the fetched (role, type) pairs; absent values simply do
/// not appear as keys.
fn fold_distributions(
    members: &[(UserRole, UserType)],
) -> (BTreeMap<UserRole, u64>, BTreeMap<UserType, u64>) {
    let mut roles = BTreeMap::new();
    let mut types = BTreeMap::new();
    for (role, user_type) in members {
        *roles.entry(*role).or_insert(0) += 1;
        *types.entry(*user_type).or_insert(0) += 1;
    }
    (roles, types)
}

async fn hydrate(
    db: &DatabaseConnection,
    row: company::Model,
) -> Result<CompanyView, ServiceError> {
    let institute_count = institute::Entity::find()
        .filter(institute::Column::CompanyId.eq(row.id))
        .count(db)
        .await?;
    let employee_count = user::Entity::find()
        .filter(user::Column::CompanyId.eq(row.id))
        .filter(user::Column::IsActive.eq(true))
        .count(db)
        .await?;

    let institutes = institute::Entity::find()
        .select_only()
        .column(institute::Column::Id)
        .column(institute::Column::Name)
        .column(institute::Column::InstituteType)
        .column(institute::Column::Gender)
        .filter(institute::Column::CompanyId.eq(row.id))
        .order_by_desc(institute::Column::CreatedAt)
        .limit(RELATED_TAKE)
        .into_model::<InstituteSummary>()
        .all(db)
        .await?;
    let employees = user::Entity::find()
        .select_only()
        .column(user::Column::Id)
        .column(user::Column::FirstName)
        .column(user::Column::LastName)
        .column(user::Column::Email)
        .column(user::Column::Role)
        .filter(user::Column::CompanyId.eq(row.id))
        .filter(user::Column::IsActive.eq(true))
        .order_by_desc(user::Column::CreatedAt)
        .limit(RELATED_TAKE)
        .into_model::<UserSummary>()
        .all(db)
        .await?;

    Ok(CompanyView { company: row, institutes, employees, institute_count, employee_count })
}
