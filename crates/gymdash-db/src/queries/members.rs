//! Database query functions for the `members` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{MemberRow, MembershipStatus};

/// Parameters for inserting a member.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub photo: Option<String>,
    pub status: MembershipStatus,
}

/// Insert a member row.
pub async fn insert_member(pool: &PgPool, new: &NewMember) -> Result<MemberRow> {
    let member = sqlx::query_as::<_, MemberRow>(
        "INSERT INTO members (id, name, email, phone, photo, status) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING *",
    )
    .bind(new.id)
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.photo)
    .bind(new.status)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert member {:?}", new.name))?;

    Ok(member)
}

/// Fetch a member by ID.
pub async fn get_member(pool: &PgPool, id: Uuid) -> Result<Option<MemberRow>> {
    let member = sqlx::query_as::<_, MemberRow>("SELECT * FROM members WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch member")?;

    Ok(member)
}

/// List all members ordered by name.
pub async fn list_members(pool: &PgPool) -> Result<Vec<MemberRow>> {
    let members = sqlx::query_as::<_, MemberRow>("SELECT * FROM members ORDER BY name ASC")
        .fetch_all(pool)
        .await
        .context("failed to list members")?;

    Ok(members)
}
