//! Diesel models for the gateway tables.

use crate::schema::{accounts, artifacts};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use qrgate_core::{Account, AccountId, Artifact, ArtifactId, NewAccount, NewArtifact, PlanTier};
use std::str::FromStr;
use tracing::warn;

/// Database row for the accounts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountRow {
    pub id: i64,
    pub api_key: String,
    pub plan: String,
    pub billing_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for the accounts table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccountRow {
    pub api_key: String,
    pub plan: String,
    pub billing_customer_id: Option<String>,
}

/// Database row for the artifacts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = artifacts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ArtifactRow {
    pub id: String,
    pub account_id: i64,
    pub payload: String,
    pub scans: i64,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for the artifacts table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = artifacts)]
pub struct NewArtifactRow {
    pub id: String,
    pub account_id: i64,
    pub payload: String,
}

/// Single `count` column returned by counter statements.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct CountRow {
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

/// Stored plan names that no longer parse are served as the free tier.
pub fn plan_from_row(name: &str) -> PlanTier {
    PlanTier::from_str(name).unwrap_or_else(|_| {
        warn!(plan = name, "Unknown stored plan, treating as free");
        PlanTier::Free
    })
}

/// Negative counts can only come from manual edits; clamp them to zero.
pub fn count_from_row(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account::new(
            AccountId::new(row.id),
            row.api_key.into(),
            plan_from_row(&row.plan),
            row.billing_customer_id,
            row.created_at,
        )
    }
}

impl From<NewAccount> for NewAccountRow {
    fn from(account: NewAccount) -> Self {
        Self {
            api_key: account.api_key.as_str().to_string(),
            plan: account.plan.to_string(),
            billing_customer_id: account.billing_customer_id,
        }
    }
}

impl From<ArtifactRow> for Artifact {
    fn from(row: ArtifactRow) -> Self {
        Artifact::new(
            ArtifactId::from(row.id),
            AccountId::new(row.account_id),
            row.payload,
            count_from_row(row.scans),
            row.created_at,
        )
    }
}

impl From<NewArtifact> for NewArtifactRow {
    fn from(artifact: NewArtifact) -> Self {
        Self {
            id: artifact.id.as_str().to_string(),
            account_id: artifact.account_id.get(),
            payload: artifact.payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_stored_plan_resolves_to_free() {
        assert_eq!(plan_from_row("enterprise"), PlanTier::Free);
        assert_eq!(plan_from_row("business"), PlanTier::Business);
    }

    #[test]
    fn account_row_converts() {
        let row = AccountRow {
            id: 5,
            api_key: "qr_abc".to_string(),
            plan: "pro".to_string(),
            billing_customer_id: Some("cus_9".to_string()),
            created_at: Utc::now(),
        };
        let account = Account::from(row);
        assert_eq!(account.id().get(), 5);
        assert_eq!(*account.plan(), PlanTier::Pro);
        assert_eq!(account.api_key().as_str(), "qr_abc");
    }

    #[test]
    fn negative_counts_clamp() {
        assert_eq!(count_from_row(-3), 0);
        assert_eq!(count_from_row(12), 12);
    }
}
