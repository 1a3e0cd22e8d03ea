//! AccountRepository backed by PostgreSQL.

use crate::connection::{DbPool, with_connection};
use crate::models::{AccountRow, NewAccountRow};
use crate::schema::accounts;
use async_trait::async_trait;
use diesel::prelude::*;
use qrgate_core::{Account, ApiKey, NewAccount, PlanTier};
use qrgate_error::StoreResult;
use qrgate_interface::AccountRepository;
use tracing::{debug, instrument};

/// Database-backed account repository.
#[derive(Clone)]
pub struct PostgresAccountRepository {
    pool: DbPool,
}

impl PostgresAccountRepository {
    /// Create a new account repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    #[instrument(skip_all, fields(plan = %account.plan))]
    async fn create(&self, account: NewAccount) -> StoreResult<Account> {
        let row = NewAccountRow::from(account);
        let created = with_connection(&self.pool, move |conn| {
            diesel::insert_into(accounts::table)
                .values(&row)
                .returning(AccountRow::as_returning())
                .get_result(conn)
                .map_err(Into::into)
        })
        .await?;
        debug!(account_id = created.id, "Inserted account");
        Ok(created.into())
    }

    async fn find_by_api_key(&self, api_key: &ApiKey) -> StoreResult<Option<Account>> {
        let key = api_key.as_str().to_string();
        let row = with_connection(&self.pool, move |conn| {
            accounts::table
                .filter(accounts::api_key.eq(key))
                .select(AccountRow::as_select())
                .first(conn)
                .optional()
                .map_err(Into::into)
        })
        .await?;
        Ok(row.map(Account::from))
    }

    #[instrument(skip(self, api_key))]
    async fn update_plan(&self, api_key: &ApiKey, plan: PlanTier) -> StoreResult<Account> {
        let key = api_key.as_str().to_string();
        let row = with_connection(&self.pool, move |conn| {
            diesel::update(accounts::table.filter(accounts::api_key.eq(key)))
                .set(accounts::plan.eq(plan.to_string()))
                .returning(AccountRow::as_returning())
                .get_result(conn)
                .map_err(Into::into)
        })
        .await?;
        debug!(account_id = row.id, "Updated plan");
        Ok(row.into())
    }
}
