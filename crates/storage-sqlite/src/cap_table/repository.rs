use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use flexile_core::cap_table::{
    CapTable, CapTableImport, CapTableRepositoryTrait, ConvertibleInvestment, ConvertibleSecurity,
    ShareClass,
};
use flexile_core::errors::ValidationError;
use flexile_core::Result;

use super::model::{
    CompanyInvestorDB, ConvertibleInvestmentDB, ConvertibleSecurityDB, ShareClassDB,
    ShareHoldingDB,
};
use crate::db::{get_connection, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{
    company_investors, convertible_investments, convertible_securities, share_classes,
    share_holdings,
};
use crate::utils::{chunk_ids, insert_batch_size};

pub struct CapTableRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl CapTableRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        CapTableRepository { pool, writer }
    }

    /// Fails unless every id in `ids` names an investor of `company_id`.
    fn ensure_company_investors(
        conn: &mut SqliteConnection,
        company_id: &str,
        ids: &BTreeSet<String>,
    ) -> Result<()> {
        let ids: Vec<String> = ids.iter().cloned().collect();
        let mut found = BTreeSet::new();
        for chunk in chunk_ids(&ids) {
            let owned = company_investors::table
                .filter(company_investors::company_id.eq(company_id))
                .filter(company_investors::id.eq_any(chunk))
                .select(company_investors::id)
                .load::<String>(conn)
                .map_err(StorageError::from)?;
            found.extend(owned);
        }
        match ids.into_iter().find(|id| !found.contains(id)) {
            Some(id) => Err(ValidationError::InvalidInput(format!(
                "Investor {} does not belong to company {}",
                id, company_id
            ))
            .into()),
            None => Ok(()),
        }
    }

    /// Fails unless every id in `ids` names a share class of `company_id`.
    fn ensure_company_share_classes(
        conn: &mut SqliteConnection,
        company_id: &str,
        ids: &BTreeSet<String>,
    ) -> Result<()> {
        let ids: Vec<String> = ids.iter().cloned().collect();
        let mut found = BTreeSet::new();
        for chunk in chunk_ids(&ids) {
            let owned = share_classes::table
                .filter(share_classes::company_id.eq(company_id))
                .filter(share_classes::id.eq_any(chunk))
                .select(share_classes::id)
                .load::<String>(conn)
                .map_err(StorageError::from)?;
            found.extend(owned);
        }
        match ids.into_iter().find(|id| !found.contains(id)) {
            Some(id) => Err(ValidationError::InvalidInput(format!(
                "Share class {} does not belong to company {}",
                id, company_id
            ))
            .into()),
            None => Ok(()),
        }
    }

    fn load_convertibles(
        conn: &mut SqliteConnection,
        company_id: &str,
    ) -> Result<Vec<ConvertibleInvestment>> {
        let investments = convertible_investments::table
            .filter(convertible_investments::company_id.eq(company_id))
            .order((convertible_investments::created_at, convertible_investments::id))
            .select(ConvertibleInvestmentDB::as_select())
            .load::<ConvertibleInvestmentDB>(conn)
            .map_err(StorageError::from)?;

        let mut securities = Vec::new();
        for chunk in chunk_ids(&investments) {
            let loaded = ConvertibleSecurityDB::belonging_to(chunk)
                .order((
                    convertible_securities::created_at,
                    convertible_securities::id,
                ))
                .select(ConvertibleSecurityDB::as_select())
                .load::<ConvertibleSecurityDB>(conn)
                .map_err(StorageError::from)?;
            securities.extend(loaded);
        }

        let grouped = securities.grouped_by(&investments);
        Ok(investments
            .into_iter()
            .zip(grouped)
            .map(|(investment, securities)| {
                investment.into_domain(
                    securities
                        .into_iter()
                        .map(ConvertibleSecurity::from)
                        .collect(),
                )
            })
            .collect())
    }
}

#[async_trait]
impl CapTableRepositoryTrait for CapTableRepository {
    fn load_cap_table(&self, company_id: &str) -> Result<CapTable> {
        let mut conn = get_connection(&self.pool)?;

        let investors = company_investors::table
            .filter(company_investors::company_id.eq(company_id))
            .order((company_investors::created_at, company_investors::id))
            .select(CompanyInvestorDB::as_select())
            .load::<CompanyInvestorDB>(&mut conn)
            .map_err(StorageError::from)?;

        let classes = share_classes::table
            .filter(share_classes::company_id.eq(company_id))
            .order((share_classes::created_at, share_classes::id))
            .select(ShareClassDB::as_select())
            .load::<ShareClassDB>(&mut conn)
            .map_err(StorageError::from)?;

        let holdings = share_holdings::table
            .filter(share_holdings::company_id.eq(company_id))
            .order((share_holdings::created_at, share_holdings::id))
            .select(ShareHoldingDB::as_select())
            .load::<ShareHoldingDB>(&mut conn)
            .map_err(StorageError::from)?;

        let convertibles = Self::load_convertibles(&mut conn, company_id)?;

        Ok(CapTable {
            company_id: company_id.to_string(),
            investors: investors.into_iter().map(Into::into).collect(),
            share_classes: classes
                .into_iter()
                .map(ShareClass::try_from)
                .collect::<Result<Vec<_>>>()?,
            share_holdings: holdings.into_iter().map(Into::into).collect(),
            convertible_investments: convertibles,
        })
    }

    fn get_convertible_investments(&self, company_id: &str) -> Result<Vec<ConvertibleInvestment>> {
        let mut conn = get_connection(&self.pool)?;
        Self::load_convertibles(&mut conn, company_id)
    }

    async fn import_cap_table(&self, company_id: String, import: CapTableImport) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let now = Utc::now().naive_utc();
                // v7 ids sort in creation order, which load queries rely on.
                let new_id = |id: Option<String>| id.unwrap_or_else(|| Uuid::now_v7().to_string());

                let investors: Vec<CompanyInvestorDB> = import
                    .investors
                    .into_iter()
                    .map(|i| CompanyInvestorDB {
                        id: new_id(i.id),
                        company_id: company_id.clone(),
                        name: i.name,
                        created_at: now,
                    })
                    .collect();

                let classes: Vec<ShareClassDB> = import
                    .share_classes
                    .into_iter()
                    .map(|c| ShareClassDB {
                        id: new_id(c.id),
                        company_id: company_id.clone(),
                        name: c.name,
                        original_issue_price_in_dollars: c
                            .original_issue_price_in_dollars
                            .map(|d| d.to_string()),
                        preferred_dividend_rate: c.preferred_dividend_rate.map(|d| d.to_string()),
                        hurdle_rate: c.hurdle_rate.map(|d| d.to_string()),
                        created_at: now,
                    })
                    .collect();

                let holdings: Vec<ShareHoldingDB> = import
                    .share_holdings
                    .into_iter()
                    .map(|h| ShareHoldingDB {
                        id: new_id(h.id),
                        company_id: company_id.clone(),
                        company_investor_id: h.company_investor_id,
                        share_class_id: h.share_class_id,
                        number_of_shares: h.number_of_shares,
                        total_amount_in_cents: h.total_amount_in_cents,
                        originally_acquired_at: h.originally_acquired_at,
                        created_at: now,
                    })
                    .collect();

                let mut investments = Vec::new();
                let mut securities = Vec::new();
                for ci in import.convertible_investments {
                    let investment_id = new_id(ci.id);
                    securities.extend(ci.convertible_securities.into_iter().map(|s| {
                        ConvertibleSecurityDB {
                            id: new_id(s.id),
                            convertible_investment_id: investment_id.clone(),
                            company_investor_id: s.company_investor_id,
                            principal_value_in_cents: s.principal_value_in_cents,
                            created_at: now,
                        }
                    }));
                    investments.push(ConvertibleInvestmentDB {
                        id: investment_id,
                        company_id: company_id.clone(),
                        entity_name: ci.entity_name,
                        amount_in_cents: ci.amount_in_cents,
                        implied_shares: ci.implied_shares,
                        issued_at: ci.issued_at,
                        created_at: now,
                    });
                }

                let mut inserted = 0;
                for chunk in investors.chunks(insert_batch_size(4)) {
                    inserted += diesel::insert_into(company_investors::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                for chunk in classes.chunks(insert_batch_size(7)) {
                    inserted += diesel::insert_into(share_classes::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                // Investors and classes from this batch are already inserted,
                // so these checks also accept them.
                let investor_ids: BTreeSet<String> = holdings
                    .iter()
                    .map(|h| h.company_investor_id.clone())
                    .chain(securities.iter().map(|s| s.company_investor_id.clone()))
                    .collect();
                Self::ensure_company_investors(conn, &company_id, &investor_ids)?;
                let class_ids: BTreeSet<String> =
                    holdings.iter().map(|h| h.share_class_id.clone()).collect();
                Self::ensure_company_share_classes(conn, &company_id, &class_ids)?;

                for chunk in holdings.chunks(insert_batch_size(8)) {
                    inserted += diesel::insert_into(share_holdings::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                for chunk in investments.chunks(insert_batch_size(7)) {
                    inserted += diesel::insert_into(convertible_investments::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                for chunk in securities.chunks(insert_batch_size(5)) {
                    inserted += diesel::insert_into(convertible_securities::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                debug!("Inserted {} cap table rows for company {}", inserted, company_id);
                Ok(inserted)
            })
            .await
    }
}
