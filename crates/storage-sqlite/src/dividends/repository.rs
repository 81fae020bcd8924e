use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::r2d2::{self, Pool};
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use flexile_core::dividends::{
    ComputationOutput, Dividend, DividendComputation, DividendComputationRepositoryTrait,
    DividendRound, DividendRoundRepositoryTrait, DividendStatus, NewDistribution,
    NewDividendComputation,
};
use flexile_core::errors::AllocationError;
use flexile_core::Result;

use super::model::{DividendComputationDB, DividendComputationOutputDB, DividendDB, DividendRoundDB};
use crate::db::{get_connection, WriteHandle};
use crate::errors::{not_found, StorageError};
use crate::schema::{dividend_computation_outputs, dividend_computations, dividend_rounds, dividends};
use crate::utils::insert_batch_size;

const OUTPUT_COLUMNS: usize = 12;
const DIVIDEND_COLUMNS: usize = 10;

pub struct DividendComputationRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl DividendComputationRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        DividendComputationRepository { pool, writer }
    }
}

#[async_trait]
impl DividendComputationRepositoryTrait for DividendComputationRepository {
    fn get_computation(&self, company_id: &str, computation_id: &str) -> Result<DividendComputation> {
        let mut conn = get_connection(&self.pool)?;
        dividend_computations::table
            .filter(dividend_computations::id.eq(computation_id))
            .filter(dividend_computations::company_id.eq(company_id))
            .select(DividendComputationDB::as_select())
            .first::<DividendComputationDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| not_found("Dividend computation", computation_id))?
            .try_into()
    }

    fn list_computations(&self, company_id: &str) -> Result<Vec<DividendComputation>> {
        let mut conn = get_connection(&self.pool)?;
        dividend_computations::table
            .filter(dividend_computations::company_id.eq(company_id))
            .order((
                dividend_computations::created_at.desc(),
                dividend_computations::id.desc(),
            ))
            .select(DividendComputationDB::as_select())
            .load::<DividendComputationDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(DividendComputation::try_from)
            .collect()
    }

    fn get_outputs(&self, computation_id: &str) -> Result<Vec<ComputationOutput>> {
        let mut conn = get_connection(&self.pool)?;
        dividend_computation_outputs::table
            .filter(dividend_computation_outputs::dividend_computation_id.eq(computation_id))
            .order(dividend_computation_outputs::position.asc())
            .select(DividendComputationOutputDB::as_select())
            .load::<DividendComputationOutputDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(ComputationOutput::try_from)
            .collect()
    }

    async fn create_computation(
        &self,
        new_computation: NewDividendComputation,
    ) -> Result<DividendComputation> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<DividendComputation> {
                let computation_id = Uuid::now_v7().to_string();
                let computation_db = DividendComputationDB {
                    id: computation_id.clone(),
                    company_id: new_computation.company_id,
                    total_amount_in_usd: new_computation.total_amount_in_usd.to_string(),
                    dividends_issuance_date: new_computation.dividends_issuance_date,
                    return_of_capital: new_computation.return_of_capital,
                    dividend_round_id: None,
                    finalized_at: None,
                    created_at: Utc::now().naive_utc(),
                };

                let inserted = diesel::insert_into(dividend_computations::table)
                    .values(&computation_db)
                    .returning(DividendComputationDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;

                let rows: Vec<DividendComputationOutputDB> = new_computation
                    .outputs
                    .into_iter()
                    .enumerate()
                    .map(|(position, output)| {
                        DividendComputationOutputDB::from_domain(
                            Uuid::now_v7().to_string(),
                            computation_id.clone(),
                            position as i32,
                            output,
                        )
                    })
                    .collect();

                for chunk in rows.chunks(insert_batch_size(OUTPUT_COLUMNS)) {
                    diesel::insert_into(dividend_computation_outputs::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                debug!(
                    "Stored dividend computation {} with {} outputs",
                    computation_id,
                    rows.len()
                );
                inserted.try_into()
            })
            .await
    }
}

pub struct DividendRoundRepository {
    pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
    writer: WriteHandle,
}

impl DividendRoundRepository {
    pub fn new(
        pool: Arc<Pool<r2d2::ConnectionManager<SqliteConnection>>>,
        writer: WriteHandle,
    ) -> Self {
        DividendRoundRepository { pool, writer }
    }
}

#[async_trait]
impl DividendRoundRepositoryTrait for DividendRoundRepository {
    fn get_round(&self, company_id: &str, round_id: &str) -> Result<DividendRound> {
        let mut conn = get_connection(&self.pool)?;
        dividend_rounds::table
            .filter(dividend_rounds::id.eq(round_id))
            .filter(dividend_rounds::company_id.eq(company_id))
            .select(DividendRoundDB::as_select())
            .first::<DividendRoundDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .ok_or_else(|| not_found("Dividend round", round_id))?
            .try_into()
    }

    fn get_dividends_for_round(&self, round_id: &str) -> Result<Vec<Dividend>> {
        let mut conn = get_connection(&self.pool)?;
        dividends::table
            .filter(dividends::dividend_round_id.eq(round_id))
            .order((dividends::created_at, dividends::id))
            .select(DividendDB::as_select())
            .load::<DividendDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(Dividend::try_from)
            .collect()
    }

    async fn create_round_with_dividends(
        &self,
        computation_id: String,
        distribution: NewDistribution,
    ) -> Result<DividendRound> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<DividendRound> {
                let existing_round = dividend_computations::table
                    .find(computation_id.as_str())
                    .select(dividend_computations::dividend_round_id)
                    .first::<Option<String>>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| not_found("Dividend computation", &computation_id))?;

                if let Some(dividend_round_id) = existing_round {
                    return Err(AllocationError::ComputationAlreadyFinalized {
                        computation_id,
                        dividend_round_id,
                    }
                    .into());
                }

                let now = Utc::now().naive_utc();
                let round = distribution.round;
                let round_db = DividendRoundDB {
                    id: Uuid::now_v7().to_string(),
                    company_id: round.company_id,
                    issued_at: round.issued_at,
                    number_of_shares: round.number_of_shares,
                    number_of_shareholders: round.number_of_shareholders,
                    total_amount_in_cents: round.total_amount_in_cents,
                    return_of_capital: round.return_of_capital,
                    status: DividendStatus::Issued.as_str().to_string(),
                    created_at: now,
                };

                let inserted_round = diesel::insert_into(dividend_rounds::table)
                    .values(&round_db)
                    .returning(DividendRoundDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;

                let dividend_rows: Vec<DividendDB> = distribution
                    .dividends
                    .into_iter()
                    .map(|d| DividendDB {
                        id: Uuid::now_v7().to_string(),
                        company_id: inserted_round.company_id.clone(),
                        dividend_round_id: inserted_round.id.clone(),
                        company_investor_id: d.company_investor_id,
                        number_of_shares: d.number_of_shares,
                        total_amount_in_cents: d.total_amount_in_cents,
                        qualified_amount_cents: d.qualified_amount_cents,
                        investment_amount_cents: d.investment_amount_cents,
                        status: DividendStatus::Issued.as_str().to_string(),
                        created_at: now,
                    })
                    .collect();

                for chunk in dividend_rows.chunks(insert_batch_size(DIVIDEND_COLUMNS)) {
                    diesel::insert_into(dividends::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                diesel::update(dividend_computations::table.find(computation_id.as_str()))
                    .set((
                        dividend_computations::dividend_round_id.eq(inserted_round.id.as_str()),
                        dividend_computations::finalized_at.eq(now),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                debug!(
                    "Created dividend round {} with {} dividends from computation {}",
                    inserted_round.id,
                    dividend_rows.len(),
                    computation_id
                );
                inserted_round.try_into()
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use chrono::NaiveDate;
    use flexile_core::dividends::{NewDividend, NewDividendRound, PayeeRef};
    use flexile_core::Error;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    async fn create_test_repositories() -> (
        DividendComputationRepository,
        DividendRoundRepository,
        tempfile::TempDir,
    ) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        let pool = create_pool(&db_path.to_string_lossy()).expect("Failed to create pool");
        run_migrations(&pool).expect("Failed to run migrations");
        let writer = spawn_writer((*pool).clone());
        (
            DividendComputationRepository::new(Arc::clone(&pool), writer.clone()),
            DividendRoundRepository::new(Arc::clone(&pool), writer),
            temp_dir,
        )
    }

    fn output(payee: PayeeRef, total: Decimal) -> ComputationOutput {
        ComputationOutput {
            payee,
            share_class: "Common".to_string(),
            number_of_shares: 100,
            preferred_dividend_amount_in_usd: Decimal::ZERO,
            dividend_amount_in_usd: total,
            total_amount_in_usd: total,
            qualified_dividend_amount_usd: total,
            investment_amount_cents: Some(10_000),
        }
    }

    fn new_computation() -> NewDividendComputation {
        NewDividendComputation {
            company_id: "company-1".to_string(),
            total_amount_in_usd: dec!(1500),
            dividends_issuance_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            return_of_capital: false,
            outputs: vec![
                output(PayeeRef::Investor("inv-2".to_string()), dec!(500)),
                output(PayeeRef::SafeHolder("Seed SAFE".to_string()), dec!(250.25)),
                output(PayeeRef::Investor("inv-1".to_string()), dec!(749.75)),
            ],
        }
    }

    fn distribution() -> NewDistribution {
        NewDistribution {
            round: NewDividendRound {
                company_id: "company-1".to_string(),
                issued_at: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                number_of_shares: 200,
                number_of_shareholders: 2,
                total_amount_in_cents: 150_000,
                return_of_capital: false,
            },
            dividends: vec![
                NewDividend {
                    company_investor_id: "inv-1".to_string(),
                    number_of_shares: Some(100),
                    total_amount_in_cents: 100_000,
                    qualified_amount_cents: 100_000,
                    investment_amount_cents: 10_000,
                },
                NewDividend {
                    company_investor_id: "inv-2".to_string(),
                    number_of_shares: None,
                    total_amount_in_cents: 50_000,
                    qualified_amount_cents: 0,
                    investment_amount_cents: 5_000,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_create_computation_preserves_output_order() {
        let (computations, _, _temp_dir) = create_test_repositories().await;

        let created = computations.create_computation(new_computation()).await.unwrap();
        assert_eq!(created.total_amount_in_usd, dec!(1500));
        assert!(!created.is_finalized());

        let outputs = computations.get_outputs(&created.id).unwrap();
        assert_eq!(outputs, new_computation().outputs);

        let fetched = computations.get_computation("company-1", &created.id).unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_computation_of_other_company_is_not_found() {
        let (computations, _, _temp_dir) = create_test_repositories().await;
        let created = computations.create_computation(new_computation()).await.unwrap();

        let err = computations
            .get_computation("company-2", &created.id)
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(computations.list_computations("company-2").unwrap().is_empty());
        assert_eq!(computations.list_computations("company-1").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_round_links_computation() {
        let (computations, rounds, _temp_dir) = create_test_repositories().await;
        let created = computations.create_computation(new_computation()).await.unwrap();

        let round = rounds
            .create_round_with_dividends(created.id.clone(), distribution())
            .await
            .unwrap();
        assert_eq!(round.status, DividendStatus::Issued);
        assert_eq!(round.total_amount_in_cents, 150_000);

        let dividends = rounds.get_dividends_for_round(&round.id).unwrap();
        assert_eq!(dividends.len(), 2);
        assert!(dividends.iter().all(|d| d.dividend_round_id == round.id));
        assert_eq!(
            dividends.iter().map(|d| d.total_amount_in_cents).sum::<i64>(),
            150_000
        );

        let finalized = computations.get_computation("company-1", &created.id).unwrap();
        assert_eq!(finalized.dividend_round_id.as_deref(), Some(round.id.as_str()));
        assert!(finalized.finalized_at.is_some());

        assert_eq!(rounds.get_round("company-1", &round.id).unwrap(), round);
    }

    #[tokio::test]
    async fn test_second_round_for_same_computation_is_refused() {
        let (computations, rounds, _temp_dir) = create_test_repositories().await;
        let created = computations.create_computation(new_computation()).await.unwrap();

        let first = rounds
            .create_round_with_dividends(created.id.clone(), distribution())
            .await
            .unwrap();
        let err = rounds
            .create_round_with_dividends(created.id.clone(), distribution())
            .await
            .unwrap_err();

        match err {
            Error::Allocation(AllocationError::ComputationAlreadyFinalized {
                dividend_round_id,
                ..
            }) => assert_eq!(dividend_round_id, first.id),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(rounds.get_dividends_for_round(&first.id).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_round_for_unknown_computation_is_not_found() {
        let (_, rounds, _temp_dir) = create_test_repositories().await;
        let err = rounds
            .create_round_with_dividends("missing".to_string(), distribution())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
