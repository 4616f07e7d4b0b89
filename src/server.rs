// src/server.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::{Stream, StreamExt};
use tonic::transport::Server;
use tonic::transport::server::Router;
use tonic::{Request, Response, Status};

use crate::domain::{Account, Trxn};
use crate::error::LedgerError;
use crate::ledger::{AccountService, TrxnCreator, TrxnReader};
use crate::money::Amount;
use crate::proto::google::r#type::Date;
use crate::proto::ledger::v1 as pb;
use crate::store::LedgerStore;

use pb::account_api_server::{AccountApi, AccountApiServer};
use pb::transaction_api_server::{TransactionApi, TransactionApiServer};

// ==============================================================================
// Wire <-> domain conversions
// ==============================================================================

fn timestamp(at: DateTime<Utc>) -> prost_types::Timestamp {
    prost_types::Timestamp {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos() as i32,
    }
}

fn account_to_proto(account: Account) -> pb::Account {
    pb::Account {
        account_id: account.external_id,
        balance: Some(account.balance.to_money()),
        version: account.version,
        created_at: Some(timestamp(account.created_at)),
        updated_at: account.updated_at.map(timestamp),
    }
}

fn trxn_to_proto(trxn: Trxn) -> pb::Transaction {
    pb::Transaction {
        operation_id: trxn.operation_id,
        account_id: trxn.account_external_id,
        value_date: Some(Date {
            year: trxn.value_date.year(),
            month: trxn.value_date.month() as i32,
            day: trxn.value_date.day() as i32,
        }),
        amount: Some(trxn.amount.to_money()),
        created_at: Some(timestamp(trxn.created_at)),
    }
}

/// Only full calendar dates are accepted as value dates; the partial forms
/// `google.type.Date` allows (year 0, month 0 or day 0) are rejected.
fn value_date_from_proto(date: Option<Date>) -> Result<NaiveDate, LedgerError> {
    let date = date.ok_or_else(|| LedgerError::InvalidArgument("value_date is required".into()))?;
    let invalid = || {
        LedgerError::InvalidArgument(format!(
            "value_date {:04}-{:02}-{:02} is not a valid calendar date",
            date.year, date.month, date.day
        ))
    };

    if !(1..=9999).contains(&date.year) || date.month < 1 || date.day < 1 {
        return Err(invalid());
    }
    NaiveDate::from_ymd_opt(date.year, date.month as u32, date.day as u32).ok_or_else(invalid)
}

// ==============================================================================
// gRPC service
// ==============================================================================

pub struct LedgerService {
    accounts: AccountService,
    creator: TrxnCreator,
    reader: TrxnReader,
}

impl LedgerService {
    pub fn new(store: Arc<dyn LedgerStore>, max_post_attempts: u32) -> Self {
        Self {
            accounts: AccountService::new(store.clone()),
            creator: TrxnCreator::new(store.clone(), max_post_attempts),
            reader: TrxnReader::new(store),
        }
    }
}

/// Mounts both APIs on a fresh tonic server.
pub fn grpc_router(service: Arc<LedgerService>) -> Router {
    Server::builder()
        .add_service(AccountApiServer::from_arc(service.clone()))
        .add_service(TransactionApiServer::from_arc(service))
}

#[tonic::async_trait]
impl AccountApi for LedgerService {
    async fn create_account(
        &self,
        request: Request<pb::CreateAccountRequest>,
    ) -> Result<Response<pb::Account>, Status> {
        let req = request.into_inner();
        let account = self.accounts.create(&req.account_id, &req.currency).await?;
        Ok(Response::new(account_to_proto(account)))
    }

    async fn get_account(
        &self,
        request: Request<pb::GetAccountRequest>,
    ) -> Result<Response<pb::Account>, Status> {
        let req = request.into_inner();
        let account = self.accounts.get(&req.account_id).await?;
        Ok(Response::new(account_to_proto(account)))
    }

    async fn get_balance(
        &self,
        request: Request<pb::GetBalanceRequest>,
    ) -> Result<Response<pb::GetBalanceResponse>, Status> {
        let req = request.into_inner();
        let account = self.accounts.get(&req.account_id).await?;
        Ok(Response::new(pb::GetBalanceResponse {
            balance: Some(account.balance.to_money()),
            version: account.version,
        }))
    }
}

type TransactionStream = Pin<Box<dyn Stream<Item = Result<pb::Transaction, Status>> + Send>>;

#[tonic::async_trait]
impl TransactionApi for LedgerService {
    async fn create_transaction(
        &self,
        request: Request<pb::CreateTransactionRequest>,
    ) -> Result<Response<pb::CreateTransactionResponse>, Status> {
        let req = request.into_inner();

        let money = req
            .amount
            .ok_or_else(|| LedgerError::InvalidArgument("amount is required".into()))?;
        let amount = Amount::from_money(&money).map_err(LedgerError::from)?;
        let value_date = value_date_from_proto(req.value_date)?;

        let result = self
            .creator
            .create(&req.account_id, amount, &req.operation_id, value_date)
            .await?;

        Ok(Response::new(pb::CreateTransactionResponse {
            transaction: Some(trxn_to_proto(result.trxn)),
            created: result.created,
        }))
    }

    async fn get_transaction(
        &self,
        request: Request<pb::GetTransactionRequest>,
    ) -> Result<Response<pb::Transaction>, Status> {
        let req = request.into_inner();
        let trxn = self.reader.get(&req.operation_id).await?;
        Ok(Response::new(trxn_to_proto(trxn)))
    }

    type ListTransactionsStream = TransactionStream;

    async fn list_transactions(
        &self,
        request: Request<pb::ListTransactionsRequest>,
    ) -> Result<Response<Self::ListTransactionsStream>, Status> {
        let req = request.into_inner();
        let trxns = self.reader.list(&req.account_id, req.page_size).await?;

        let stream = trxns.map(|item| item.map(trxn_to_proto).map_err(Status::from));
        Ok(Response::new(Box::pin(stream) as Self::ListTransactionsStream))
    }
}
