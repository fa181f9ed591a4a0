use crate::domain::account::{
    Account, Amount, MoneyTransaction, TransactionKind, TransactionStatus,
};
use crate::domain::ports::StoreRef;
use crate::error::{CommerceError, Result};
use crate::infrastructure::locks::LockRegistry;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Mutates account balances with an audit trail.
///
/// Every balance change runs under the account's registry lock and one
/// storage transaction: the current balance is read with a row lock, a
/// `Processing` audit row is inserted before the balance write, and the
/// row is finalized to `Success` or `Failed` in the same commit. A
/// failed attempt still commits its audit row; only pure input
/// validation leaves no trace.
#[derive(Clone)]
pub struct LedgerEngine {
    store: StoreRef,
    locks: Arc<LockRegistry>,
}

impl LedgerEngine {
    pub fn new(store: StoreRef, locks: Arc<LockRegistry>) -> Self {
        Self { store, locks }
    }

    /// Opens the user's account. One account per user.
    #[instrument(skip(self))]
    pub async fn create_account(&self, user_id: Uuid) -> Result<Account> {
        if self.store.get_account_by_user(user_id).await?.is_some() {
            return Err(CommerceError::AccountAlreadyExists);
        }
        let account = Account::new(user_id);
        self.store.insert_account(account.clone()).await?;
        info!(account_id = %account.id, %user_id, "account created");
        Ok(account)
    }

    pub async fn get_account(&self, account_id: Uuid) -> Result<Account> {
        self.store
            .get_account(account_id)
            .await?
            .ok_or(CommerceError::AccountNotFound)
    }

    #[instrument(skip(self, description))]
    pub async fn deposit(
        &self,
        account_id: Uuid,
        amount: i64,
        description: &str,
    ) -> Result<MoneyTransaction> {
        self.apply(account_id, amount, TransactionKind::Deposit, description)
            .await
    }

    #[instrument(skip(self, description))]
    pub async fn withdraw(
        &self,
        account_id: Uuid,
        amount: i64,
        description: &str,
    ) -> Result<MoneyTransaction> {
        self.apply(account_id, amount, TransactionKind::Withdraw, description)
            .await
    }

    async fn apply(
        &self,
        account_id: Uuid,
        amount: i64,
        kind: TransactionKind,
        description: &str,
    ) -> Result<MoneyTransaction> {
        // Fail fast before any lock or transaction is taken.
        let amount = Amount::new(amount)?;

        // Serializes the read-then-write against other in-process
        // requests on the same account; requests on other accounts
        // proceed in parallel.
        let _account_lock = self.locks.acquire(&format!("account:{account_id}")).await;

        let mut tx = self.store.begin().await?;
        let account = tx.account_for_update(account_id).await?;

        let mut record = MoneyTransaction::processing(account_id, amount, kind, description);
        tx.insert_money_transaction(record.clone()).await?;

        let new_balance = match kind {
            TransactionKind::Deposit => match account.balance.checked_add(amount.value()) {
                Some(balance) => balance,
                None => {
                    tx.set_money_transaction_status(record.id, TransactionStatus::Failed)
                        .await?;
                    tx.commit().await?;
                    warn!(%account_id, "deposit rejected: balance overflow");
                    return Err(CommerceError::Storage("account balance overflow".into()));
                }
            },
            TransactionKind::Withdraw => {
                if account.balance < amount.value() {
                    // The attempt is still recorded: commit the failed
                    // audit row, leave the balance untouched.
                    tx.set_money_transaction_status(record.id, TransactionStatus::Failed)
                        .await?;
                    tx.commit().await?;
                    return Err(CommerceError::InsufficientBalance {
                        available: account.balance,
                        requested: amount.value(),
                    });
                }
                account.balance - amount.value()
            }
        };

        if let Err(err) = tx.update_balance(account_id, new_balance).await {
            tx.set_money_transaction_status(record.id, TransactionStatus::Failed)
                .await?;
            tx.commit().await?;
            warn!(%account_id, error = %err, "balance write failed, audit row committed");
            return Err(err);
        }

        tx.set_money_transaction_status(record.id, TransactionStatus::Success)
            .await?;
        tx.commit().await?;

        record.status = TransactionStatus::Success;
        info!(
            %account_id,
            transaction_id = %record.id,
            amount = record.amount,
            ?kind,
            new_balance,
            "ledger transaction committed"
        );
        Ok(record)
    }
}
