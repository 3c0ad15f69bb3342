//! Payment persistence seam
//!
//! The processor talks to storage through [`PaymentRepository`] so the
//! in-memory implementation can be replaced by a transactional store.
//! Updates carry the expected version; a mismatch means another caller got
//! there first and nothing is written.

use crate::{Error, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use payment_core::Payment;
use uuid::Uuid;

/// Payment store
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Insert a new payment; fails if the id already exists
    async fn insert(&self, payment: Payment) -> Result<()>;

    /// Fetch a payment by id
    async fn get(&self, payment_id: Uuid) -> Result<Payment>;

    /// Store `payment` if the stored version still equals
    /// `expected_version`, bumping the version; fails with a conflict
    /// otherwise
    async fn update(&self, payment: Payment, expected_version: u64) -> Result<Payment>;

    /// All payments, oldest first
    async fn list(&self) -> Result<Vec<Payment>>;

    /// Look up a payment by its idempotency key
    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>>;
}

/// In-memory repository backed by concurrent maps
#[derive(Default)]
pub struct InMemoryPaymentRepository {
    payments: DashMap<Uuid, Payment>,
    idempotency: DashMap<String, Uuid>,
}

impl InMemoryPaymentRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored payments
    pub fn len(&self) -> usize {
        self.payments.len()
    }

    /// Check whether the repository is empty
    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn insert(&self, payment: Payment) -> Result<()> {
        if self.payments.contains_key(&payment.id) {
            return Err(Error::Conflict(format!(
                "payment {} already exists",
                payment.id
            )));
        }
        if let Some(key) = &payment.idempotency_key {
            self.idempotency.insert(key.clone(), payment.id);
        }
        self.payments.insert(payment.id, payment);
        Ok(())
    }

    async fn get(&self, payment_id: Uuid) -> Result<Payment> {
        self.payments
            .get(&payment_id)
            .map(|entry| entry.clone())
            .ok_or(Error::NotFound(payment_id))
    }

    async fn update(&self, payment: Payment, expected_version: u64) -> Result<Payment> {
        let mut entry = self
            .payments
            .get_mut(&payment.id)
            .ok_or(Error::NotFound(payment.id))?;

        if entry.version != expected_version {
            return Err(Error::Conflict(format!(
                "payment {} is at version {}, expected {}",
                payment.id, entry.version, expected_version
            )));
        }

        let mut updated = payment;
        updated.version = expected_version + 1;
        *entry = updated.clone();
        Ok(updated)
    }

    async fn list(&self) -> Result<Vec<Payment>> {
        let mut payments: Vec<Payment> = self
            .payments
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        payments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(payments)
    }

    async fn find_by_idempotency_key(&self, key: &str) -> Result<Option<Payment>> {
        match self.idempotency.get(key) {
            Some(entry) => Ok(Some(self.get(*entry.value()).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use payment_core::{BuilderConfig, Currency, PaymentBuilder, PaymentMethod, PaymentRequest};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn payment(idempotency_key: Option<&str>) -> Payment {
        let builder = PaymentBuilder::new(BuilderConfig::default()).unwrap();
        let request = PaymentRequest {
            amount: dec!(75.00),
            currency: Currency::USD,
            taxes: Decimal::ZERO,
            discounts: Decimal::ZERO,
            fees: Decimal::ZERO,
            insurance_covered: Decimal::ZERO,
            method: PaymentMethod::Cash,
            save_payment_method: false,
            accepted_terms: true,
            patient_id: None,
            idempotency_key: idempotency_key.map(str::to_string),
        };
        builder.build(&request, Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = InMemoryPaymentRepository::new();
        let payment = payment(None);
        let id = payment.id;

        assert!(repo.is_empty());
        repo.insert(payment).await.unwrap();
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.get(id).await.unwrap().id, id);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let repo = InMemoryPaymentRepository::new();
        let payment = payment(None);

        repo.insert(payment.clone()).await.unwrap();
        assert!(matches!(
            repo.insert(payment).await,
            Err(Error::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let repo = InMemoryPaymentRepository::new();
        assert!(matches!(
            repo.get(Uuid::new_v4()).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_optimistic_locking() {
        let repo = InMemoryPaymentRepository::new();
        let payment = payment(None);
        repo.insert(payment.clone()).await.unwrap();

        let updated = repo.update(payment.clone(), 1).await.unwrap();
        assert_eq!(updated.version, 2);

        // stale expected version loses
        assert!(matches!(
            repo.update(payment, 1).await,
            Err(Error::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_idempotency_lookup() {
        let repo = InMemoryPaymentRepository::new();
        let payment = payment(Some("retry-abc"));
        let id = payment.id;
        repo.insert(payment).await.unwrap();

        let found = repo.find_by_idempotency_key("retry-abc").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(id));
        assert!(repo
            .find_by_idempotency_key("unknown")
            .await
            .unwrap()
            .is_none());
    }
}
