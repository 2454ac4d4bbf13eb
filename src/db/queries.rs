use sqlx::{PgPool, Postgres, Result, Transaction as SqlxTransaction};

use crate::db::models::{Payment, PaymentStatus};
use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use uuid::Uuid;

pub async fn insert_payment(pool: &PgPool, payment: &Payment) -> Result<Payment> {
    sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (
            id, transaction_reference, user_email, amount, status,
            payment_channel, currency, initiated_at, completed_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(payment.id)
    .bind(&payment.transaction_reference)
    .bind(&payment.user_email)
    .bind(&payment.amount)
    .bind(payment.status)
    .bind(&payment.payment_channel)
    .bind(&payment.currency)
    .bind(payment.initiated_at)
    .bind(payment.completed_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_user_email(pool: &PgPool, email: &str) -> Result<Vec<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE user_email = $1")
        .bind(email)
        .fetch_all(pool)
        .await
}

pub async fn find_by_reference(pool: &PgPool, reference: &str) -> Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE transaction_reference = $1")
        .bind(reference)
        .fetch_optional(pool)
        .await
}

/// Row-locked lookup used during reconciliation. Concurrent verifications of
/// the same reference serialize on the lock, so the read-modify-write below
/// cannot interleave.
pub async fn lock_by_user_email_and_reference(
    executor: &mut SqlxTransaction<'_, Postgres>,
    email: &str,
    reference: &str,
) -> Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>(
        r#"
        SELECT * FROM payments
        WHERE user_email = $1 AND transaction_reference = $2
        FOR UPDATE
        "#,
    )
    .bind(email)
    .bind(reference)
    .fetch_optional(&mut **executor)
    .await
}

pub async fn apply_verification(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    status: PaymentStatus,
    channel: &str,
    amount: &BigDecimal,
    currency: &str,
    completed_at: Option<NaiveDateTime>,
) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE payments
        SET status = $1, payment_channel = $2, amount = $3, currency = $4, completed_at = $5
        WHERE id = $6
        "#,
    )
    .bind(status)
    .bind(channel)
    .bind(amount)
    .bind(currency)
    .bind(completed_at)
    .bind(id)
    .execute(&mut **executor)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_db() -> PgPool {
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to connect to test DB");
        let migrator = sqlx::migrate::Migrator::new(std::path::Path::new("./migrations"))
            .await
            .expect("Failed to load migrations");
        migrator
            .run(&pool)
            .await
            .expect("Failed to run migrations on test DB");
        pool
    }

    #[tokio::test]
    #[ignore] // needs DATABASE_URL pointing at a scratch database
    async fn test_insert_and_find_by_reference() {
        let pool = setup_test_db().await;

        let payment = Payment::new(
            format!("ref-{}", Uuid::new_v4()),
            "user@example.com".to_string(),
            "500.00".parse().unwrap(),
        );
        let inserted = insert_payment(&pool, &payment).await.unwrap();
        assert_eq!(inserted.transaction_reference, payment.transaction_reference);
        assert_eq!(inserted.status, PaymentStatus::Pending);

        let fetched = find_by_reference(&pool, &payment.transaction_reference)
            .await
            .unwrap()
            .expect("payment should exist");
        assert_eq!(fetched.id, inserted.id);
    }

    #[tokio::test]
    #[ignore] // needs DATABASE_URL pointing at a scratch database
    async fn test_apply_verification_overwrites_fields() {
        let pool = setup_test_db().await;

        let payment = Payment::new(
            format!("ref-{}", Uuid::new_v4()),
            "user@example.com".to_string(),
            "500.00".parse().unwrap(),
        );
        let inserted = insert_payment(&pool, &payment).await.unwrap();

        let mut tx = pool.begin().await.unwrap();
        let locked =
            lock_by_user_email_and_reference(&mut tx, "user@example.com", &payment.transaction_reference)
                .await
                .unwrap()
                .expect("row should lock");
        apply_verification(
            &mut tx,
            locked.id,
            PaymentStatus::Successful,
            "card",
            &BigDecimal::from(50000),
            "NGN",
            Some("2024-02-02T08:00:00".parse().unwrap()),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();

        let updated = find_by_reference(&pool, &payment.transaction_reference)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, PaymentStatus::Successful);
        assert_eq!(updated.payment_channel.as_deref(), Some("card"));
        assert_eq!(updated.amount, BigDecimal::from(50000));
        assert_eq!(inserted.id, updated.id);
    }
}
