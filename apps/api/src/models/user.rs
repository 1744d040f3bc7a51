use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered account. Billing columns are written by the Stripe webhook
/// service and only read here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub subscription_status: Option<String>,
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub lifetime_access: bool,
    pub total_paid: f64,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Active subscription or lifetime purchase.
    pub fn has_premium_access(&self) -> bool {
        self.subscription_status.as_deref() == Some("active") || self.lifetime_access
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(status: Option<&str>, lifetime: bool) -> UserRow {
        UserRow {
            id: 1,
            email: "writer@example.com".to_string(),
            stripe_customer_id: None,
            stripe_subscription_id: None,
            subscription_status: status.map(String::from),
            subscription_end_date: None,
            lifetime_access: lifetime,
            total_paid: 0.0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_active_subscription_is_premium() {
        assert!(user(Some("active"), false).has_premium_access());
    }

    #[test]
    fn test_lifetime_access_is_premium_without_subscription() {
        assert!(user(None, true).has_premium_access());
        assert!(user(Some("canceled"), true).has_premium_access());
    }

    #[test]
    fn test_lapsed_subscription_is_not_premium() {
        assert!(!user(Some("past_due"), false).has_premium_access());
        assert!(!user(None, false).has_premium_access());
    }
}
