//! Payments received from or on behalf of a patient

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Mpesa,
    Card,
    BankTransfer,
    Insurance,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Mpesa => "mpesa",
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
            Self::Insurance => "insurance",
            Self::Other => "other",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            "mpesa" => Ok(Self::Mpesa),
            "card" => Ok(Self::Card),
            "bank_transfer" => Ok(Self::BankTransfer),
            "insurance" => Ok(Self::Insurance),
            "other" => Ok(Self::Other),
            other => Err(format!("Invalid payment method '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    #[default]
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    /// Pending settles or fails; only a completed payment can be refunded.
    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        match (self, next) {
            (Self::Pending, Self::Completed | Self::Failed) => true,
            (Self::Completed, Self::Refunded) => true,
            (current, next) => *current == next,
        }
    }

    /// Whether the amount counts towards the invoice's paid total.
    pub fn settles(&self) -> bool {
        *self == Self::Completed
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(format!("Invalid payment status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Payment {
    pub id: String,
    /// Human-facing `PAY-` reference, unique.
    pub payment_reference: String,
    pub patient_id: String,
    pub invoice_id: Option<String>,
    pub amount: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Reference issued by the card processor, bank or mobile money provider.
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    /// User who recorded the payment.
    pub processed_by: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub patient_id: String,
    pub invoice_id: Option<String>,
    pub amount: i64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,
    pub processed_by: Option<String>,
    pub payment_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refunds_only_follow_completion() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Failed));
        assert!(Completed.can_transition_to(Refunded));
        assert!(!Pending.can_transition_to(Refunded));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Refunded.can_transition_to(Completed));
    }

    #[test]
    fn bank_transfer_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::BankTransfer).unwrap(),
            "\"bank_transfer\""
        );
        assert_eq!("bank_transfer".parse(), Ok(PaymentMethod::BankTransfer));
    }
}
