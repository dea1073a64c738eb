use crate::error::PaymentRequestError;
use chrono::{DateTime, Utc};
use rateio_domain::{MemberId, Money, Settlement, SuggestedPayment};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentRequestStatus {
    Pending,
    Confirmed,
    Rejected,
}

impl PaymentRequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, PaymentRequestStatus::Pending)
    }
}

impl fmt::Display for PaymentRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentRequestStatus::Pending => f.write_str("pending"),
            PaymentRequestStatus::Confirmed => f.write_str("confirmed"),
            PaymentRequestStatus::Rejected => f.write_str("rejected"),
        }
    }
}

/// A proposed transfer awaiting the receiver's confirmation.
///
/// Only a confirmed request becomes a [`Settlement`]; balances never see
/// pending or rejected requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    pub id: u64,
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
    status: PaymentRequestStatus,
}

impl PaymentRequest {
    pub fn new(
        id: u64,
        from: MemberId,
        to: MemberId,
        amount: Money,
    ) -> Result<Self, PaymentRequestError> {
        if from == to {
            return Err(PaymentRequestError::SelfPayment { member_id: from });
        }
        if amount <= Money::ZERO {
            return Err(PaymentRequestError::NonPositiveAmount { amount });
        }
        Ok(Self {
            id,
            from,
            to,
            amount,
            status: PaymentRequestStatus::Pending,
        })
    }

    pub fn from_suggestion(
        id: u64,
        suggestion: &SuggestedPayment,
    ) -> Result<Self, PaymentRequestError> {
        Self::new(
            id,
            suggestion.from.clone(),
            suggestion.to.clone(),
            suggestion.amount,
        )
    }

    pub fn status(&self) -> PaymentRequestStatus {
        self.status
    }

    pub fn confirm(&mut self, at: DateTime<Utc>) -> Result<Settlement, PaymentRequestError> {
        self.transition(PaymentRequestStatus::Confirmed)?;
        Ok(Settlement {
            from: self.from.clone(),
            to: self.to.clone(),
            amount: self.amount,
            settled_at: at,
        })
    }

    pub fn reject(&mut self) -> Result<(), PaymentRequestError> {
        self.transition(PaymentRequestStatus::Rejected)
    }

    fn transition(&mut self, next: PaymentRequestStatus) -> Result<(), PaymentRequestError> {
        if self.status.is_terminal() {
            return Err(PaymentRequestError::AlreadyResolved {
                id: self.id,
                status: self.status,
            });
        }
        tracing::debug!(
            request_id = self.id,
            from = %self.from,
            to = %self.to,
            status = %next,
            "Payment request resolved"
        );
        self.status = next;
        Ok(())
    }
}
