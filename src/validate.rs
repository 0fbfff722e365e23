// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::{Feedback, TransactionDraft};

pub const FEEDBACK_MIN_CHARS: usize = 10;
pub const FEEDBACK_MAX_CHARS: usize = 200;

pub fn feedback(message: &str, rating: u8) -> Result<Feedback, ValidationError> {
    let message = message.trim();
    let len = message.chars().count();
    if !(FEEDBACK_MIN_CHARS..=FEEDBACK_MAX_CHARS).contains(&len) {
        return Err(ValidationError::FeedbackLength {
            len,
            min: FEEDBACK_MIN_CHARS,
            max: FEEDBACK_MAX_CHARS,
        });
    }
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::RatingOutOfRange(rating));
    }
    Ok(Feedback {
        message: message.to_string(),
        rating,
    })
}

pub fn transaction_draft(draft: &TransactionDraft) -> Result<(), ValidationError> {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::MissingField("name"));
    }
    if draft.amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount(draft.amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_bounds_are_inclusive() {
        assert!(feedback(&"a".repeat(10), 5).is_ok());
        assert!(feedback(&"a".repeat(200), 1).is_ok());
        assert_eq!(
            feedback("too short", 3).unwrap_err(),
            ValidationError::FeedbackLength {
                len: 9,
                min: 10,
                max: 200
            }
        );
        assert!(feedback(&"a".repeat(201), 3).is_err());
    }

    #[test]
    fn feedback_rating_must_be_one_to_five() {
        assert_eq!(
            feedback("Healthy guppies, fast delivery", 0).unwrap_err(),
            ValidationError::RatingOutOfRange(0)
        );
    }
}
