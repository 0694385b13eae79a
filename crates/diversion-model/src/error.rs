//! Error types for the diversion data model

use crate::disposition::DispositionClass;

/// Errors raised when caller-supplied data violates the model's contracts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// A weight was negative where a non-negative value is required
    #[error("invalid input: {field} must be non-negative, got {value}")]
    NegativeWeight {
        /// Which value was rejected
        field: String,
        /// The rejected value
        value: f64,
    },

    /// A weight was NaN or infinite
    #[error("invalid input: {field} must be a finite number, got {value}")]
    NonFiniteWeight {
        /// Which value was rejected
        field: String,
        /// The rejected value
        value: f64,
    },

    /// A disposition class string did not match any known class
    #[error("unknown disposition class: '{0}'")]
    UnknownDisposition(String),

    /// A record label was empty after trimming
    #[error("record label must not be empty")]
    EmptyLabel,

    /// A record was filed under a bucket of a different class
    #[error("record '{record}' has class {class} but was filed under {bucket}")]
    BucketMismatch {
        /// Bucket the record was found in
        bucket: DispositionClass,
        /// Label of the misfiled record
        record: String,
        /// The record's own class
        class: DispositionClass,
    },
}

impl ModelError {
    /// Check that `value` is a finite, non-negative weight.
    ///
    /// # Errors
    /// Returns [`ModelError::NonFiniteWeight`] or [`ModelError::NegativeWeight`].
    pub fn check_weight(field: impl Into<String>, value: f64) -> Result<f64, ModelError> {
        if !value.is_finite() {
            return Err(ModelError::NonFiniteWeight {
                field: field.into(),
                value,
            });
        }
        if value < 0.0 {
            return Err(ModelError::NegativeWeight {
                field: field.into(),
                value,
            });
        }
        Ok(value)
    }

    /// True for errors caused by a bad numeric value
    #[inline]
    #[must_use]
    pub fn is_weight_error(&self) -> bool {
        matches!(
            self,
            Self::NegativeWeight { .. } | Self::NonFiniteWeight { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_weight_accepts_zero_and_positive() {
        assert_eq!(ModelError::check_weight("kg", 0.0), Ok(0.0));
        assert_eq!(ModelError::check_weight("kg", 12.5), Ok(12.5));
    }

    #[test]
    fn check_weight_rejects_negative() {
        let err = ModelError::check_weight("recycled", -1.0).unwrap_err();
        assert!(err.is_weight_error());
        assert!(err.to_string().contains("recycled"));
    }

    #[test]
    fn check_weight_rejects_nan_and_infinity() {
        assert!(matches!(
            ModelError::check_weight("kg", f64::NAN),
            Err(ModelError::NonFiniteWeight { .. })
        ));
        assert!(matches!(
            ModelError::check_weight("kg", f64::INFINITY),
            Err(ModelError::NonFiniteWeight { .. })
        ));
    }
}
