//! Error types for model lighting configuration.

use thiserror::Error;

/// Errors raised while configuring a model's lighting state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LightingError {
    #[error("spherical harmonics require exactly 9 coefficients, got {0}")]
    InvalidSphericalHarmonics(usize),
    #[error("lighting factor component '{component}' is {value}, expected a value in [0, 1]")]
    LightingFactorOutOfRange { component: char, value: f32 },
}

pub type LightingResult<T> = Result<T, LightingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_offending_value() {
        let err = LightingError::InvalidSphericalHarmonics(4);
        assert_eq!(
            err.to_string(),
            "spherical harmonics require exactly 9 coefficients, got 4"
        );

        let err = LightingError::LightingFactorOutOfRange {
            component: 'x',
            value: 1.5,
        };
        assert!(err.to_string().contains("'x'"));
        assert!(err.to_string().contains("1.5"));
    }
}
