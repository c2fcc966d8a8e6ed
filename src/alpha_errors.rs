use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlphaError {
    #[error("Unable to parse coordinate: {0}")]
    ParseError(String),

    #[error("{quantity} out of range: {value} not in [{min}, {max}]")]
    RangeError {
        quantity: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Gaussian sampler construction failed: {0:?}")]
    NoiseInjectionError(rand_distr::NormalError),

    #[error("Error while reading the sight-line catalog: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),
}

impl AlphaError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        AlphaError::ValidationError(msg.into())
    }
}

impl From<rand_distr::NormalError> for AlphaError {
    fn from(err: rand_distr::NormalError) -> Self {
        AlphaError::NoiseInjectionError(err)
    }
}

impl PartialEq for AlphaError {
    fn eq(&self, other: &Self) -> bool {
        use AlphaError::*;
        match (self, other) {
            (ParseError(a), ParseError(b)) => a == b,
            (
                RangeError {
                    quantity: qa,
                    value: va,
                    min: mina,
                    max: maxa,
                },
                RangeError {
                    quantity: qb,
                    value: vb,
                    min: minb,
                    max: maxb,
                },
            ) => qa == qb && va == vb && mina == minb && maxa == maxb,
            (ValidationError(a), ValidationError(b)) => a == b,
            (NoiseInjectionError(a), NoiseInjectionError(b)) => a == b,

            // Not comparable: equal when the variant matches
            (CsvError(_), CsvError(_)) => true,
            (IoError(_), IoError(_)) => true,

            _ => false,
        }
    }
}
