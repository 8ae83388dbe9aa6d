use thiserror::Error;

pub type DfResult<T> = Result<T, DfError>;

#[derive(Error, Debug)]
pub enum DfError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invariant violated: {what}")]
    Invariant { what: String },
}
