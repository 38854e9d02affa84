use polars::error::PolarsError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors raised by registry operations.
///
/// Lookup and validation failures are explicit variants; everything the
/// underlying engines report passes through unchanged via the transparent
/// wrappers.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no table named '{0}'")]
    TableNotFound(String),

    #[error("no database connection named '{0}'")]
    ConnectionNotFound(String),

    #[error("unsupported file format '{0}'")]
    UnsupportedFormat(String),

    #[error("unsupported connection descriptor '{0}': expected a sqlite path or sqlite:// URL")]
    UnsupportedDescriptor(String),

    #[error("worksheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("column not found: {column} ({context})")]
    ColumnNotFound { column: String, context: String },

    #[error("no input tables resolved for combine into '{0}'")]
    EmptyCombine(String),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Excel(#[from] calamine::Error),

    #[error(transparent)]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    pub fn column_not_found(column: impl Into<String>, context: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
            context: context.into(),
        }
    }
}
