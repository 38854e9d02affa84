pub mod aggregate;
pub mod combine;
pub mod filter;
pub mod join;

pub(crate) use filter::ensure_columns_exist;
