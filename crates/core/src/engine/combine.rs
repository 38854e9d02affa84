use polars::functions::concat_df_diagonal;
use polars::prelude::DataFrame;

use crate::error::Result;

/// Concatenate the rows of `frames` in order. Columns are unioned by
/// label; a frame missing a column contributes nulls for it.
pub fn combine_frames(frames: &[DataFrame]) -> Result<DataFrame> {
    Ok(concat_df_diagonal(frames)?)
}
