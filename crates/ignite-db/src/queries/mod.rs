mod categories;
mod comments;
mod ideas;
mod users;
mod votes;

use anyhow::Result;

/// SQL expression producing the same timestamp format as the column defaults.
const NOW: &str = "strftime('%Y-%m-%d %H:%M:%f', 'now')";

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
