mod common;
pub use self::common::{DateRange, Query, DATE_FORMAT};

mod search;
pub use self::search::{DetailParams, SearchParams};
