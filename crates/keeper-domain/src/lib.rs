mod batch;
mod calendar;
mod catalog;
mod category;
mod id_ranges;
mod pair_id;

pub use batch::partition;
pub use calendar::{CalendarPolicy, SessionWindow};
pub use catalog::{Catalog, MonitoredSet, RangeRule};
pub use category::Category;
pub use id_ranges::expand_id_ranges;
pub use pair_id::PairId;
