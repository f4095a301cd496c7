mod ids;
mod time;

pub use ids::{ActivityId, EquipmentId, SpecialistId, TravelPeriodId};
pub use time::{minute_of_day, time_from_minute, weekday_index, MinuteSpan};
