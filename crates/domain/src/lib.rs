pub mod activity;
pub mod resource;
pub mod slot;

pub use activity::{Activity, ActivityType, Frequency, FrequencyPattern, Location, TimeWindow};
pub use resource::{
    AvailabilityBlock, Equipment, MaintenanceWindow, Specialist, SpecialistType, TravelPeriod,
};
pub use slot::{SlotStatus, TimeSlot};
