pub mod derived;
pub mod event;

pub use derived::{AlertState, Derived};
pub use event::{
    Concerning, Event, EventType, Hazard, Location, MesoscaleDiscussion, Outlook, Report,
    RiskCategory, Warning, Watch, WatchStatus, WatchType,
};
