mod cockpit;
mod setup;

pub use cockpit::{
    FlightReadout, ParkedTarget, attitude_indicator_system, cockpit_toggle_system, readout_system,
};
pub use setup::{setup_cursor, setup_scene};
