//! This module contains the force-directed layout: the cooling schedule and
//! the calculator that drives the simulation.

pub mod calculator;
pub mod schedule;

pub use calculator::{iteration, ForcedCalculator, RunReport, StopHandle};
pub use schedule::CoolingSchedule;
