// Signal analysis over decoded payloads

pub mod aggregate;
pub mod butterworth;
pub mod capacity;
pub mod echo;
pub mod group_delay;
pub mod report;
pub mod smoothing;
pub mod statistics;
