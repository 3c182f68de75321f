// One decoder per capture type. Each takes the parsed header and the body
// bytes that follow it and returns an owned payload.

pub mod channel_estimation;
pub mod constellation;
pub mod fec_summary;
pub mod histogram;
pub mod modulation_profile;
pub mod pre_equalization;
pub mod rxmer;
pub mod spectrum;
