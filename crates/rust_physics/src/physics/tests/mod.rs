//! Multi-step scenarios exercising integration and collision together

mod resting_contact;
mod ramp;
