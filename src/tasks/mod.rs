//! Background tasks module
//!
//! This module contains the repeating countdown task owned by the timer.

pub mod countdown;

pub(crate) use countdown::countdown_task;
