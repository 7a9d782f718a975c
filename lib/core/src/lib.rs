//! Core domain types and utilities for the clubhouse client.
//!
//! This crate provides the identifier newtypes for server-assigned entity IDs
//! and the `Result` alias used at application boundaries.

pub mod error;
pub mod id;

pub use error::{Result, UNREACHABLE_MESSAGE};
pub use id::{
    AccountId, AttendanceId, CategoryId, EventId, FeeId, ItemId, LoanId, MemberId, PostId,
    ProgressId, RawId, TransactionId, UnitId, UserId,
};
