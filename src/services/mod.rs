//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They own the database transactions for multi-row changes and publish
//! realtime events once those transactions commit.

pub mod booking_service;
pub mod chat_service;
pub mod finance_service;
pub mod manual_gig_service;
pub mod offer_service;
pub mod referral_service;
