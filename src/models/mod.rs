//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables,
//! plus the request and response bodies built around them.

/// API key authentication model
pub mod api_key;
/// Artist profiles
pub mod artist;
/// Bookings and their enriched views
pub mod booking;
/// Conversations and messages
pub mod chat;
/// Personal ledger and platform transactions
pub mod finance;
/// Manual gigs and the calendar view
pub mod manual_gig;
/// Freelance musician profiles
pub mod musician;
/// Direct offers and open gigs
pub mod offer;
/// Shared profile helpers
pub mod profile;
/// Referral rewards
pub mod referral;
/// Per-date artist pricing
pub mod special_price;
/// Users and roles
pub mod user;
/// Venue profiles
pub mod venue;
