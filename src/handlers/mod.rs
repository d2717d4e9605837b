//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (JSON body, URL params, etc.)
//! 2. Checks the caller's role where the endpoint is role-specific
//! 3. Delegates to a service or runs a single query
//! 4. Returns HTTP response (JSON, status code)

/// Admin-only views
pub mod admin;
/// Artist profiles and availability
pub mod artists;
/// Booking lifecycle
pub mod bookings;
/// Conversations and messages
pub mod conversations;
/// Personal ledger and earnings summary
pub mod finance;
pub mod health;
/// Off-platform gigs and the merged calendar
pub mod manual_gigs;
pub mod musicians;
/// Direct venue-to-artist offers
pub mod offers;
/// Open gig board and applications
pub mod open_gigs;
/// Server-sent event feed
pub mod realtime;
pub mod referrals;
pub mod special_prices;
/// Registration and identity
pub mod users;
pub mod venues;
