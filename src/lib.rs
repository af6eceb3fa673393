//! # Portico
//!
//! `portico` is a small account service: users register with an email, a
//! display name and a password, log in to obtain a signed bearer token, and
//! present that token to read their profile.
//!
//! ## Storage
//!
//! Users live in an in-memory [`portico::repository::InMemoryUserRepository`]
//! for the lifetime of the process. Handlers only see the
//! [`portico::repository::UserRepository`] trait, so a persistent store can
//! replace it without touching request handling.
//!
//! ## Tokens
//!
//! Tokens are HS256 JWTs carrying `{email, name}` and a one hour expiry. They
//! are never stored or revoked; a token is valid while its signature checks
//! out and it has not expired.

pub mod cli;
pub mod portico;
