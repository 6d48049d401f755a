//! API handlers for Accesso.
//!
//! `auth` holds the session boundary (sign-in, sign-up, logout, session guard);
//! `root` and `pages` answer the frontend's render-or-redirect questions.

pub mod auth;
pub mod health;
pub mod pages;
pub mod root;
