//! End-to-end dashboard workflows over the mock backend
//!
//! Sign-in and bootstrap, route guarding, admin site management and the
//! field task workflow with its admin notifications.

#![allow(dead_code)]

mod auth;
mod common;
mod navigation;
mod sites;
mod tasks;
