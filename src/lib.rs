// Copyright 2026 Sphinx Contributors
// SPDX-License-Identifier: Apache-2.0

//! Sphinx runtime library — task-page solving endpoint.
//!
//! This library crate exposes the core modules for integration testing.

#![allow(clippy::new_without_default)]

pub mod answer;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod fetch;
pub mod oracle;
pub mod pipeline;
pub mod renderer;
pub mod resolvers;
pub mod rest;
pub mod submit;
pub mod tabular;
