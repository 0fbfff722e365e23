// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod finance;
pub mod inventory;
pub mod models;
pub mod payroll;
pub mod pdf;
pub mod report;
pub mod session;
pub mod utils;
pub mod validate;
pub mod withdrawal;
