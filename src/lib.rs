// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod balance;
pub mod categories;
pub mod cli;
pub mod commands;
pub mod config;
pub mod currency;
pub mod db;
pub mod error;
pub mod ledger;
pub mod models;
pub mod remote;
pub mod service;
pub mod summary;
pub mod utils;
