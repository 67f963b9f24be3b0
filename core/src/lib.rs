// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Core components for talking to blob storage.
//!
//! This crate provides the foundational types shared by the azblob crates.
//! It does not know anything about a specific storage API: it only defines
//! the seams the client plugs its collaborators into.
//!
//! ## Overview
//!
//! - **Context**: a container that holds implementations for file reading,
//!   HTTP sending and environment access.
//! - **Error**: the error type returned by every fallible operation.
//! - **Utilities**: hashing, time formatting and secret redaction.
//!
//! ## Example
//!
//! ```no_run
//! use azblob_core::{Context, StaticEnv};
//! use std::collections::HashMap;
//!
//! let ctx = Context::new().with_env(StaticEnv {
//!     envs: HashMap::from([(
//!         "AZBLOB_ACCOUNT_NAME".to_string(),
//!         "myaccount".to_string(),
//!     )]),
//! });
//!
//! assert_eq!(ctx.env_var("AZBLOB_ACCOUNT_NAME").as_deref(), Some("myaccount"));
//! ```
//!
//! ## Traits
//!
//! - [`FileRead`]: For asynchronous file reading
//! - [`HttpSend`]: For sending HTTP requests
//! - [`Env`]: For environment variable access
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Context;
pub use context::Env;
pub use context::FileRead;
pub use context::HttpSend;
pub use context::NoopEnv;
pub use context::NoopFileRead;
pub use context::NoopHttpSend;
pub use context::OsEnv;
pub use context::StaticEnv;

mod error;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;
