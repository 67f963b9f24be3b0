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

//! Blob storage client with Shared Key and SAS authorization.
//!
//! This crate talks to the Blob service REST API: it lists containers and
//! blobs, uploads, downloads, copies and deletes blobs, and creates and
//! deletes containers.
//!
//! Every operation comes in two forms:
//!
//! - [`Client`] issues the request and returns a [`PendingOperation`] that
//!   resolves to an [`Outcome`].
//! - [`BlockingClient`] waits for the outcome with a bounded wait and
//!   returns a [`ReplyCode`], plus the payload where there is one.
//!
//! ## Example
//!
//! ```no_run
//! use azblob_core::{Context, OsEnv, Result};
//! use azblob_file_read_tokio::TokioFileRead;
//! use azblob_http_send_reqwest::ReqwestHttpSend;
//! use azblob_storage::{is_success, parse_blob_list, Client, Config, ListOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     let config = Config::default().from_env(&ctx);
//!     let client = Client::new(ctx, config)?;
//!
//!     let outcome = client.list_blobs("mycontainer", &ListOptions::default())?.await;
//!     if is_success(outcome.code()) {
//!         if let Some(reply) = outcome.into_reply() {
//!             for blob in parse_blob_list(reply.body()).records {
//!                 println!("{:?}", blob.get("Name"));
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

mod constants;

mod config;
pub use config::Config;

mod connection_string;

mod credential;
pub use credential::Credential;

mod url;
pub use url::encode_blob_path;
pub use url::UrlBuilder;

mod sign_request;
pub use sign_request::CanonicalRequest;
pub use sign_request::RequestSigner;

mod list;
pub use list::parse_blob_list;
pub use list::parse_container_list;
pub use list::parse_object_list;
pub use list::try_parse_object_list;
pub use list::ListRecord;
pub use list::ObjectList;
pub use list::ObjectTag;

mod reply;
pub use reply::is_success;
pub use reply::Reply;
pub use reply::ReplyCode;

mod options;
pub use options::BlobType;
pub use options::ListOptions;
pub use options::RequestOptions;

mod bridge;
pub use bridge::Outcome;
pub use bridge::PendingOperation;
pub use bridge::SyncBridge;
pub use bridge::TimeoutPolicy;

mod client;
pub use client::Client;

mod blocking;
pub use blocking::BlockingClient;
