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

use std::fmt::Write;

use azblob_core::hash::{base64_decode, base64_hmac_sha256};
use azblob_core::time::{format_http_date, DateTime};
use azblob_core::{Error, Result};
use http::Method;
use log::debug;

use crate::constants::*;
use crate::url::encode_blob_path;

/// The parts of a request that take part in Shared Key signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    /// HTTP verb.
    pub method: Method,
    /// Container name, empty for account level requests.
    pub container: String,
    /// Blob name, empty for container level requests.
    pub blob: String,
    /// Body length in bytes.
    pub content_length: u64,
    /// `x-ms-*` headers other than `x-ms-date` and `x-ms-version`, as
    /// lower-cased `name:value` lines sorted by name. They precede the
    /// two fixed headers in the string to sign.
    pub headers: Vec<String>,
    /// Query parameters as `name:value` lines sorted by name.
    pub resources: Vec<String>,
}

impl CanonicalRequest {
    /// Create a canonical request without extra headers or resources.
    pub fn new(method: Method, container: &str, blob: &str) -> Self {
        Self {
            method,
            container: container.to_string(),
            blob: blob.to_string(),
            content_length: 0,
            headers: Vec::new(),
            resources: Vec::new(),
        }
    }
}

/// RequestSigner that implement Azure Storage Shared Key Authorization.
///
/// - [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
#[derive(Debug, Clone)]
pub struct RequestSigner {
    api_version: String,
    sorted_headers: bool,
}

impl RequestSigner {
    /// Create a signer for the given `x-ms-version`.
    pub fn new(api_version: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            sorted_headers: false,
        }
    }

    /// Sort `x-ms-date` and `x-ms-version` in with the request headers.
    ///
    /// By default the request headers come first, followed by `x-ms-date`
    /// and `x-ms-version` at fixed positions. The sorted layout is the
    /// one the service documents for headers such as `x-ms-lease-id`.
    pub fn with_sorted_headers(mut self, sorted: bool) -> Self {
        self.sorted_headers = sorted;
        self
    }

    /// Build the `Authorization` header value for `req`.
    ///
    /// `time` must be the value sent as `x-ms-date`.
    pub fn sign(
        &self,
        account_name: &str,
        account_key: &str,
        req: &CanonicalRequest,
        time: DateTime,
    ) -> Result<String> {
        let key = base64_decode(account_key).map_err(|e| {
            Error::credential_invalid("failed to decode account key").with_source(e)
        })?;

        let string_to_sign = self.string_to_sign(account_name, req, time)?;
        let signature = base64_hmac_sha256(&key, string_to_sign.as_bytes());

        Ok(format!("SharedKey {account_name}:{signature}"))
    }

    /// Construct string to sign
    ///
    /// ## Format
    ///
    /// ```text
    /// VERB + "\n" +
    /// Content-Encoding + "\n" +
    /// Content-Language + "\n" +
    /// Content-Length + "\n" +
    /// Content-MD5 + "\n" +
    /// Content-Type + "\n" +
    /// Date + "\n" +
    /// If-Modified-Since + "\n" +
    /// If-Match + "\n" +
    /// If-None-Match + "\n" +
    /// If-Unmodified-Since + "\n" +
    /// Range + "\n" +
    /// CanonicalizedHeaders +
    /// CanonicalizedResource;
    /// ```
    ///
    /// The client never sends the optional standard headers, so only the
    /// verb and the content length carry a value.
    ///
    /// ## Reference
    ///
    /// - [Blob, Queue, and File Services (Shared Key authorization)](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
    pub fn string_to_sign(
        &self,
        account_name: &str,
        req: &CanonicalRequest,
        time: DateTime,
    ) -> Result<String> {
        let mut s = String::with_capacity(256);

        writeln!(&mut s, "{}", req.method.as_str())?;
        // Content-Encoding, Content-Language
        s.push_str("\n\n");
        if req.content_length > 0 {
            writeln!(&mut s, "{}", req.content_length)?;
        } else {
            s.push('\n');
        }
        // Content-MD5, Content-Type, Date, If-Modified-Since, If-Match,
        // If-None-Match, If-Unmodified-Since, Range
        s.push_str(&"\n".repeat(8));
        writeln!(&mut s, "{}", self.canonicalize_header(req, time))?;
        write!(&mut s, "{}", canonicalize_resource(account_name, req))?;

        debug!("string to sign: {}", &s);

        Ok(s)
    }

    /// ## Reference
    ///
    /// - [Constructing the canonicalized headers string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
    fn canonicalize_header(&self, req: &CanonicalRequest, time: DateTime) -> String {
        let mut lines: Vec<String> = req.headers.clone();
        lines.push(format!("{X_MS_DATE}:{}", format_http_date(time)));
        lines.push(format!("{X_MS_VERSION}:{}", self.api_version));
        if self.sorted_headers {
            // Stable on the name only, request lines keep their order.
            lines.sort_by(|a, b| header_name(a).cmp(header_name(b)));
        }
        lines.join("\n")
    }
}

fn header_name(line: &str) -> &str {
    line.split_once(':').map(|(k, _)| k).unwrap_or(line)
}

/// ## Reference
///
/// - [Constructing the canonicalized resource string](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)
fn canonicalize_resource(account_name: &str, req: &CanonicalRequest) -> String {
    let mut s = format!("/{}/{}", account_name, req.container);
    if !req.blob.is_empty() {
        s.push('/');
        s.push_str(&encode_blob_path(&req.blob));
    }
    for resource in &req.resources {
        s.push('\n');
        s.push_str(resource);
    }
    s
}
