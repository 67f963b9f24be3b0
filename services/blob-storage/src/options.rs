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

use std::fmt;
use std::time::Duration;

/// Options of the list operations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// `NextMarker` of the previous page.
    pub marker: Option<String>,
    /// Only list names starting with this prefix.
    pub prefix: Option<String>,
    /// Upper bound of records on the page, the service caps it at 5000.
    pub max_results: Option<u32>,
    /// Server side `timeout` in seconds, zero leaves it out.
    pub timeout: u32,
    /// Local wait of blocking calls, falls back to the configured one.
    pub wait: Option<Duration>,
}

impl ListOptions {
    /// Continue a listing after `marker`.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    /// Set the name prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the page size.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Set the server side timeout.
    pub fn with_timeout(mut self, secs: u32) -> Self {
        self.timeout = secs;
        self
    }

    /// Set the local wait of blocking calls.
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = Some(wait);
        self
    }
}

/// Options shared by the non-list operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Server side `timeout` in seconds, zero leaves it out.
    pub timeout: u32,
    /// Local wait of blocking calls, falls back to the configured one.
    pub wait: Option<Duration>,
}

impl RequestOptions {
    /// Set the server side timeout.
    pub fn with_timeout(mut self, secs: u32) -> Self {
        self.timeout = secs;
        self
    }

    /// Set the local wait of blocking calls.
    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = Some(wait);
        self
    }
}

/// Kind of blob created by an upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlobType {
    /// Blob made of blocks, the usual kind.
    #[default]
    BlockBlob,
    /// Blob optimized for appends.
    AppendBlob,
    /// Blob of 512-byte pages.
    PageBlob,
}

impl BlobType {
    /// Value of the `x-ms-blob-type` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobType::BlockBlob => "BlockBlob",
            BlobType::AppendBlob => "AppendBlob",
            BlobType::PageBlob => "PageBlob",
        }
    }
}

impl fmt::Display for BlobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
