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

use log::debug;
use percent_encoding::utf8_percent_encode;

use crate::constants::{AZURE_PATH_ENCODE_SET, AZURE_QUERY_ENCODE_SET};

/// Builds resource URLs of a storage account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    base: String,
}

impl UrlBuilder {
    /// Create a builder for `https://{account}.{service_host}/`.
    ///
    /// A non-empty `endpoint` replaces that base entirely.
    pub fn new(account_name: &str, service_host: &str, endpoint: Option<&str>) -> Self {
        let base = match endpoint.filter(|v| !v.is_empty()) {
            Some(endpoint) => format!("{}/", endpoint.trim_end_matches('/')),
            None => format!("https://{account_name}.{service_host}/"),
        };
        Self { base }
    }

    /// Base URL every resource URL starts with, always ending in `/`.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Assemble the URL of a container or blob.
    ///
    /// Empty `blob`, `extra_query`, `marker` and `sas_token` are left out, as
    /// is a zero `timeout`. Query parts keep the order `extra_query`,
    /// `marker`, `timeout`, SAS token.
    pub fn build(
        &self,
        container: &str,
        blob: &str,
        extra_query: &str,
        marker: &str,
        timeout: u32,
        sas_token: &str,
    ) -> String {
        let mut url = format!("{}{}", self.base, container);
        if !blob.is_empty() {
            url.push('/');
            url.push_str(&encode_blob_path(blob));
        }

        let mut query = Vec::with_capacity(4);
        if !extra_query.is_empty() {
            query.push(extra_query.to_string());
        }
        if !marker.is_empty() {
            query.push(format!(
                "marker={}",
                utf8_percent_encode(marker, &AZURE_QUERY_ENCODE_SET)
            ));
        }
        if timeout > 0 {
            query.push(format!("timeout={timeout}"));
        }
        let sas = sas_token.strip_prefix('?').unwrap_or(sas_token);
        if !sas.is_empty() {
            if sas.contains("sig=") {
                query.push(sas.to_string());
            } else {
                query.push(format!("sig={sas}"));
            }
        }

        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }

        debug!("built url: {url}");
        url
    }
}

/// Percent-encode a blob name, keeping `/` as the path separator.
pub fn encode_blob_path(blob: &str) -> String {
    utf8_percent_encode(blob, &AZURE_PATH_ENCODE_SET).to_string()
}
