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

use std::fmt::{Debug, Formatter};
use std::time::Duration;

use azblob_core::utils::Redact;
use azblob_core::{Context, Error, Result};

use crate::connection_string;
use crate::constants::*;
use crate::Credential;

/// Config carries all the configuration for the blob storage client.
#[derive(Clone, Default, PartialEq)]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZBLOB_ACCOUNT_NAME`
    /// - env value: `AZURE_STORAGE_ACCOUNT_NAME`
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZBLOB_ACCOUNT_KEY`
    /// - env value: `AZURE_STORAGE_ACCOUNT_KEY`
    pub account_key: Option<String>,
    /// `sas_token` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZURE_STORAGE_SAS_TOKEN`
    ///
    /// Takes precedence over `account_key` when both are set.
    pub sas_token: Option<String>,
    /// Full service endpoint, replacing `https://{account}.{service_host}`.
    ///
    /// Used for development storage such as
    /// `http://127.0.0.1:10000/devstoreaccount1`.
    ///
    /// - env value: `AZBLOB_ENDPOINT`
    pub endpoint: Option<String>,
    /// Host suffix appended to the account name, defaults to
    /// `DEFAULT_SERVICE_HOST`.
    pub service_host: Option<String>,
    /// Value of `x-ms-version`, defaults to `DEFAULT_API_VERSION`.
    pub api_version: Option<String>,
    /// How long blocking calls wait for a reply, defaults to
    /// `DEFAULT_WAIT_TIMEOUT`.
    pub wait_timeout: Option<Duration>,
    /// Sign `x-ms-date` and `x-ms-version` sorted in with the other
    /// `x-ms-*` headers instead of after them. Off by default.
    pub sorted_canonical_headers: bool,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("sas_token", &Redact::from(&self.sas_token))
            .field("endpoint", &self.endpoint)
            .field("service_host", &self.service_host)
            .field("api_version", &self.api_version)
            .field("wait_timeout", &self.wait_timeout)
            .field("sorted_canonical_headers", &self.sorted_canonical_headers)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Values already set on the config are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let first = |keys: &[&str]| keys.iter().find_map(|k| ctx.env_var(k));

        if self.account_name.is_none() {
            self.account_name = first(&[AZBLOB_ACCOUNT_NAME, AZURE_STORAGE_ACCOUNT_NAME]);
        }
        if self.account_key.is_none() {
            self.account_key = first(&[AZBLOB_ACCOUNT_KEY, AZURE_STORAGE_ACCOUNT_KEY]);
        }
        if self.sas_token.is_none() {
            self.sas_token = first(&[AZURE_STORAGE_SAS_TOKEN]);
        }
        if self.endpoint.is_none() {
            self.endpoint = first(&[AZBLOB_ENDPOINT]);
        }

        self
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// The connection string doesn't have to specify all required parameters
    /// because the user is still allowed to set them later directly on the object.
    ///
    /// An example of a connection string looks like:
    ///
    /// ```txt
    /// AccountName=mystorageaccount;
    /// AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
    /// BlobEndpoint=https://mystorageaccount.blob.core.windows.net
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str) -> Result<Self> {
        connection_string::parse(conn_str)
    }

    /// Set the account name.
    pub fn with_account_name(mut self, account_name: impl Into<String>) -> Self {
        self.account_name = Some(account_name.into());
        self
    }

    /// Set the account key.
    pub fn with_account_key(mut self, account_key: impl Into<String>) -> Self {
        self.account_key = Some(account_key.into());
        self
    }

    /// Set the SAS token.
    pub fn with_sas_token(mut self, sas_token: impl Into<String>) -> Self {
        self.sas_token = Some(sas_token.into());
        self
    }

    /// Set the endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the wait timeout of blocking calls.
    pub fn with_wait_timeout(mut self, wait_timeout: Duration) -> Self {
        self.wait_timeout = Some(wait_timeout);
        self
    }

    /// Sign the canonical headers in sorted order.
    pub fn with_sorted_canonical_headers(mut self, sorted: bool) -> Self {
        self.sorted_canonical_headers = sorted;
        self
    }

    /// Build the credential described by this config.
    ///
    /// A SAS token wins over an account key. Neither being set yields a
    /// shared key credential with an empty key, so requests go out unsigned.
    pub fn credential(&self) -> Result<Credential> {
        let account_name = match self.account_name.as_deref() {
            Some(v) if !v.is_empty() => v,
            _ => return Err(Error::config_invalid("account name is required")),
        };

        if let Some(token) = self.sas_token.as_deref().filter(|v| !v.is_empty()) {
            return Ok(Credential::with_sas_token(account_name, token));
        }

        Ok(Credential::with_shared_key(
            account_name,
            self.account_key.as_deref().unwrap_or_default(),
        ))
    }

    /// Host suffix to build the default endpoint with.
    pub fn service_host(&self) -> &str {
        self.service_host.as_deref().unwrap_or(DEFAULT_SERVICE_HOST)
    }

    /// Storage service version sent as `x-ms-version`.
    pub fn api_version(&self) -> &str {
        self.api_version.as_deref().unwrap_or(DEFAULT_API_VERSION)
    }

    /// Bound of blocking calls that don't carry their own wait.
    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout.unwrap_or(DEFAULT_WAIT_TIMEOUT)
    }
}
