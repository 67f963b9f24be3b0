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

use azblob_core::utils::Redact;
use std::fmt::{Debug, Formatter};

/// Credential the client authorizes requests with.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Shared Key authentication with account name and key.
    ///
    /// An empty key means requests go out unsigned, which only works
    /// against public containers.
    SharedKey {
        /// Storage account name.
        account_name: String,
        /// Base64 encoded storage account key.
        account_key: String,
    },
    /// SAS (Shared Access Signature) token authentication.
    ///
    /// The token is appended to every request URL instead of signing.
    SasToken {
        /// Storage account name.
        account_name: String,
        /// SAS token, with or without the leading `?`.
        token: String,
    },
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::SharedKey {
                account_name,
                account_key,
            } => f
                .debug_struct("Credential::SharedKey")
                .field("account_name", account_name)
                .field("account_key", &Redact::from(account_key))
                .finish(),
            Credential::SasToken {
                account_name,
                token,
            } => f
                .debug_struct("Credential::SasToken")
                .field("account_name", account_name)
                .field("token", &Redact::from(token))
                .finish(),
        }
    }
}

impl Credential {
    /// Create a new credential with shared key authentication.
    pub fn with_shared_key(account_name: &str, account_key: &str) -> Self {
        Self::SharedKey {
            account_name: account_name.to_string(),
            account_key: account_key.to_string(),
        }
    }

    /// Create a new credential with SAS token authentication.
    pub fn with_sas_token(account_name: &str, sas_token: &str) -> Self {
        Self::SasToken {
            account_name: account_name.to_string(),
            token: sas_token.to_string(),
        }
    }

    /// Storage account the credential belongs to.
    pub fn account_name(&self) -> &str {
        match self {
            Credential::SharedKey { account_name, .. } => account_name,
            Credential::SasToken { account_name, .. } => account_name,
        }
    }

    /// Account key to sign with, `None` if requests must not be signed.
    pub fn signing_key(&self) -> Option<&str> {
        match self {
            Credential::SharedKey { account_key, .. } if !account_key.is_empty() => {
                Some(account_key)
            }
            _ => None,
        }
    }

    /// SAS token to append to request URLs, empty for shared key.
    pub fn sas_token(&self) -> &str {
        match self {
            Credential::SasToken { token, .. } => token,
            Credential::SharedKey { .. } => "",
        }
    }
}
