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

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use azblob_core::time::{format_http_date, now, DateTime};
use azblob_core::{Context, Error, Result};
use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_LENGTH};
use http::{HeaderValue, Method};
use log::debug;
use percent_encoding::utf8_percent_encode;
use tokio::runtime::Handle;

use crate::constants::*;
use crate::{
    BlobType, CanonicalRequest, Config, Credential, ListOptions, PendingOperation, RequestOptions,
    RequestSigner, UrlBuilder,
};

/// Asynchronous blob storage client.
///
/// Every operation checks its arguments, signs the request and spawns it on
/// the client's tokio runtime. An `Err` means nothing was sent; otherwise the
/// returned [`PendingOperation`] resolves to the outcome.
///
/// Clones share the same credential.
#[derive(Debug, Clone)]
pub struct Client {
    ctx: Context,
    config: Arc<Config>,
    signer: RequestSigner,
    credential: Arc<Mutex<Credential>>,
    runtime: Option<Handle>,
    time: Option<DateTime>,
}

impl Client {
    /// Create a client from `config`.
    ///
    /// Requests are spawned on the runtime current at this call, if any.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let credential = config.credential()?;
        let signer = RequestSigner::new(config.api_version())
            .with_sorted_headers(config.sorted_canonical_headers);

        Ok(Self {
            ctx,
            config: Arc::new(config),
            signer,
            credential: Arc::new(Mutex::new(credential)),
            runtime: Handle::try_current().ok(),
            time: None,
        })
    }

    /// Spawn requests on the runtime of `handle`.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Configuration of this client.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current credential.
    pub fn credential(&self) -> Credential {
        self.credential.lock().expect("lock poisoned").clone()
    }

    /// Replace the credential used by subsequent requests.
    ///
    /// Requests already issued are not affected.
    pub fn update_credentials(&self, credential: Credential) {
        *self.credential.lock().expect("lock poisoned") = credential;
    }

    /// Build the URL of a container or blob for the current credential.
    ///
    /// With a SAS credential, pass its token to get a link that can be
    /// handed out as is.
    pub fn build_url(
        &self,
        container: &str,
        blob: &str,
        extra_query: &str,
        marker: &str,
        timeout: u32,
        sas_token: &str,
    ) -> String {
        let cred = self.credential();
        self.url_builder(&cred)
            .build(container, blob, extra_query, marker, timeout, sas_token)
    }

    /// List the containers of the account.
    pub fn list_containers(&self, opts: &ListOptions) -> Result<PendingOperation> {
        let op = Operation::new(Method::GET, "", "")
            .param("comp", "list")
            .list_options(opts);
        self.issue(op)
    }

    /// List the blobs of `container`.
    pub fn list_blobs(&self, container: &str, opts: &ListOptions) -> Result<PendingOperation> {
        require("container", container)?;

        let op = Operation::new(Method::GET, container, "")
            .param("restype", "container")
            .param("comp", "list")
            .list_options(opts);
        self.issue(op)
    }

    /// Upload `content` as `container/blob`, replacing any existing blob.
    pub fn upload(
        &self,
        container: &str,
        blob: &str,
        content: impl Into<Bytes>,
        blob_type: BlobType,
        opts: &RequestOptions,
    ) -> Result<PendingOperation> {
        require("container", container)?;
        require("blob", blob)?;

        let op = Operation::new(Method::PUT, container, blob)
            .header(X_MS_BLOB_TYPE, blob_type.as_str())
            .body(content.into())
            .timeout(opts.timeout);
        self.issue(op)
    }

    /// Upload the local file at `path` as `container/blob`.
    ///
    /// An unreadable file rejects the operation.
    pub async fn upload_file(
        &self,
        path: &str,
        container: &str,
        blob: &str,
        blob_type: BlobType,
        opts: &RequestOptions,
    ) -> Result<PendingOperation> {
        require("container", container)?;
        require("blob", blob)?;

        let content = self.ctx.file_read(path).await.map_err(|e| {
            Error::request_invalid(format!("source file {path} is unreadable")).with_source(e)
        })?;
        self.upload(container, blob, content, blob_type, opts)
    }

    /// Download `container/blob`.
    pub fn download(
        &self,
        container: &str,
        blob: &str,
        opts: &RequestOptions,
    ) -> Result<PendingOperation> {
        require("container", container)?;
        require("blob", blob)?;

        let op = Operation::new(Method::GET, container, blob).timeout(opts.timeout);
        self.issue(op)
    }

    /// Delete `container/blob`.
    pub fn delete(
        &self,
        container: &str,
        blob: &str,
        opts: &RequestOptions,
    ) -> Result<PendingOperation> {
        require("container", container)?;
        require("blob", blob)?;

        let op = Operation::new(Method::DELETE, container, blob).timeout(opts.timeout);
        self.issue(op)
    }

    /// Create `container`.
    pub fn create_container(
        &self,
        container: &str,
        opts: &RequestOptions,
    ) -> Result<PendingOperation> {
        require("container", container)?;

        let op = Operation::new(Method::PUT, container, "")
            .param("restype", "container")
            .timeout(opts.timeout);
        self.issue(op)
    }

    /// Delete `container`, under `lease_id` if the container is leased.
    pub fn delete_container(
        &self,
        container: &str,
        lease_id: Option<&str>,
        opts: &RequestOptions,
    ) -> Result<PendingOperation> {
        require("container", container)?;

        let mut op = Operation::new(Method::DELETE, container, "")
            .param("restype", "container")
            .timeout(opts.timeout);
        if let Some(lease_id) = lease_id.filter(|v| !v.is_empty()) {
            op = op.header(X_MS_LEASE_ID, lease_id);
        }
        self.issue(op)
    }

    /// Start a server side copy of `src_container/src_blob` to
    /// `dst_container/dst_blob`.
    ///
    /// Completion only means the copy was accepted; the service reports its
    /// progress on the destination blob.
    pub fn start_copy(
        &self,
        src_container: &str,
        src_blob: &str,
        dst_container: &str,
        dst_blob: &str,
        opts: &RequestOptions,
    ) -> Result<PendingOperation> {
        require("source container", src_container)?;
        require("source blob", src_blob)?;
        require("destination container", dst_container)?;
        require("destination blob", dst_blob)?;

        let cred = self.credential();
        let source = self
            .url_builder(&cred)
            .build(src_container, src_blob, "", "", 0, cred.sas_token());

        let op = Operation::new(Method::PUT, dst_container, dst_blob)
            .header(X_MS_COPY_SOURCE, &source)
            .timeout(opts.timeout);
        self.issue(op)
    }

    fn url_builder(&self, cred: &Credential) -> UrlBuilder {
        UrlBuilder::new(
            cred.account_name(),
            self.config.service_host(),
            self.config.endpoint.as_deref(),
        )
    }

    fn runtime(&self) -> Result<Handle> {
        self.runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
            .ok_or_else(|| {
                Error::config_invalid("no tokio runtime to issue requests on, use with_runtime")
            })
    }

    /// Build the signed request of `op`.
    fn prepare(&self, op: Operation) -> Result<http::Request<Bytes>> {
        let cred = self.credential();
        let url = self.url_builder(&cred).build(
            &op.container,
            &op.blob,
            &op.extra_query(),
            &op.marker,
            op.timeout,
            cred.sas_token(),
        );
        let time = self.time.unwrap_or_else(now);

        let mut req = http::Request::builder()
            .method(op.method.clone())
            .uri(&url)
            .header(X_MS_DATE, format_http_date(time))
            .header(X_MS_VERSION, self.config.api_version());
        if op.method == Method::PUT || !op.body.is_empty() {
            req = req.header(CONTENT_LENGTH, op.body.len());
        }
        for (name, value) in &op.headers {
            req = req.header(*name, value.as_str());
        }

        if let Some(key) = cred.signing_key() {
            let auth = self
                .signer
                .sign(cred.account_name(), key, &op.canonical(), time)?;
            let mut value = HeaderValue::from_str(&auth)?;
            value.set_sensitive(true);
            req = req.header(AUTHORIZATION, value);
        }

        debug!("issuing {} {}", op.method, url);
        Ok(req.body(op.body)?)
    }

    fn issue(&self, op: Operation) -> Result<PendingOperation> {
        let handle = self.runtime()?;
        let req = self.prepare(op)?;

        let ctx = self.ctx.clone();
        Ok(PendingOperation::spawn(&handle, async move {
            ctx.http_send(req).await
        }))
    }
}

fn require(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::request_invalid(format!("{what} name is empty")));
    }
    Ok(())
}

/// One request before it is signed.
#[derive(Debug)]
struct Operation {
    method: Method,
    container: String,
    blob: String,
    // Query parameters in URL order, unencoded.
    params: Vec<(&'static str, String)>,
    marker: String,
    timeout: u32,
    headers: Vec<(&'static str, String)>,
    body: Bytes,
}

impl Operation {
    fn new(method: Method, container: &str, blob: &str) -> Self {
        Self {
            method,
            container: container.to_string(),
            blob: blob.to_string(),
            params: Vec::new(),
            marker: String::new(),
            timeout: 0,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    fn body(mut self, body: Bytes) -> Self {
        self.body = body;
        self
    }

    fn timeout(mut self, secs: u32) -> Self {
        self.timeout = secs;
        self
    }

    fn list_options(mut self, opts: &ListOptions) -> Self {
        if let Some(prefix) = opts.prefix.as_deref().filter(|v| !v.is_empty()) {
            self = self.param("prefix", prefix);
        }
        if let Some(max_results) = opts.max_results.filter(|v| *v > 0) {
            self = self.param("maxresults", max_results.to_string());
        }
        self.marker = opts.marker.clone().unwrap_or_default();
        self.timeout(opts.timeout)
    }

    fn extra_query(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{k}={}", utf8_percent_encode(v, &AZURE_QUERY_ENCODE_SET)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Every query parameter takes part in the canonical resource, sorted
    /// by name.
    fn canonical(&self) -> CanonicalRequest {
        let mut resources: BTreeMap<&str, String> = self
            .params
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect();
        if !self.marker.is_empty() {
            resources.insert("marker", self.marker.clone());
        }
        if self.timeout > 0 {
            resources.insert("timeout", self.timeout.to_string());
        }

        let mut headers: Vec<String> = self
            .headers
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .collect();
        headers.sort();

        CanonicalRequest {
            method: self.method.clone(),
            container: self.container.clone(),
            blob: self.blob.clone(),
            content_length: self.body.len() as u64,
            headers,
            resources: resources
                .into_iter()
                .map(|(k, v)| format!("{k}:{v}"))
                .collect(),
        }
    }
}
