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

use std::time::Duration;

use azblob_core::{Context, Error, Result};
use bytes::Bytes;
use tokio::runtime::{Builder, Runtime};

use crate::{
    parse_blob_list, parse_container_list, BlobType, Client, Config, Credential, ListOptions,
    ObjectList, Outcome, PendingOperation, ReplyCode, RequestOptions, SyncBridge, TimeoutPolicy,
};

/// Blocking blob storage client.
///
/// Owns a tokio runtime, issues every operation through [`Client`] and waits
/// for it through [`SyncBridge`]. `Err` is only returned when the operation
/// was rejected before anything was sent; every later failure, a timeout
/// included, is a [`ReplyCode`].
///
/// Must not be used, or dropped, from inside an async context.
#[derive(Debug)]
pub struct BlockingClient {
    client: Client,
    bridge: SyncBridge,
    wait: Duration,
    runtime: Runtime,
}

impl BlockingClient {
    /// Create a blocking client from `config`.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .thread_name("azblob-blocking")
            .build()
            .map_err(|e| Error::unexpected("failed to build tokio runtime").with_source(e))?;

        let wait = config.wait_timeout();
        let client = Client::new(ctx, config)?.with_runtime(runtime.handle().clone());
        let bridge = SyncBridge::new(runtime.handle().clone());

        Ok(Self {
            client,
            bridge,
            wait,
            runtime,
        })
    }

    /// Set what happens to operations that time out.
    pub fn with_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.bridge = self.bridge.with_policy(policy);
        self
    }

    /// Specify the signing time.
    ///
    /// Only use this function for testing.
    pub fn with_time(mut self, time: azblob_core::time::DateTime) -> Self {
        self.client = self.client.with_time(time);
        self
    }

    /// The underlying asynchronous client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Replace the credential used by subsequent requests.
    pub fn update_credentials(&self, credential: Credential) {
        self.client.update_credentials(credential)
    }

    /// Build the URL of a container or blob, see [`Client::build_url`].
    pub fn build_url(
        &self,
        container: &str,
        blob: &str,
        extra_query: &str,
        marker: &str,
        timeout: u32,
        sas_token: &str,
    ) -> String {
        self.client
            .build_url(container, blob, extra_query, marker, timeout, sas_token)
    }

    /// List one page of containers.
    pub fn list_containers(&self, opts: &ListOptions) -> Result<(ReplyCode, ObjectList)> {
        let pending = self.client.list_containers(opts)?;
        Ok(self.wait_list(pending, opts.wait, parse_container_list))
    }

    /// List one page of blobs in `container`.
    pub fn list_blobs(
        &self,
        container: &str,
        opts: &ListOptions,
    ) -> Result<(ReplyCode, ObjectList)> {
        let pending = self.client.list_blobs(container, opts)?;
        Ok(self.wait_list(pending, opts.wait, parse_blob_list))
    }

    /// Upload `content` as `container/blob`.
    pub fn upload(
        &self,
        container: &str,
        blob: &str,
        content: impl Into<Bytes>,
        blob_type: BlobType,
        opts: &RequestOptions,
    ) -> Result<ReplyCode> {
        let pending = self
            .client
            .upload(container, blob, content, blob_type, opts)?;
        Ok(self.wait(pending, opts.wait).code())
    }

    /// Upload the local file at `path` as `container/blob`.
    pub fn upload_file(
        &self,
        path: &str,
        container: &str,
        blob: &str,
        blob_type: BlobType,
        opts: &RequestOptions,
    ) -> Result<ReplyCode> {
        let pending = self.runtime.block_on(
            self.client
                .upload_file(path, container, blob, blob_type, opts),
        )?;
        Ok(self.wait(pending, opts.wait).code())
    }

    /// Download `container/blob`.
    ///
    /// The body is returned whenever the service replied, error replies
    /// included.
    pub fn download(
        &self,
        container: &str,
        blob: &str,
        opts: &RequestOptions,
    ) -> Result<(ReplyCode, Bytes)> {
        let pending = self.client.download(container, blob, opts)?;
        let outcome = self.wait(pending, opts.wait);
        let code = outcome.code();
        let body = outcome
            .into_reply()
            .map(|reply| reply.into_body())
            .unwrap_or_default();
        Ok((code, body))
    }

    /// Delete `container/blob`.
    pub fn delete(&self, container: &str, blob: &str, opts: &RequestOptions) -> Result<ReplyCode> {
        let pending = self.client.delete(container, blob, opts)?;
        Ok(self.wait(pending, opts.wait).code())
    }

    /// Create `container`.
    pub fn create_container(&self, container: &str, opts: &RequestOptions) -> Result<ReplyCode> {
        let pending = self.client.create_container(container, opts)?;
        Ok(self.wait(pending, opts.wait).code())
    }

    /// Delete `container`.
    pub fn delete_container(
        &self,
        container: &str,
        lease_id: Option<&str>,
        opts: &RequestOptions,
    ) -> Result<ReplyCode> {
        let pending = self.client.delete_container(container, lease_id, opts)?;
        Ok(self.wait(pending, opts.wait).code())
    }

    /// Start a server side copy.
    pub fn start_copy(
        &self,
        src_container: &str,
        src_blob: &str,
        dst_container: &str,
        dst_blob: &str,
        opts: &RequestOptions,
    ) -> Result<ReplyCode> {
        let pending =
            self.client
                .start_copy(src_container, src_blob, dst_container, dst_blob, opts)?;
        Ok(self.wait(pending, opts.wait).code())
    }

    fn wait(&self, pending: PendingOperation, wait: Option<Duration>) -> Outcome {
        self.bridge.wait(pending, wait.unwrap_or(self.wait))
    }

    fn wait_list(
        &self,
        pending: PendingOperation,
        wait: Option<Duration>,
        parse: fn(&[u8]) -> ObjectList,
    ) -> (ReplyCode, ObjectList) {
        match self.wait(pending, wait) {
            Outcome::Completed(reply) => (reply.code(), parse(reply.body())),
            outcome => (outcome.code(), ObjectList::default()),
        }
    }
}
