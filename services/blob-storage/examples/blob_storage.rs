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

use anyhow::Result;
use azblob_core::{Context, OsEnv};
use azblob_file_read_tokio::TokioFileRead;
use azblob_http_send_reqwest::ReqwestHttpSend;
use azblob_storage::{is_success, BlobType, BlockingClient, Config, ListOptions, RequestOptions};

fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    // A connection string wins over the AZBLOB_* / AZURE_STORAGE_* values.
    let config = match ctx.env_var("AZURE_STORAGE_CONNECTION_STRING") {
        Some(conn_str) => Config::try_from_connection_string(&conn_str)?,
        None => Config::default().from_env(&ctx),
    };
    if config.account_name.is_none() {
        println!("No account configured, falling back to Azurite");
        println!("Set AZBLOB_ACCOUNT_NAME and AZBLOB_ACCOUNT_KEY to use a real account");
    }
    let config = match config.account_name {
        Some(_) => config,
        None => Config::try_from_connection_string("UseDevelopmentStorage=true")?,
    };

    let client = BlockingClient::new(ctx, config)?;
    let opts = RequestOptions::default().with_timeout(30);
    let container = "azblob-demo";

    let code = client.create_container(container, &opts)?;
    println!("create container: {code:?}");

    let code = client.upload(container, "hello.txt", "hello world", BlobType::BlockBlob, &opts)?;
    println!("upload: {code:?}");

    let mut list_opts = ListOptions::default().with_max_results(100);
    loop {
        let (code, page) = client.list_blobs(container, &list_opts)?;
        if !is_success(code) {
            println!("list blobs: {code:?}");
            break;
        }
        for blob in &page.records {
            println!(
                "{} ({} bytes)",
                blob.get("Name").map(String::as_str).unwrap_or_default(),
                blob.get("Content-Length").map(String::as_str).unwrap_or("?"),
            );
        }
        match page.next_marker {
            Some(marker) if !marker.is_empty() => list_opts = list_opts.with_marker(marker),
            _ => break,
        }
    }

    let (code, body) = client.download(container, "hello.txt", &opts)?;
    println!("download: {code:?} {:?}", String::from_utf8_lossy(&body));

    println!("delete: {:?}", client.delete(container, "hello.txt", &opts)?);
    println!(
        "delete container: {:?}",
        client.delete_container(container, None, &opts)?
    );
    Ok(())
}
