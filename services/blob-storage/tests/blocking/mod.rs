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

use std::time::{Duration, Instant};

use azblob_core::{Context, ErrorKind};
use azblob_storage::{
    is_success, BlobType, BlockingClient, ListOptions, ReplyCode, RequestOptions, TimeoutPolicy,
};
use http::StatusCode;
use pretty_assertions::assert_eq;

use crate::*;

fn blocking(mock: &MockHttpSend) -> BlockingClient {
    BlockingClient::new(mock.context(), shared_key_config())
        .unwrap()
        .with_time(test_time())
}

#[test]
fn test_list_blobs_pagination() {
    init_logger();
    let mock = MockHttpSend::new(StatusCode::OK, BLOB_PAGE_2).then(StatusCode::OK, BLOB_PAGE_1);
    let client = blocking(&mock);

    let mut names = Vec::new();
    let mut opts = ListOptions::default().with_max_results(2);
    loop {
        let (code, page) = client.list_blobs("mycontainer", &opts).unwrap();
        assert_eq!(code, ReplyCode::NoError);
        names.extend(page.records.iter().filter_map(|r| r.get("Name").cloned()));

        if !page.has_more() {
            break;
        }
        opts = opts.with_marker(page.next_marker.unwrap_or_default());
    }

    assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert!(!requests[0].uri.to_string().contains("marker="));
    assert!(
        requests[1].uri.to_string().contains("&marker=page-2"),
        "{}",
        requests[1].uri
    );
}

#[test]
fn test_list_blobs_keeps_properties() {
    let mock = MockHttpSend::new(StatusCode::OK, BLOB_PAGE_1);
    let client = blocking(&mock);

    let (_, page) = client
        .list_blobs("mycontainer", &ListOptions::default())
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(
        page.records[0].get("Content-Length").map(String::as_str),
        Some("5")
    );
    assert_eq!(
        page.records[1].get("BlobType").map(String::as_str),
        Some("BlockBlob")
    );
    assert_eq!(page.next_marker.as_deref(), Some("page-2"));
}

#[test]
fn test_list_containers_error_reply_yields_empty_page() {
    let mock = MockHttpSend::new(
        StatusCode::FORBIDDEN,
        "<?xml version=\"1.0\"?><Error><Code>AuthenticationFailed</Code></Error>",
    );
    let client = blocking(&mock);

    let (code, page) = client.list_containers(&ListOptions::default()).unwrap();
    assert_eq!(code, ReplyCode::ContentAccessDenied);
    assert!(is_success(code));
    assert!(page.is_empty());
}

#[test]
fn test_wait_is_bounded() {
    init_logger();
    let ctx = Context::new().with_http_send(StalledHttpSend);
    let client = BlockingClient::new(ctx, shared_key_config()).unwrap();

    let wait = Duration::from_millis(300);
    let start = Instant::now();
    let code = client
        .delete("c", "b", &RequestOptions::default().with_wait(wait))
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(code, ReplyCode::Timeout);
    assert!(!is_success(code));
    assert!(elapsed >= wait, "{elapsed:?}");
    assert!(elapsed < wait + Duration::from_secs(2), "{elapsed:?}");
}

#[test]
fn test_wait_is_bounded_with_cancel_policy() {
    let ctx = Context::new().with_http_send(StalledHttpSend);
    let client = BlockingClient::new(ctx, shared_key_config())
        .unwrap()
        .with_timeout_policy(TimeoutPolicy::Cancel);

    let (code, page) = client
        .list_blobs(
            "c",
            &ListOptions::default().with_wait(Duration::from_millis(100)),
        )
        .unwrap();
    assert_eq!(code, ReplyCode::Timeout);
    assert!(page.is_empty());
}

#[test]
fn test_download() {
    let mock = MockHttpSend::new(StatusCode::OK, "hello world");
    let client = blocking(&mock);

    let (code, body) = client
        .download("c", "b", &RequestOptions::default())
        .unwrap();
    assert_eq!(code, ReplyCode::NoError);
    assert_eq!(body.as_ref(), b"hello world");
}

#[test]
fn test_status_mapping() {
    let cases = vec![
        (StatusCode::CREATED, ReplyCode::NoError),
        (StatusCode::NOT_FOUND, ReplyCode::ContentNotFound),
        (StatusCode::FORBIDDEN, ReplyCode::ContentAccessDenied),
        (StatusCode::CONFLICT, ReplyCode::ContentConflict),
        (StatusCode::INTERNAL_SERVER_ERROR, ReplyCode::InternalServer),
    ];

    for (status, expected) in cases {
        let mock = MockHttpSend::new(status, "");
        let client = blocking(&mock);

        let code = client
            .create_container("c", &RequestOptions::default())
            .unwrap();
        assert_eq!(code, expected, "status: {status}");
    }
}

#[test]
fn test_download_error_reply_keeps_body() {
    let body = "<?xml version=\"1.0\"?><Error><Code>BlobNotFound</Code></Error>";
    let mock = MockHttpSend::new(StatusCode::NOT_FOUND, body);
    let client = blocking(&mock);

    let (code, got) = client
        .download("c", "missing", &RequestOptions::default())
        .unwrap();
    assert_eq!(code, ReplyCode::ContentNotFound);
    assert!(!is_success(code));
    assert_eq!(got.as_ref(), body.as_bytes());
}

#[test]
fn test_operations_report_success() {
    let mock = MockHttpSend::new(StatusCode::ACCEPTED, "");
    let client = blocking(&mock);
    let opts = RequestOptions::default();

    let codes = vec![
        client
            .upload("c", "b", "hello", BlobType::BlockBlob, &opts)
            .unwrap(),
        client.delete("c", "b", &opts).unwrap(),
        client.delete_container("c", Some("lease"), &opts).unwrap(),
        client.start_copy("c", "a", "c", "b", &opts).unwrap(),
    ];
    assert!(codes.into_iter().all(|c| c == ReplyCode::NoError));
    assert_eq!(mock.requests().len(), 4);
}

#[test]
fn test_upload_file() {
    let mock = MockHttpSend::new(StatusCode::CREATED, "");
    let ctx = mock
        .context()
        .with_file_read(azblob_file_read_tokio::TokioFileRead);
    let client = BlockingClient::new(ctx, shared_key_config()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.bin");
    std::fs::write(&path, b"payload").unwrap();

    let code = client
        .upload_file(
            path.to_str().unwrap(),
            "c",
            "data.bin",
            BlobType::BlockBlob,
            &RequestOptions::default(),
        )
        .unwrap();
    assert_eq!(code, ReplyCode::NoError);
    assert_eq!(mock.requests()[0].body.as_ref(), b"payload");

    let err = client
        .upload_file(
            dir.path().join("missing").to_str().unwrap(),
            "c",
            "missing",
            BlobType::BlockBlob,
            &RequestOptions::default(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert_eq!(mock.requests().len(), 1);
}

#[test]
fn test_preconditions_are_errors() {
    let mock = MockHttpSend::new(StatusCode::OK, "");
    let client = blocking(&mock);

    let err = client
        .list_blobs("", &ListOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);

    let err = client
        .delete_container("", None, &RequestOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);

    assert!(mock.requests().is_empty());
}

#[test]
fn test_missing_account_is_config_error() {
    let mock = MockHttpSend::new(StatusCode::OK, "");
    let err = BlockingClient::new(mock.context(), Default::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}
