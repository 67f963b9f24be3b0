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

use std::io::Write;

use azblob_core::{Context, ErrorKind};
use azblob_file_read_tokio::TokioFileRead;
use azblob_storage::{
    parse_blob_list, BlobType, Client, Config, Credential, ListOptions, Outcome, ReplyCode,
    RequestOptions,
};
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;

use crate::*;

fn client(mock: &MockHttpSend, config: Config) -> Client {
    Client::new(mock.context(), config)
        .unwrap()
        .with_time(test_time())
}

#[tokio::test]
async fn test_list_blobs_request() {
    init_logger();
    let mock = MockHttpSend::new(StatusCode::OK, BLOB_PAGE_1);
    let client = client(&mock, shared_key_config());

    let opts = ListOptions::default()
        .with_prefix("dir/")
        .with_max_results(2)
        .with_marker("2!96!MDAw")
        .with_timeout(30);
    let outcome = client.list_blobs("mycontainer", &opts).unwrap().await;

    let reply = outcome.into_reply().expect("reply must be received");
    assert_eq!(reply.code(), ReplyCode::NoError);
    assert_eq!(parse_blob_list(reply.body()).len(), 2);

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method, Method::GET);
    assert_eq!(
        req.uri.to_string(),
        "https://devstoreaccount1.blob.core.windows.net/mycontainer?restype=container&comp=list&prefix=dir%2F&maxresults=2&marker=2%2196%21MDAw&timeout=30"
    );
    assert_eq!(req.header("x-ms-date"), Some("Tue, 01 Mar 2022 08:12:34 GMT"));
    assert_eq!(req.header("x-ms-version"), Some("2021-04-10"));
    assert_eq!(
        req.header("authorization"),
        Some("SharedKey devstoreaccount1:jN0or31dETKumLAN4060BKfG7+Is6uxkbXcs1H/g9Dw=")
    );
}

#[tokio::test]
async fn test_list_containers_request() {
    let mock = MockHttpSend::new(StatusCode::OK, "");
    let client = client(&mock, shared_key_config());

    let outcome = client
        .list_containers(&ListOptions::default())
        .unwrap()
        .await;
    assert_eq!(outcome.code(), ReplyCode::NoError);

    let req = &mock.requests()[0];
    assert_eq!(
        req.uri.to_string(),
        "https://devstoreaccount1.blob.core.windows.net/?comp=list"
    );
    assert_eq!(
        req.header("authorization"),
        Some("SharedKey devstoreaccount1:qhhq3eFcN/9s+cU1OH3W+wh03b4PUbr6u4F4XBqyZpo=")
    );
}

#[tokio::test]
async fn test_upload_request() {
    let mock = MockHttpSend::new(StatusCode::CREATED, "");
    let client = client(&mock, shared_key_config());

    let outcome = client
        .upload(
            "mycontainer",
            "dir/a b.txt",
            "hello world",
            BlobType::BlockBlob,
            &RequestOptions::default(),
        )
        .unwrap()
        .await;
    assert_eq!(outcome.code(), ReplyCode::NoError);

    let req = &mock.requests()[0];
    assert_eq!(req.method, Method::PUT);
    assert_eq!(
        req.uri.to_string(),
        "https://devstoreaccount1.blob.core.windows.net/mycontainer/dir/a%20b.txt"
    );
    assert_eq!(req.header("x-ms-blob-type"), Some("BlockBlob"));
    assert_eq!(req.header("content-length"), Some("11"));
    assert_eq!(req.body.as_ref(), b"hello world");
    assert_eq!(
        req.header("authorization"),
        Some("SharedKey devstoreaccount1:fSCoQY8ovbPFJz1F6QeLVgWd7cWSIHJv81uu+25OXqw=")
    );
}

#[tokio::test]
async fn test_delete_container_with_lease() {
    let mock = MockHttpSend::new(StatusCode::ACCEPTED, "");
    let client = client(&mock, shared_key_config());

    let outcome = client
        .delete_container("mycontainer", Some("abc"), &RequestOptions::default())
        .unwrap()
        .await;
    assert_eq!(outcome.code(), ReplyCode::NoError);

    let req = &mock.requests()[0];
    assert_eq!(req.method, Method::DELETE);
    assert_eq!(
        req.uri.to_string(),
        "https://devstoreaccount1.blob.core.windows.net/mycontainer?restype=container"
    );
    assert_eq!(req.header("x-ms-lease-id"), Some("abc"));
    assert_eq!(
        req.header("authorization"),
        Some("SharedKey devstoreaccount1:Z3NEHepG4PB801v1KbTCrwTfP5W/DcMKe/J1SrzQ9wA=")
    );
}

#[tokio::test]
async fn test_delete_container_with_sorted_headers() {
    let mock = MockHttpSend::new(StatusCode::ACCEPTED, "");
    let client = client(&mock, shared_key_config().with_sorted_canonical_headers(true));

    let _ = client
        .delete_container("mycontainer", Some("abc"), &RequestOptions::default())
        .unwrap()
        .await;

    assert_eq!(
        mock.requests()[0].header("authorization"),
        Some("SharedKey devstoreaccount1:M7jrIQgAdHOzDPyO+J/tH3JKTQH4U/x3qnvin+/7SOA=")
    );
}

#[tokio::test]
async fn test_start_copy_request() {
    let mock = MockHttpSend::new(StatusCode::ACCEPTED, "");
    let client = client(&mock, shared_key_config());

    let outcome = client
        .start_copy("src", "a.txt", "dst", "b.txt", &RequestOptions::default())
        .unwrap()
        .await;
    assert_eq!(outcome.code(), ReplyCode::NoError);

    let req = &mock.requests()[0];
    assert_eq!(req.method, Method::PUT);
    assert_eq!(
        req.uri.to_string(),
        "https://devstoreaccount1.blob.core.windows.net/dst/b.txt"
    );
    assert_eq!(
        req.header("x-ms-copy-source"),
        Some("https://devstoreaccount1.blob.core.windows.net/src/a.txt")
    );
    assert_eq!(
        req.header("authorization"),
        Some("SharedKey devstoreaccount1:vcSlK/oCQ+2Adx6iI4vBOGtHJW0vm7IAMq8jNatEgus=")
    );
}

#[tokio::test]
async fn test_operations_use_expected_verbs() {
    let mock = MockHttpSend::new(StatusCode::OK, "");
    let client = client(&mock, shared_key_config());
    let opts = RequestOptions::default().with_timeout(10);

    let pending = vec![
        client.download("c", "b", &opts).unwrap(),
        client.delete("c", "b", &opts).unwrap(),
        client.create_container("c", &opts).unwrap(),
    ];
    for p in pending {
        assert_eq!(p.await.code(), ReplyCode::NoError);
    }

    let mut seen: Vec<(Method, String)> = mock
        .requests()
        .into_iter()
        .map(|r| (r.method, r.uri.to_string()))
        .collect();
    seen.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.as_str().cmp(b.0.as_str())));

    assert_eq!(
        seen,
        vec![
            (
                Method::DELETE,
                "https://devstoreaccount1.blob.core.windows.net/c/b?timeout=10".to_string()
            ),
            (
                Method::GET,
                "https://devstoreaccount1.blob.core.windows.net/c/b?timeout=10".to_string()
            ),
            (
                Method::PUT,
                "https://devstoreaccount1.blob.core.windows.net/c?restype=container&timeout=10"
                    .to_string()
            ),
        ]
    );
}

#[tokio::test]
async fn test_sas_mode_omits_authorization() {
    let mock = MockHttpSend::new(StatusCode::OK, "");
    let config = shared_key_config().with_sas_token("?sv=2021-04-10&sp=r&sig=abc%3D");
    let client = client(&mock, config);

    let _ = client
        .download("c", "b", &RequestOptions::default())
        .unwrap()
        .await;

    let req = &mock.requests()[0];
    assert_eq!(req.header("authorization"), None);
    assert_eq!(
        req.uri.to_string(),
        "https://devstoreaccount1.blob.core.windows.net/c/b?sv=2021-04-10&sp=r&sig=abc%3D"
    );
    assert!(req.header("x-ms-date").is_some());
}

#[tokio::test]
async fn test_empty_key_omits_authorization() {
    let mock = MockHttpSend::new(StatusCode::OK, "");
    let client = client(&mock, Config::default().with_account_name(ACCOUNT));

    let _ = client
        .download("c", "b", &RequestOptions::default())
        .unwrap()
        .await;

    let req = &mock.requests()[0];
    assert_eq!(req.header("authorization"), None);
    assert_eq!(
        req.uri.to_string(),
        "https://devstoreaccount1.blob.core.windows.net/c/b"
    );
}

#[tokio::test]
async fn test_update_credentials_switches_mode() {
    let mock = MockHttpSend::new(StatusCode::OK, "");
    let client = client(&mock, shared_key_config());

    client.update_credentials(Credential::with_sas_token(ACCOUNT, "sig=abc"));
    let _ = client
        .download("c", "b", &RequestOptions::default())
        .unwrap()
        .await;

    client.update_credentials(Credential::with_shared_key(ACCOUNT, KEY));
    let _ = client
        .download("c", "b", &RequestOptions::default())
        .unwrap()
        .await;

    let requests = mock.requests();
    assert_eq!(requests[0].header("authorization"), None);
    assert!(requests[0].uri.to_string().ends_with("?sig=abc"));
    assert!(requests[1].header("authorization").is_some());
    assert_eq!(requests[1].uri.query(), None);
}

#[tokio::test]
async fn test_preconditions_reject_before_send() {
    let mock = MockHttpSend::new(StatusCode::OK, "");
    let client = client(&mock, shared_key_config());
    let opts = RequestOptions::default();

    let results = vec![
        ("list blobs", client.list_blobs("", &ListOptions::default())),
        ("upload without container", client.upload("", "b", "x", BlobType::BlockBlob, &opts)),
        ("upload without blob", client.upload("c", "", "x", BlobType::BlockBlob, &opts)),
        ("download", client.download("c", "", &opts)),
        ("delete", client.delete("", "b", &opts)),
        ("create container", client.create_container("", &opts)),
        ("delete container", client.delete_container("", None, &opts)),
        ("copy", client.start_copy("src", "", "dst", "b", &opts)),
    ];

    for (name, result) in results {
        let err = result.expect_err(name);
        assert_eq!(err.kind(), ErrorKind::RequestInvalid, "case: {name}");
        assert!(err.is_rejected_before_send(), "case: {name}");
    }
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_invalid_key_rejects_before_send() {
    let mock = MockHttpSend::new(StatusCode::OK, "");
    let config = Config::default()
        .with_account_name(ACCOUNT)
        .with_account_key("not base64 !!");
    let client = client(&mock, config);

    let err = client
        .download("c", "b", &RequestOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_upload_file() {
    let mock = MockHttpSend::new(StatusCode::CREATED, "");
    let ctx = Context::new()
        .with_http_send(mock.clone())
        .with_file_read(TokioFileRead);
    let client = Client::new(ctx, shared_key_config()).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"Dummy information\n").unwrap();

    let outcome = client
        .upload_file(
            file.path().to_str().unwrap(),
            "c",
            "dummy.txt",
            BlobType::AppendBlob,
            &RequestOptions::default(),
        )
        .await
        .unwrap()
        .await;
    assert_eq!(outcome.code(), ReplyCode::NoError);

    let req = &mock.requests()[0];
    assert_eq!(req.body.as_ref(), b"Dummy information\n");
    assert_eq!(req.header("x-ms-blob-type"), Some("AppendBlob"));
}

#[tokio::test]
async fn test_upload_missing_file_rejects_before_send() {
    let mock = MockHttpSend::new(StatusCode::CREATED, "");
    let ctx = Context::new()
        .with_http_send(mock.clone())
        .with_file_read(TokioFileRead);
    let client = Client::new(ctx, shared_key_config()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invalidPath");

    let err = client
        .upload_file(
            path.to_str().unwrap(),
            "c",
            "b",
            BlobType::BlockBlob,
            &RequestOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_an_outcome() {
    let ctx = Context::new().with_http_send(FailingHttpSend);
    let client = Client::new(ctx, shared_key_config()).unwrap();

    let outcome = client
        .download("c", "b", &RequestOptions::default())
        .unwrap()
        .await;
    assert!(
        matches!(outcome, Outcome::TransportError(ReplyCode::UnknownNetwork)),
        "{outcome:?}"
    );
}

#[tokio::test]
async fn test_endpoint_override() {
    let mock = MockHttpSend::new(StatusCode::OK, "");
    let config = Config::try_from_connection_string("UseDevelopmentStorage=true").unwrap();
    let client = client(&mock, config);

    let _ = client
        .download("c", "b", &RequestOptions::default())
        .unwrap()
        .await;

    let req = &mock.requests()[0];
    assert_eq!(
        req.uri.to_string(),
        "http://127.0.0.1:10000/devstoreaccount1/c/b"
    );
    assert!(req
        .header("authorization")
        .is_some_and(|v| v.starts_with("SharedKey devstoreaccount1:")));
}
