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

use azblob_core::{Error, ErrorKind};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};

/// Result code of an operation.
///
/// Derived from the HTTP status of a completed reply, or from the failure
/// of the transport when no reply arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyCode {
    /// Status below 400.
    NoError,
    /// The service refused the connection.
    ConnectionRefused,
    /// No reply within the allowed time.
    Timeout,
    /// The operation was cancelled before it completed.
    OperationCanceled,
    /// Any other transport failure.
    UnknownNetwork,
    /// 400 Bad Request.
    ProtocolInvalidOperation,
    /// 401 Unauthorized.
    AuthenticationRequired,
    /// 403 Forbidden.
    ContentAccessDenied,
    /// 404 Not Found.
    ContentNotFound,
    /// 405 Method Not Allowed.
    ContentOperationNotPermitted,
    /// 409 Conflict.
    ContentConflict,
    /// 410 Gone.
    ContentGone,
    /// Other 4xx status.
    UnknownContent,
    /// 500 Internal Server Error.
    InternalServer,
    /// 501 Not Implemented.
    OperationNotImplemented,
    /// 503 Service Unavailable.
    ServiceUnavailable,
    /// Other 5xx status.
    UnknownServer,
}

impl ReplyCode {
    /// Map an HTTP status.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            0..=399 => ReplyCode::NoError,
            400 => ReplyCode::ProtocolInvalidOperation,
            401 => ReplyCode::AuthenticationRequired,
            403 => ReplyCode::ContentAccessDenied,
            404 => ReplyCode::ContentNotFound,
            405 => ReplyCode::ContentOperationNotPermitted,
            409 => ReplyCode::ContentConflict,
            410 => ReplyCode::ContentGone,
            402..=499 => ReplyCode::UnknownContent,
            500 => ReplyCode::InternalServer,
            501 => ReplyCode::OperationNotImplemented,
            503 => ReplyCode::ServiceUnavailable,
            _ => ReplyCode::UnknownServer,
        }
    }

    /// Map a transport failure.
    pub fn from_error(err: &Error) -> Self {
        match err.kind() {
            ErrorKind::Timeout => ReplyCode::Timeout,
            ErrorKind::Transport if is_connection_refused(err) => ReplyCode::ConnectionRefused,
            _ => ReplyCode::UnknownNetwork,
        }
    }

    /// Whether this code reports a successful operation.
    ///
    /// Same as [`is_success`].
    pub fn is_success(self) -> bool {
        is_success(self)
    }
}

/// The success predicate of every operation.
///
/// `ContentAccessDenied` counts as success: some create operations of the
/// service are reported with it.
pub fn is_success(code: ReplyCode) -> bool {
    matches!(code, ReplyCode::NoError | ReplyCode::ContentAccessDenied)
}

fn is_connection_refused(err: &Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(e) = source {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            if io.kind() == std::io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        source = e.source();
    }
    false
}

/// A response received from the service, whatever its status.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Reply {
    /// HTTP status of the reply.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers, `x-ms-request-id` and friends.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Take the response body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Result code derived from the status.
    pub fn code(&self) -> ReplyCode {
        ReplyCode::from_status(self.status)
    }
}

impl From<http::Response<Bytes>> for Reply {
    fn from(resp: http::Response<Bytes>) -> Self {
        let (parts, body) = resp.into_parts();
        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }
}
