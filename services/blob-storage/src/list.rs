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

//! Decoder for `List Containers` and `List Blobs` payloads.

use std::collections::BTreeMap;

use azblob_core::{Error, Result};
use log::warn;
use quick_xml::events::Event;
use quick_xml::Reader;

/// One listed container or blob, field name to value.
///
/// Children of `Properties` are flattened into the record.
pub type ListRecord = BTreeMap<String, String>;

/// Element that delimits one listed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectTag {
    /// `<Container>` entries of a container listing.
    Container,
    /// `<Blob>` entries of a blob listing.
    Blob,
}

impl ObjectTag {
    /// Element name of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectTag::Container => "Container",
            ObjectTag::Blob => "Blob",
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectList {
    /// Entries in document order.
    pub records: Vec<ListRecord>,
    /// Value of `NextMarker`, pass it as the marker of the next call.
    pub next_marker: Option<String>,
}

impl ObjectList {
    /// Whether the service has another page.
    pub fn has_more(&self) -> bool {
        self.next_marker.as_deref().is_some_and(|v| !v.is_empty())
    }

    /// Number of records on this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether this page has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

const PROPERTIES: &[u8] = b"Properties";
const NEXT_MARKER: &[u8] = b"NextMarker";

/// Parse a container listing, including its `NextMarker`.
pub fn parse_container_list(xml: &[u8]) -> ObjectList {
    parse_object_list(ObjectTag::Container, xml, true)
}

/// Parse a blob listing, including its `NextMarker`.
pub fn parse_blob_list(xml: &[u8]) -> ObjectList {
    parse_object_list(ObjectTag::Blob, xml, true)
}

/// Parse every `tag` entry of a listing.
///
/// Malformed input yields an empty list, never a partial one.
pub fn parse_object_list(tag: ObjectTag, xml: &[u8], capture_marker: bool) -> ObjectList {
    match try_parse_object_list(tag, xml, capture_marker) {
        Ok(list) => list,
        Err(err) => {
            warn!("failed to parse {} list: {err}", tag.as_str());
            ObjectList::default()
        }
    }
}

enum State {
    Outside,
    Object {
        record: ListRecord,
        // Open elements inside the entry, `Properties` included.
        depth: usize,
        // Element whose value is expected next.
        key: Option<String>,
    },
    Marker,
}

/// Same as [`parse_object_list`] but reports malformed input.
pub fn try_parse_object_list(
    tag: ObjectTag,
    xml: &[u8],
    capture_marker: bool,
) -> Result<ObjectList> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text_start = true;
    reader.config_mut().trim_text_end = true;

    let tag = tag.as_str().as_bytes();
    let mut list = ObjectList::default();
    let mut state = State::Outside;
    // Elements open around the entries, the root included.
    let mut open = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| malformed(&reader, "invalid xml").with_source(e))?;

        state = match (state, event) {
            (State::Outside, Event::Eof) if open == 0 => break,
            (_, Event::Eof) => {
                return Err(malformed(&reader, "unexpected end of document"));
            }

            (State::Outside, Event::Start(e)) if e.local_name().as_ref() == tag => State::Object {
                record: ListRecord::new(),
                depth: 0,
                key: None,
            },
            (State::Outside, Event::Empty(e)) if e.local_name().as_ref() == tag => {
                list.records.push(ListRecord::new());
                State::Outside
            }
            (State::Outside, Event::Start(e))
                if capture_marker && e.local_name().as_ref() == NEXT_MARKER =>
            {
                list.next_marker = Some(String::new());
                State::Marker
            }
            (State::Outside, Event::Empty(e))
                if capture_marker && e.local_name().as_ref() == NEXT_MARKER =>
            {
                list.next_marker = Some(String::new());
                State::Outside
            }
            (State::Outside, Event::Start(_)) => {
                open += 1;
                State::Outside
            }
            (State::Outside, Event::End(_)) => {
                open = open.saturating_sub(1);
                State::Outside
            }
            (State::Outside, _) => State::Outside,

            (State::Marker, Event::Text(t)) => {
                list.next_marker = Some(unescape(&reader, &t)?);
                State::Marker
            }
            (State::Marker, Event::CData(t)) => {
                list.next_marker = Some(String::from_utf8_lossy(&t).into_owned());
                State::Marker
            }
            (State::Marker, Event::End(e)) if e.local_name().as_ref() == NEXT_MARKER => {
                State::Outside
            }
            (State::Marker, _) => State::Marker,

            (
                State::Object {
                    mut record,
                    depth,
                    key,
                },
                event,
            ) => match (key, event) {
                // Waiting for the next field.
                (None, Event::Start(e)) => {
                    let key = (e.local_name().as_ref() != PROPERTIES).then(|| element_name(&e));
                    State::Object {
                        record,
                        depth: depth + 1,
                        key,
                    }
                }
                (None, Event::Empty(e)) => {
                    if e.local_name().as_ref() != PROPERTIES {
                        record.insert(element_name(&e), String::new());
                    }
                    State::Object {
                        record,
                        depth,
                        key: None,
                    }
                }
                (None, Event::End(e)) if depth == 0 && e.local_name().as_ref() == tag => {
                    list.records.push(record);
                    State::Outside
                }
                (None, Event::End(_)) => State::Object {
                    record,
                    depth: depth.saturating_sub(1),
                    key: None,
                },
                (None, _) => State::Object {
                    record,
                    depth,
                    key: None,
                },

                // Waiting for the value of `key`, the innermost element wins.
                (Some(_), Event::Start(e)) => State::Object {
                    record,
                    depth: depth + 1,
                    key: Some(element_name(&e)),
                },
                (Some(_), Event::Empty(e)) => {
                    record.insert(element_name(&e), String::new());
                    State::Object {
                        record,
                        depth,
                        key: None,
                    }
                }
                (Some(key), Event::Text(t)) => {
                    record.insert(key, unescape(&reader, &t)?);
                    State::Object {
                        record,
                        depth,
                        key: None,
                    }
                }
                (Some(key), Event::CData(t)) => {
                    record.insert(key, String::from_utf8_lossy(&t).into_owned());
                    State::Object {
                        record,
                        depth,
                        key: None,
                    }
                }
                (Some(key), Event::End(_)) => {
                    record.insert(key, String::new());
                    State::Object {
                        record,
                        depth: depth.saturating_sub(1),
                        key: None,
                    }
                }
                (Some(key), _) => {
                    return Err(malformed(
                        &reader,
                        &format!("expected value or end of <{key}>"),
                    ));
                }
            },
        };
    }

    Ok(list)
}

fn element_name(e: &quick_xml::events::BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn unescape(reader: &Reader<&[u8]>, t: &quick_xml::events::BytesText) -> Result<String> {
    t.unescape()
        .map(|v| v.into_owned())
        .map_err(|e| malformed(reader, "invalid text").with_source(e))
}

fn malformed(reader: &Reader<&[u8]>, msg: &str) -> Error {
    Error::unexpected(format!(
        "malformed list payload at byte {}: {msg}",
        reader.buffer_position()
    ))
}
