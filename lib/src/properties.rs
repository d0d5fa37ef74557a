// Copyright 2020 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-path property storage, backing the `propset` command. Storage
//! only: property *merge* semantics at `alter_file` stay unimplemented.

use rusqlite::{params, OptionalExtension};

use crate::db::WcId;
use crate::error::CoreResult;
use crate::repo_path::RelPath;

pub fn set_property(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
    name: &str,
    value: &str,
) -> CoreResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO node_properties (wc_id, relpath, name, value) \
         VALUES (?1, ?2, ?3, ?4)",
        params![wc_id, relpath.as_str(), name, value],
    )?;
    Ok(())
}

pub fn get_property(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
    name: &str,
) -> CoreResult<Option<String>> {
    Ok(conn
        .query_row(
            "SELECT value FROM node_properties WHERE wc_id = ?1 AND relpath = ?2 AND name = ?3",
            params![wc_id, relpath.as_str(), name],
            |row| row.get(0),
        )
        .optional()?)
}

pub fn list_properties(
    conn: &rusqlite::Connection,
    wc_id: WcId,
    relpath: &RelPath,
) -> CoreResult<Vec<(String, String)>> {
    let mut stmt = conn.prepare(
        "SELECT name, value FROM node_properties WHERE wc_id = ?1 AND relpath = ?2 ORDER BY name",
    )?;
    let rows = stmt
        .query_map(params![wc_id, relpath.as_str()], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::WCRoot;

    #[test]
    fn set_then_get_round_trips() {
        let root = WCRoot::open_in_memory("/wc", 1).unwrap();
        let conn = root.connection();
        let path = RelPath::from("a/f");
        set_property(conn, 1, &path, "svn:eol-style", "native").unwrap();
        assert_eq!(
            get_property(conn, 1, &path, "svn:eol-style").unwrap(),
            Some("native".to_owned())
        );
        assert_eq!(get_property(conn, 1, &path, "svn:mime-type").unwrap(), None);
    }

    #[test]
    fn list_properties_is_sorted_by_name() {
        let root = WCRoot::open_in_memory("/wc", 1).unwrap();
        let conn = root.connection();
        let path = RelPath::from("a/f");
        set_property(conn, 1, &path, "svn:mime-type", "text/plain").unwrap();
        set_property(conn, 1, &path, "svn:eol-style", "native").unwrap();
        let props = list_properties(conn, 1, &path).unwrap();
        assert_eq!(
            props,
            vec![
                ("svn:eol-style".to_owned(), "native".to_owned()),
                ("svn:mime-type".to_owned(), "text/plain".to_owned()),
            ]
        );
    }
}
