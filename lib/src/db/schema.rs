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

use rusqlite::Connection;

use crate::error::CoreResult;

/// Schema version recorded in `PRAGMA user_version`. No migration
/// framework exists yet; this is the hook a future migration would check.
const SCHEMA_VERSION: i64 = 1;

pub(super) fn create_schema_if_absent(conn: &Connection) -> CoreResult<()> {
    let user_version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if user_version != 0 {
        return Ok(());
    }
    conn.execute_batch(
        "CREATE TABLE nodes (
            wc_id INTEGER NOT NULL,
            relpath TEXT NOT NULL,
            op_depth INTEGER NOT NULL,
            parent_relpath TEXT,
            kind TEXT NOT NULL,
            revision INTEGER,
            repos_relpath TEXT,
            repos_root_url TEXT,
            repos_uuid TEXT,
            checksum TEXT,
            moved_to TEXT,
            PRIMARY KEY (wc_id, relpath, op_depth)
        );
        CREATE INDEX nodes_parent_idx ON nodes (wc_id, parent_relpath, op_depth);

        CREATE TABLE conflict_skeletons (
            wc_id INTEGER NOT NULL,
            relpath TEXT NOT NULL,
            skeleton_json TEXT NOT NULL,
            PRIMARY KEY (wc_id, relpath)
        );

        CREATE TABLE node_properties (
            wc_id INTEGER NOT NULL,
            relpath TEXT NOT NULL,
            name TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (wc_id, relpath, name)
        );",
    )?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}
