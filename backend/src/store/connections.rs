use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use connect_common::{
    Connection, ConnectionId, ConnectionStatus, ConnectionView, PublicProfile, UserId,
};

use super::{now_timestamp, timestamp_column, Store, StoreError};

const CONNECTION_COLUMNS: &str = "id, user_id, friend_id, status, created_at";

fn status_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<ConnectionStatus> {
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn connection_from_row(row: &Row<'_>) -> rusqlite::Result<Connection> {
    Ok(Connection {
        id: row.get(0)?,
        user_id: row.get(1)?,
        friend_id: row.get(2)?,
        status: status_column(row, 3)?,
        created_at: timestamp_column(row, 4)?,
    })
}

fn fetch_connection(
    conn: &rusqlite::Connection,
    id: ConnectionId,
) -> Result<Option<Connection>, StoreError> {
    let found = conn
        .query_row(
            &format!("SELECT {CONNECTION_COLUMNS} FROM connections WHERE id = ?1"),
            params![id],
            connection_from_row,
        )
        .optional()?;
    Ok(found)
}

/// Outcome of a conditional update on one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The row matched; holds it as written (or as deleted).
    Applied(Connection),
    /// Nothing matched. Holds the row as it stood, read under the same lock,
    /// or `None` if there is no such connection.
    Unmatched(Option<Connection>),
}

impl Store {
    /// Insert a pending connection from `initiator` to `recipient`.
    ///
    /// Any existing row for the pair, in either direction, yields
    /// [`StoreError::UniqueViolation`].
    pub fn insert_connection(
        &self,
        initiator: UserId,
        recipient: UserId,
    ) -> Result<Connection, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "INSERT INTO connections (user_id, friend_id, status, created_at)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING {CONNECTION_COLUMNS}"
            ),
            params![
                initiator,
                recipient,
                ConnectionStatus::Pending.as_str(),
                now_timestamp()
            ],
            connection_from_row,
        )
        .map_err(StoreError::classify)
    }

    pub fn get_connection(&self, id: ConnectionId) -> Result<Option<Connection>, StoreError> {
        let conn = self.conn()?;
        fetch_connection(&conn, id)
    }

    /// Flip a pending connection to accepted, but only if `recipient` is its
    /// recipient.
    pub fn accept_pending(
        &self,
        id: ConnectionId,
        recipient: UserId,
    ) -> Result<Transition, StoreError> {
        let conn = self.conn()?;
        let updated = conn
            .query_row(
                &format!(
                    "UPDATE connections SET status = ?1
                     WHERE id = ?2 AND friend_id = ?3 AND status = ?4
                     RETURNING {CONNECTION_COLUMNS}"
                ),
                params![
                    ConnectionStatus::Accepted.as_str(),
                    id,
                    recipient,
                    ConnectionStatus::Pending.as_str()
                ],
                connection_from_row,
            )
            .optional()?;

        match updated {
            Some(accepted) => Ok(Transition::Applied(accepted)),
            None => Ok(Transition::Unmatched(fetch_connection(&conn, id)?)),
        }
    }

    /// Delete a connection if `party` is either side of it.
    pub fn delete_for_party(
        &self,
        id: ConnectionId,
        party: UserId,
    ) -> Result<Transition, StoreError> {
        let conn = self.conn()?;
        let removed = conn
            .query_row(
                &format!(
                    "DELETE FROM connections
                     WHERE id = ?1 AND (user_id = ?2 OR friend_id = ?2)
                     RETURNING {CONNECTION_COLUMNS}"
                ),
                params![id, party],
                connection_from_row,
            )
            .optional()?;

        match removed {
            Some(removed) => Ok(Transition::Applied(removed)),
            None => Ok(Transition::Unmatched(fetch_connection(&conn, id)?)),
        }
    }

    /// Every connection `viewer` is part of, with the other party's profile,
    /// newest first.
    pub fn connections_for(&self, viewer: UserId) -> Result<Vec<ConnectionView>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT c.id, c.user_id, c.status, c.created_at,
                    u.id, u.email, u.name, u.avatar_url
             FROM connections c
             JOIN users u
               ON u.id = CASE WHEN c.user_id = ?1 THEN c.friend_id ELSE c.user_id END
             WHERE c.user_id = ?1 OR c.friend_id = ?1
             ORDER BY c.created_at DESC, c.id DESC",
        )?;

        let views = stmt
            .query_map(params![viewer], |row| {
                let initiator: UserId = row.get(1)?;
                Ok(ConnectionView {
                    id: row.get(0)?,
                    status: status_column(row, 2)?,
                    created_at: timestamp_column(row, 3)?,
                    is_sender: initiator == viewer,
                    friend: PublicProfile {
                        id: row.get(4)?,
                        email: row.get(5)?,
                        name: row.get(6)?,
                        avatar_url: row.get(7)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(views)
    }
}
