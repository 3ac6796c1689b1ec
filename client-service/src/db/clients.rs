//! クライアントデータベース操作

use client_platform_common::types::{Client, NewClient};
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct ClientRow {
    id: i64,
    name: String,
    email: Option<String>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

/// クライアントを登録し、採番済みのレコードを返す
pub async fn create_client(pool: &SqlitePool, candidate: &NewClient) -> Result<Client, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO clients (name, email)
        VALUES (?, ?)
        "#,
    )
    .bind(&candidate.name)
    .bind(&candidate.email)
    .execute(pool)
    .await?;

    Ok(candidate.clone().into_client(result.last_insert_rowid()))
}

/// クライアント一覧を取得（ID昇順）
pub async fn list_clients(pool: &SqlitePool) -> Result<Vec<Client>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ClientRow>(
        r#"
        SELECT id, name, email
        FROM clients
        ORDER BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// IDでクライアントを取得
pub async fn get_client(pool: &SqlitePool, id: i64) -> Result<Option<Client>, sqlx::Error> {
    let row = sqlx::query_as::<_, ClientRow>(
        r#"
        SELECT id, name, email
        FROM clients
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}
