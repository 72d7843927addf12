use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::RoomRow;

#[derive(Debug, Clone)]
pub struct CreateRoom {
    pub name: String,
    pub description: String,
    pub capacity: i32,
    pub price_per_hour_cents: i32,
    pub equipments: Vec<String>,
    pub image_url: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateRoom {
    pub name: Option<String>,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub price_per_hour_cents: Option<i32>,
    pub equipments: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

pub async fn list_active<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<Vec<RoomRow>> {
    sqlx::query_as::<_, RoomRow>(
        r#"
        SELECT id, name, description, capacity, price_per_hour_cents, equipments,
               image_url, images, is_active, created_at, updated_at
        FROM rooms
        WHERE is_active = true
        ORDER BY name ASC
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn list_all<'e>(executor: impl PgExecutor<'e>) -> SqlxResult<Vec<RoomRow>> {
    sqlx::query_as::<_, RoomRow>(
        r#"
        SELECT id, name, description, capacity, price_per_hour_cents, equipments,
               image_url, images, is_active, created_at, updated_at
        FROM rooms
        ORDER BY name ASC
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn get_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<Option<RoomRow>> {
    sqlx::query_as::<_, RoomRow>(
        r#"
        SELECT id, name, description, capacity, price_per_hour_cents, equipments,
               image_url, images, is_active, created_at, updated_at
        FROM rooms
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Fetch the room and hold a row lock on it until the surrounding transaction ends.
/// Every slot write goes through this lock, which serializes writers per room.
pub async fn lock_for_update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<RoomRow>> {
    sqlx::query_as::<_, RoomRow>(
        r#"
        SELECT id, name, description, capacity, price_per_hour_cents, equipments,
               image_url, images, is_active, created_at, updated_at
        FROM rooms
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn create<'e>(executor: impl PgExecutor<'e>, data: CreateRoom) -> SqlxResult<RoomRow> {
    sqlx::query_as::<_, RoomRow>(
        r#"
        INSERT INTO rooms (
            name, description, capacity, price_per_hour_cents, equipments, image_url, images
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, name, description, capacity, price_per_hour_cents, equipments,
                  image_url, images, is_active, created_at, updated_at
        "#,
    )
    .bind(data.name)
    .bind(data.description)
    .bind(data.capacity)
    .bind(data.price_per_hour_cents)
    .bind(data.equipments)
    .bind(data.image_url)
    .bind(data.images)
    .fetch_one(executor)
    .await
}

pub async fn update<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateRoom,
) -> SqlxResult<Option<RoomRow>> {
    sqlx::query_as::<_, RoomRow>(
        r#"
        UPDATE rooms
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            capacity = COALESCE($4, capacity),
            price_per_hour_cents = COALESCE($5, price_per_hour_cents),
            equipments = COALESCE($6, equipments),
            image_url = COALESCE($7, image_url),
            images = COALESCE($8, images),
            is_active = COALESCE($9, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, description, capacity, price_per_hour_cents, equipments,
                  image_url, images, is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(data.name)
    .bind(data.description)
    .bind(data.capacity)
    .bind(data.price_per_hour_cents)
    .bind(data.equipments)
    .bind(data.image_url)
    .bind(data.images)
    .bind(data.is_active)
    .fetch_optional(executor)
    .await
}

pub async fn toggle_active<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<RoomRow>> {
    sqlx::query_as::<_, RoomRow>(
        r#"
        UPDATE rooms
        SET is_active = NOT is_active, updated_at = NOW()
        WHERE id = $1
        RETURNING id, name, description, capacity, price_per_hour_cents, equipments,
                  image_url, images, is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<bool> {
    let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
