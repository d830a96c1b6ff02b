use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};

use crate::{
    db::Store,
    error::{AppError, AppResult},
    models::{CatalogMovie, Movie, Rate, User},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

#[derive(sqlx::FromRow)]
struct MovieRow {
    imdb_id: String,
    author_id: String,
    catalog: Json<CatalogMovie>,
    created_at: DateTime<Utc>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        let mut catalog = row.catalog.0;
        catalog.imdb_id = row.imdb_id;
        Movie {
            catalog,
            author_id: row.author_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct RateRow {
    author_id: String,
    imdb_id: String,
    seen: bool,
    rate: i32,
}

impl From<RateRow> for Rate {
    fn from(row: RateRow) -> Self {
        Rate {
            author_id: row.author_id,
            imdb_id: row.imdb_id,
            seen: row.seen,
            rate: row.rate,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: String,
    name: String,
    nickname: String,
    avatar: String,
    email: String,
    admin: bool,
    profile: Value,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            user_id: row.user_id,
            name: row.name,
            nickname: row.nickname,
            avatar: row.avatar,
            email: row.email,
            admin: row.admin,
            profile: row.profile,
        }
    }
}

const MOVIE_COLUMNS: &str = "imdb_id, author_id, catalog, created_at";
const USER_COLUMNS: &str = "user_id, name, nickname, avatar, email, admin, profile";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and applies the embedded migrations
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = create_pool(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!("Database migrations applied");

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl Store for PostgresStore {
    async fn list_movies(&self) -> AppResult<Vec<Movie>> {
        let rows: Vec<MovieRow> = sqlx::query_as(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY created_at, imdb_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn find_movie(&self, imdb_id: &str) -> AppResult<Option<Movie>> {
        let row: Option<MovieRow> = sqlx::query_as(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies WHERE imdb_id = $1"
        ))
        .bind(imdb_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Movie::from))
    }

    async fn insert_movie(&self, movie: &Movie) -> AppResult<()> {
        let result = sqlx::query(
            "INSERT INTO movies (imdb_id, author_id, catalog, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(movie.imdb_id())
        .bind(&movie.author_id)
        .bind(Json(&movie.catalog))
        .bind(movie.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
                format!("resource {} already exists", movie.imdb_id()),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_movie(&self, imdb_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE imdb_id = $1")
            .bind(imdb_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_rates(&self) -> AppResult<Vec<Rate>> {
        let rows: Vec<RateRow> = sqlx::query_as(
            "SELECT author_id, imdb_id, seen, rate FROM rates ORDER BY created_at, author_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Rate::from).collect())
    }

    async fn rates_for_movie(&self, imdb_id: &str) -> AppResult<Vec<Rate>> {
        let rows: Vec<RateRow> = sqlx::query_as(
            "SELECT author_id, imdb_id, seen, rate FROM rates WHERE imdb_id = $1 ORDER BY created_at, author_id",
        )
        .bind(imdb_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Rate::from).collect())
    }

    async fn upsert_rate(&self, rate: &Rate) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rates (author_id, imdb_id, seen, rate)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (author_id, imdb_id)
            DO UPDATE SET seen = EXCLUDED.seen, rate = EXCLUDED.rate
            "#,
        )
        .bind(&rate.author_id)
        .bind(&rate.imdb_id)
        .bind(rate.seen)
        .bind(rate.rate)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_rates_for_movie(&self, imdb_id: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM rates WHERE imdb_id = $1")
            .bind(imdb_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, user_id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_user(&self, user_id: &str) -> AppResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn insert_user_if_absent(&self, user: &User) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (user_id, name, nickname, avatar, email, admin, profile)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.name)
        .bind(&user.nickname)
        .bind(&user.avatar)
        .bind(&user.email)
        .bind(user.admin)
        .bind(&user.profile)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
