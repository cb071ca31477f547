use super::IntoAppError;
use roam_core::{AppError, DatabaseError, RusqliteErrorExt};
use roam_landmarks::{CatalogueError, FavoritesError, StoreError};

impl IntoAppError for FavoritesError {
    fn into_app_error(self) -> AppError {
        match self {
            FavoritesError::Store(StoreError::Sqlite(err)) => {
                AppError::Database(err.into_database_error())
            }
            FavoritesError::Store(StoreError::Io(err)) => AppError::Io(err),
            FavoritesError::Encode(err) => {
                AppError::Database(DatabaseError::QueryFailed(err.to_string()))
            }
        }
    }
}

impl IntoAppError for CatalogueError {
    fn into_app_error(self) -> AppError {
        AppError::Catalogue(self.to_string())
    }
}
