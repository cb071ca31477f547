use super::IntoAppError;
use roam_core::{AppError, NetworkError, PlacesError, ReqwestErrorExt};
use roam_places::PlacesError as LookupError;

impl IntoAppError for LookupError {
    fn into_app_error(self) -> AppError {
        match self {
            LookupError::InvalidApiKey => AppError::Places(PlacesError::InvalidApiKey),
            LookupError::RateLimited => AppError::Places(PlacesError::RateLimited),
            LookupError::ApiError { status, message } => {
                AppError::Places(PlacesError::ApiError(format!("{}: {}", status, message)))
            }
            LookupError::Parse(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
            LookupError::NetworkError(err) => AppError::Network(err.into_network_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_mapping() {
        let err = LookupError::RateLimited.into_app_error();
        assert!(matches!(err, AppError::Places(PlacesError::RateLimited)));
    }

    #[test]
    fn test_api_error_keeps_status() {
        let err = LookupError::ApiError {
            status: 400,
            message: "bad filter".into(),
        }
        .into_app_error();
        assert!(err.to_string().contains("400"));
    }
}
