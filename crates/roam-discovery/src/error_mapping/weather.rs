use super::IntoAppError;
use roam_core::{AppError, NetworkError, ReqwestErrorExt, WeatherError};
use roam_weather::WeatherError as LookupError;

impl IntoAppError for LookupError {
    fn into_app_error(self) -> AppError {
        match self {
            LookupError::Network(err) => AppError::Network(err.into_network_error()),
            LookupError::InvalidApiKey => AppError::Weather(WeatherError::InvalidApiKey),
            LookupError::Api { status, .. } if status >= 500 => {
                AppError::Weather(WeatherError::ServiceUnavailable)
            }
            LookupError::Api { status, message } => {
                AppError::Weather(WeatherError::ApiError(format!("{}: {}", status, message)))
            }
            LookupError::Parse(msg) => AppError::Network(NetworkError::InvalidResponse(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_failure_is_service_unavailable() {
        let err = LookupError::Api {
            status: 502,
            message: "bad gateway".into(),
        }
        .into_app_error();
        assert!(matches!(
            err,
            AppError::Weather(WeatherError::ServiceUnavailable)
        ));
    }

    #[test]
    fn test_parse_failure_is_invalid_response() {
        let err = LookupError::Parse("eof".into()).into_app_error();
        assert!(matches!(
            err,
            AppError::Network(NetworkError::InvalidResponse(_))
        ));
    }
}
