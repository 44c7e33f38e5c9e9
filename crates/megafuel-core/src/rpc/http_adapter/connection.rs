use reqwest::Url;

use crate::error::ClientError;

pub(super) fn parse_connection(connection: &str) -> Result<Url, ClientError> {
    let parsed = Url::parse(connection).map_err(|e| ClientError::DialFailure {
        target: connection.to_owned(),
        reason: format!("expected HTTP(S) URL ({e})"),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ClientError::DialFailure {
            target: connection.to_owned(),
            reason: format!("unsupported connection scheme `{other}`; expected http or https"),
        }),
    }
}
