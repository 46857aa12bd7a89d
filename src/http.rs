use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};

use crate::{CallbackParams, ConnectError, Connector, Provider};

/// Builds a router exposing `GET /integrations/{provider}/oauth2callback`
/// for one connector, ready to be merged into the host application's router.
pub fn callback_router<P>(connector: Connector<P>) -> Router
where
    P: Provider + Clone + 'static,
{
    let path = format!("/integrations/{}/oauth2callback", connector.provider().id());
    Router::new()
        .route(&path, get(callback_handler::<P>))
        .with_state(connector)
}

async fn callback_handler<P>(
    State(connector): State<Connector<P>>,
    Query(params): Query<CallbackParams>,
) -> Response
where
    P: Provider + Clone + 'static,
{
    match connector.handle_callback(&params).await {
        Ok(html) => Html(html).into_response(),
        Err(error) => (error_status(&error), error.to_string()).into_response(),
    }
}

fn error_status(error: &ConnectError) -> StatusCode {
    if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    }
}
