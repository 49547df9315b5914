use http::{HeaderValue, Method};
use http::header::HeaderName;
use parley_config::{AnyOrArray, CorsConfig};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build a CORS layer from configuration
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = match &config.origins {
        AnyOrArray::Any => AllowOrigin::any(),
        AnyOrArray::List(origins) => origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect::<Vec<HeaderValue>>()
            .into(),
    };

    let methods = match &config.methods {
        AnyOrArray::Any => AllowMethods::any(),
        AnyOrArray::List(methods) => methods
            .iter()
            .filter_map(|method| method.parse().ok())
            .collect::<Vec<Method>>()
            .into(),
    };

    let headers = match &config.headers {
        AnyOrArray::Any => AllowHeaders::any(),
        AnyOrArray::List(headers) => parse_headers(headers).into(),
    };

    let mut layer = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers);

    if !config.expose_headers.is_empty() {
        layer = layer.expose_headers(parse_headers(&config.expose_headers));
    }

    if let Some(max_age) = config.max_age_duration() {
        layer = layer.max_age(max_age);
    }

    layer
}

fn parse_headers(names: &[String]) -> Vec<HeaderName> {
    names.iter().filter_map(|name| name.parse().ok()).collect()
}
