#[cfg(not(target_arch = "wasm32"))]
mod native {
    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use ripple::core::kv::MemStore;
    use std::sync::Mutex;
    use tracing::info;
    use tracing_subscriber::{fmt, EnvFilter};

    mod adapter {
        use actix_web::HttpRequest;
        use spin_sdk::http::{Method, Request, Response};

        pub fn to_spin_request(
            req: &HttpRequest,
            body: actix_web::web::Bytes,
        ) -> anyhow::Result<Request> {
            let method = match req.method().as_str() {
                "GET" => Method::Get,
                "POST" => Method::Post,
                "PUT" => Method::Put,
                "DELETE" => Method::Delete,
                "HEAD" => Method::Head,
                "OPTIONS" => Method::Options,
                "PATCH" => Method::Patch,
                _ => Method::Get,
            };

            let uri = req.uri().to_string();
            let body_vec = body.to_vec();

            let mut req_builder = Request::builder();
            let method_set = req_builder.method(method);
            let uri_set = method_set.uri(&uri);

            // Copy headers
            let mut with_headers = uri_set;
            for (name, value) in req.headers() {
                if let Ok(val_str) = value.to_str() {
                    with_headers = with_headers.header(name.as_str(), val_str);
                }
            }

            Ok(with_headers.body(body_vec).build())
        }

        pub fn to_actix_response(spin_resp: Response) -> actix_web::HttpResponse {
            let status = *spin_resp.status();
            let body = spin_resp.body().to_vec();

            let mut response = actix_web::HttpResponse::build(
                actix_web::http::StatusCode::from_u16(status)
                    .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
            );

            response.body(body)
        }
    }

    // One request at a time: each API call is a single synchronous
    // transaction against the shared store.
    static REQUEST_LOCK: Mutex<()> = Mutex::new(());

    pub async fn run() -> std::io::Result<()> {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();

        let store = web::Data::new(MemStore::new());
        if ripple::config::seed_demo_enabled() {
            if let Err(err) = ripple::core::db::seed_demo_data(store.get_ref()) {
                tracing::warn!(%err, "demo seed failed");
            }
        }

        info!("Server listening on http://0.0.0.0:3000");

        HttpServer::new(move || {
            App::new()
                .app_data(store.clone())
                .default_service(web::route().to(handle_all))
        })
        .bind("0.0.0.0:3000")?
        .run()
        .await
    }

    async fn handle_all(
        store: web::Data<MemStore>,
        req: HttpRequest,
        body: web::Bytes,
    ) -> HttpResponse {
        let spin_req = match adapter::to_spin_request(&req, body) {
            Ok(r) => r,
            Err(_) => {
                return HttpResponse::BadRequest()
                    .json(serde_json::json!({"error": "Invalid request"}))
            }
        };

        let result = {
            let _guard = REQUEST_LOCK.lock().expect("request lock poisoned");
            ripple::route(store.get_ref(), spin_req)
        };

        match result {
            Ok(spin_resp) => adapter::to_actix_response(spin_resp),
            Err(err) => {
                tracing::error!(%err, "request failed");
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({"error": "Internal server error"}))
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
