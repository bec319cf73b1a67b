//! HTTP interface
//!
//! | Method | Path        | Response                                   |
//! |--------|-------------|--------------------------------------------|
//! | GET    | `/health`   | `ok`                                       |
//! | GET    | `/{domain}` | `{"available": bool, "whois": Record}`     |
//!
//! A failed lookup is not an HTTP error: it is logged and answered like an
//! unknown registry response, `available: false` with an empty record.

use actix_web::{get, web, HttpResponse};
use serde::Serialize;
use tracing::{info, warn};
use whois_refer_lib::{Record, WhoisChecker};

/// Body of a lookup response.
#[derive(Debug, Serialize)]
pub struct LookupResponse {
    pub available: bool,
    pub whois: Record,
}

#[get("/health")]
async fn health() -> &'static str {
    "ok"
}

#[get("/{domain}")]
async fn lookup(domain: web::Path<String>, checker: web::Data<WhoisChecker>) -> HttpResponse {
    let domain = domain.into_inner();

    let body = match checker.lookup(&domain).await {
        Ok(result) => {
            info!(
                "Looked up \"{}\" (available: {}, {} ms)",
                domain,
                result.available,
                result.duration.as_millis()
            );
            LookupResponse {
                available: result.available,
                whois: result.whois,
            }
        }
        Err(e) => {
            warn!("Lookup of \"{}\" failed: {}", domain, e);
            LookupResponse {
                available: false,
                whois: Record::default(),
            }
        }
    };

    HttpResponse::Ok().json(body)
}

pub fn app_setup(cfg: &mut web::ServiceConfig) {
    // `/health` must be registered before the catch-all domain route
    cfg.service(health).service(lookup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::header, test, App};
    use std::time::Duration;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use whois_refer_lib::LookupConfig;

    async fn scripted_whois(answers: Vec<&'static str>) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            for answer in answers {
                let (socket, _) = listener.accept().await.unwrap();
                let mut reader = BufReader::new(socket);
                let mut query = Vec::new();
                reader.read_until(b'\n', &mut query).await.unwrap();
                reader.get_mut().write_all(answer.as_bytes()).await.unwrap();
            }
        });

        port
    }

    fn checker_for(port: u16) -> web::Data<WhoisChecker> {
        web::Data::new(WhoisChecker::with_config(
            LookupConfig::default()
                .with_root_server("127.0.0.1")
                .with_port(port)
                .with_timeout(Duration::from_secs(2)),
        ))
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(
            App::new().app_data(checker_for(1)).configure(app_setup),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, web::Bytes::from_static(b"ok"));
    }

    #[actix_web::test]
    async fn test_lookup_registered_domain() {
        let port = scripted_whois(vec![
            "refer: 127.0.0.1\n",
            "Domain Name: EXAMPLE.COM\nCreation Date: 2020-01-01T00:00:00Z\nRegistry Expiry Date: 2030-01-01T00:00:00Z\nName Server: A.IANA-SERVERS.NET\nName Server: B.IANA-SERVERS.NET\nDomain Status: clientTransferProhibited",
        ])
        .await;
        let app = test::init_service(
            App::new().app_data(checker_for(port)).configure(app_setup),
        )
        .await;

        let req = test::TestRequest::get().uri("/example.com").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["available"], false);
        assert_eq!(body["whois"]["Created"], "2020-01-01T00:00:00Z");
        assert_eq!(body["whois"]["Expiration"], "2030-01-01T00:00:00Z");
        assert_eq!(
            body["whois"]["Nameservers"],
            serde_json::json!(["A.IANA-SERVERS.NET", "B.IANA-SERVERS.NET"])
        );
        assert_eq!(
            body["whois"]["Status"],
            serde_json::json!(["clientTransferProhibited"])
        );
    }

    #[actix_web::test]
    async fn test_lookup_available_domain() {
        let port = scripted_whois(vec!["refer: 127.0.0.1\n", "Domain Not Found\n"]).await;
        let app = test::init_service(
            App::new().app_data(checker_for(port)).configure(app_setup),
        )
        .await;

        let req = test::TestRequest::get().uri("/unregistered.example").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["available"], true);
        assert_eq!(body["whois"]["Referral"], "");
    }

    #[actix_web::test]
    async fn test_lookup_failure_answers_empty_record() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let app = test::init_service(
            App::new().app_data(checker_for(port)).configure(app_setup),
        )
        .await;

        let req = test::TestRequest::get().uri("/example.com").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["available"], false);
        assert_eq!(
            body["whois"],
            serde_json::to_value(Record::default()).unwrap()
        );
    }
}
