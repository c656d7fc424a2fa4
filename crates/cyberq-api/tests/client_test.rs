// Integration tests for `CyberqClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cyberq_api::{CyberqClient, DeviceTransport, Error, Page, TransportConfig, WriteRequest};

const CONFIG_XML: &str = r"<?xml version='1.0'?>
<nutcallstatus>
<COOK><COOK_NAME>Big Green Egg</COOK_NAME><COOK_TEMP>3000</COOK_TEMP><COOK_SET>2250</COOK_SET><COOK_STATUS>0</COOK_STATUS></COOK>
<FOOD1><FOOD1_NAME>Brisket</FOOD1_NAME><FOOD1_TEMP>OPEN</FOOD1_TEMP><FOOD1_SET>1950</FOOD1_SET><FOOD1_STATUS>4</FOOD1_STATUS></FOOD1>
<CONTROL><TIMEOUT_ACTION>0</TIMEOUT_ACTION><COOKHOLD>2000</COOKHOLD><ALARMDEV>50</ALARMDEV><OPENDETECT>1</OPENDETECT></CONTROL>
<WIFI><MAC>00:1B:2C:3D:4E:5F</MAC></WIFI>
<FWVER>1.7</FWVER>
</nutcallstatus>";

const STATUS_XML: &str = r"<?xml version='1.0'?>
<nutcstatus>
<!--all temperatures are displayed in tenths F, regardless of setting of unit-->
<OUTPUT_PERCENT>42</OUTPUT_PERCENT>
<TIMER_CURR>01:30:00</TIMER_CURR>
<COOK_TEMP>2251</COOK_TEMP>
<FOOD1_TEMP>OPEN</FOOD1_TEMP>
<COOK_STATUS>0</COOK_STATUS>
</nutcstatus>";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, CyberqClient) {
    setup_with(TransportConfig::default()).await
}

async fn setup_with(transport: TransportConfig) -> (MockServer, CyberqClient) {
    let server = MockServer::start().await;
    let port = server.address().port();
    let client = CyberqClient::new("127.0.0.1", port, &transport).unwrap();
    (server, client)
}

async fn mount_reads(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/config.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CONFIG_XML))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STATUS_XML))
        .mount(server)
        .await;
}

fn page_echo(lines: &[&str]) -> String {
    let mut html = String::from("<html><head><script>\r\nfunction init() {\r\n");
    for line in lines {
        html.push_str(line);
        html.push_str("\r\n");
    }
    html.push_str("}\r\n</script></head></html>");
    html
}

// ── Fetch ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_merges_config_and_status() {
    let (server, client) = setup().await;
    mount_reads(&server).await;

    let payload = client.fetch().await.unwrap();

    // status.xml wins on collision
    assert_eq!(payload.get("COOK_TEMP"), Some("2251"));
    assert_eq!(payload.get("COOK_NAME"), Some("Big Green Egg"));
    assert_eq!(payload.get("COOK_SET"), Some("2250"));
    assert_eq!(payload.get("FOOD1_TEMP"), Some("OPEN"));
    assert_eq!(payload.get("ALARMDEV"), Some("50"));
    assert_eq!(payload.get("MAC"), Some("00:1B:2C:3D:4E:5F"));
    assert_eq!(payload.get("OUTPUT_PERCENT"), Some("42"));
    assert!(payload.get("CONTROL").is_none());
}

#[tokio::test]
async fn test_fetch_http_error_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/config.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.fetch().await.unwrap_err();
    assert!(
        matches!(err, Error::HttpStatus { status: 503, .. }),
        "expected HttpStatus(503), got {err:?}"
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_fetch_malformed_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/config.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CONFIG_XML))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/status.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<nutcstatus><COOK_TEMP>22"))
        .mount(&server)
        .await;

    let err = client.fetch().await.unwrap_err();
    assert!(
        matches!(err, Error::MalformedResponse { .. }),
        "expected MalformedResponse, got {err:?}"
    );
}

#[tokio::test]
async fn test_fetch_times_out() {
    let (server, client) =
        setup_with(TransportConfig::with_timeout(Duration::from_millis(200))).await;

    Mock::given(method("GET"))
        .and(path("/config.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(CONFIG_XML)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client.fetch().await.unwrap_err();
    assert!(
        matches!(err, Error::TimedOut { timeout_ms: 200, .. }),
        "expected TimedOut, got {err:?}"
    );
    assert!(err.is_unreachable());
    assert_eq!(err.kind(), "timed_out");
}

#[tokio::test]
async fn test_fetch_shares_one_timeout_across_both_documents() {
    let (server, client) =
        setup_with(TransportConfig::with_timeout(Duration::from_millis(500))).await;

    // each document alone fits the timeout, both together do not
    for (doc, body) in [("/config.xml", CONFIG_XML), ("/status.xml", STATUS_XML)] {
        Mock::given(method("GET"))
            .and(path(doc))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .set_delay(Duration::from_millis(350)),
            )
            .mount(&server)
            .await;
    }

    let started = std::time::Instant::now();
    let err = client.fetch().await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(
        matches!(err, Error::TimedOut { timeout_ms: 500, .. }),
        "expected TimedOut, got {err:?}"
    );
    assert!(elapsed < Duration::from_millis(650), "fetch took {elapsed:?}");
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = CyberqClient::new("127.0.0.1", port, &TransportConfig::default()).unwrap();
    let err = client.fetch().await.unwrap_err();
    assert!(
        matches!(err, Error::ConnectionRefused { .. }),
        "expected ConnectionRefused, got {err:?}"
    );
}

// ── Write ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_write_posts_form_to_page() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/control.htm"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("ALARMDEV=15"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_echo(&[
            "document.mainForm.ALARMDEV.value = \"15\";",
            "document.mainForm.COOK_RAMP.selectedIndex = 0;",
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let request = WriteRequest::new(Page::Control, "ALARMDEV", "15");
    client.write(&request).await.unwrap();
}

#[tokio::test]
async fn test_write_setpoint_checks_tenths_echo() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/index.htm"))
        .and(body_string("COOK_SET=230"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_echo(&[
            "document.mainForm.COOK_SET.value = TempHTMLToPIC(document.mainForm._COOK_SET.value);",
            "document.mainForm._COOK_SET.value = TempPICToHTML(2300,0);}",
        ])))
        .mount(&server)
        .await;

    let request = WriteRequest::new(Page::Index, "COOK_SET", "230")
        .with_expected_echo(Some("2300".into()));
    client.write(&request).await.unwrap();
}

#[tokio::test]
async fn test_write_rejected_when_echo_differs() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/system.htm"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page_echo(&[
            "document.mainForm.LCD_BACKLIGHT.value = \"50\";",
        ])))
        .mount(&server)
        .await;

    let request = WriteRequest::new(Page::System, "LCD_BACKLIGHT", "80");
    let err = client.write(&request).await.unwrap_err();

    match err {
        Error::Rejected {
            key,
            requested,
            echoed,
        } => {
            assert_eq!(key, "LCD_BACKLIGHT");
            assert_eq!(requested, "80");
            assert_eq!(echoed, "50");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_write_without_echo_is_accepted() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/index.htm"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let request = WriteRequest::new(Page::Index, "COOK_NAME", "Pit");
    client.write(&request).await.unwrap();
}

#[tokio::test]
async fn test_write_http_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/control.htm"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let request = WriteRequest::new(Page::Control, "OPENDETECT", "1");
    let err = client.write(&request).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 404, .. }));
}
