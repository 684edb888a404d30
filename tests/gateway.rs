//! Integration tests for the JSON API gateway

use std::sync::Arc;

use pandora_radio::{
    client::Client,
    config::Config,
    credentials::{Credentials, PartnerCredentials},
    crypt::Crypt,
    error::ErrorKind,
    gateway::Gateway,
    remote::Remote,
    session::{now_from_epoch, Session},
    station::Station,
    track::{AudioQuality, Track},
};
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const API_PATH: &str = "/services/json/";
const PARTNER_TOKEN: &str = "VAzrFzq3Kd";
const USER_TOKEN: &str = "XXeuJWc1ppvaQBJ1";

/// Matches requests whose decrypted body contains the given text.
struct EncryptedBody(&'static str);

impl Match for EncryptedBody {
    fn matches(&self, request: &Request) -> bool {
        let Ok(ciphertext) = std::str::from_utf8(&request.body) else {
            return false;
        };

        // Decrypt with the key the body was encrypted with.
        let key = PartnerCredentials::default().encryption_key;
        let crypt = Crypt::new(&key, &key).unwrap();
        crypt
            .decrypt(ciphertext)
            .map(|plaintext| String::from_utf8_lossy(&plaintext).contains(self.0))
            .unwrap_or(false)
    }
}

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "stat": "ok", "result": result }))
}

fn fail(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "stat": "fail",
        "message": message,
        "code": code
    }))
}

/// Encrypts a server time the way the partner login returns it.
fn encrypted_sync_time(server_time: u64) -> String {
    let key = PartnerCredentials::default().decryption_key;
    let crypt = Crypt::new(&key, &key).unwrap();
    crypt.encrypt(&format!("abcd{server_time}"))
}

fn config(mock_server: &MockServer) -> Config {
    Config {
        api_url: Url::parse(&format!("{}{API_PATH}", mock_server.uri())).unwrap(),
        ..Config::new()
    }
}

fn credentials() -> Credentials {
    Credentials::new("john@example.com", "smith")
}

/// Mounts a working login handshake, expected `logins` times.
async fn mount_login(mock_server: &MockServer, logins: u64) {
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(query_param("method", "auth.partnerLogin"))
        .and(header("content-type", "text/plain"))
        .respond_with(ok(json!({
            "partnerId": "42",
            "partnerAuthToken": PARTNER_TOKEN,
            "syncTime": encrypted_sync_time(now_from_epoch() + 3600),
            "stationSkipLimit": 6
        })))
        .expect(logins)
        .mount(mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(query_param("method", "auth.userLogin"))
        .and(query_param("partner_id", "42"))
        .and(query_param("auth_token", PARTNER_TOKEN))
        .and(EncryptedBody(r#""loginType":"user""#))
        .respond_with(ok(json!({
            "userId": "123456789",
            "userAuthToken": USER_TOKEN
        })))
        .expect(logins)
        .mount(mock_server)
        .await;
}

/// Mock for an authenticated call of `name`.
fn authenticated(name: &str) -> wiremock::MockBuilder {
    Mock::given(method("POST"))
        .and(path(API_PATH))
        .and(query_param("method", name))
        .and(query_param("auth_token", USER_TOKEN))
        .and(query_param("user_id", "123456789"))
        .and(EncryptedBody(r#""userAuthToken":"XXeuJWc1ppvaQBJ1""#))
}

async fn logged_in(mock_server: &MockServer) -> (Gateway, Session) {
    mount_login(mock_server, 1).await;
    let gateway = Gateway::new(&config(mock_server)).unwrap();
    let session = gateway
        .login(&PartnerCredentials::default(), &credentials())
        .await
        .unwrap();
    (gateway, session)
}

#[tokio::test]
async fn test_login_handshake() {
    let mock_server = MockServer::start().await;
    let (_, session) = logged_in(&mock_server).await;

    assert_eq!(session.partner_id, "42");
    assert_eq!(session.partner_token, PARTNER_TOKEN);
    assert_eq!(session.user_id, "123456789");
    assert_eq!(session.user_token, USER_TOKEN);
    assert!((3599..=3601).contains(&session.sync_offset));
}

#[tokio::test]
async fn test_rejected_credentials() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(query_param("method", "auth.partnerLogin"))
        .respond_with(ok(json!({
            "partnerId": "42",
            "partnerAuthToken": PARTNER_TOKEN,
            "syncTime": encrypted_sync_time(now_from_epoch())
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(query_param("method", "auth.userLogin"))
        .respond_with(fail(1002, "Wrong user credentials"))
        .mount(&mock_server)
        .await;

    let gateway = Gateway::new(&config(&mock_server)).unwrap();
    let error = gateway
        .login(&PartnerCredentials::default(), &credentials())
        .await
        .unwrap_err();

    assert_eq!(error.kind, ErrorKind::Remote);
    assert_eq!(error.fault().map(|fault| fault.code), Some(1002));
}

#[tokio::test]
async fn test_station_list() {
    let mock_server = MockServer::start().await;
    let (gateway, session) = logged_in(&mock_server).await;

    authenticated("user.getStationList")
        .respond_with(ok(json!({
            "stations": [
                {
                    "stationId": "1",
                    "stationToken": "1",
                    "stationName": "QuickMix",
                    "isQuickMix": true
                },
                {
                    "stationId": "2",
                    "stationToken": "2",
                    "stationName": "Jazz",
                    "stationDetailUrl": "http://mockup.com/station/2"
                }
            ],
            "checksum": "abc"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let list = gateway.station_list(&session).await.unwrap();

    assert_eq!(list.stations.len(), 2);
    assert!(list.stations[0].is_shuffle());
    assert_eq!(list.stations[1].name, "Jazz");
    assert_eq!(list.checksum.as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_genre_stations() {
    let mock_server = MockServer::start().await;
    let (gateway, session) = logged_in(&mock_server).await;

    authenticated("station.getGenreStations")
        .respond_with(ok(json!({
            "categories": [
                {
                    "categoryName": "Jazz",
                    "stations": [{"stationToken": "G100", "stationName": "Bebop"}]
                },
                {
                    "categoryName": "Blues",
                    "stations": [{"stationToken": "G200", "stationName": "Delta Blues"}]
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let genres = gateway.genre_stations(&session).await.unwrap();

    assert_eq!(genres.keys().collect::<Vec<_>>(), ["Blues", "Jazz"]);
    assert_eq!(genres["Jazz"][0].token, "G100");
}

#[tokio::test]
async fn test_create_station() {
    let mock_server = MockServer::start().await;
    let (gateway, session) = logged_in(&mock_server).await;

    authenticated("station.createStation")
        .and(EncryptedBody(r#""musicToken":"G100""#))
        .respond_with(ok(json!({
            "stationId": "3",
            "stationToken": "3",
            "stationName": "Bebop Radio"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let station = gateway.create_station(&session, "G100").await.unwrap();
    assert_eq!(station.id, "3");
}

#[tokio::test]
async fn test_playlist() {
    let mock_server = MockServer::start().await;
    let (gateway, session) = logged_in(&mock_server).await;

    authenticated("station.getPlaylist")
        .and(EncryptedBody(r#""stationToken":"2""#))
        .and(EncryptedBody(r#""includeTrackLength":true"#))
        .respond_with(ok(json!({
            "items": [
                {
                    "trackToken": "0001",
                    "artistName": "Mock Artist Name",
                    "albumName": "Mock Album Name",
                    "albumArtUrl": "http://mockup.com/track/art_url",
                    "audioUrlMap": {
                        "highQuality": {
                            "bitrate": "64",
                            "encoding": "aacplus",
                            "audioUrl": "http://mockup.com/high.mp4",
                            "protocol": "http"
                        }
                    },
                    "trackLength": 240,
                    "songName": "Mock Track",
                    "stationId": "2",
                    "songRating": 0,
                    "adToken": null
                },
                {
                    "trackToken": null,
                    "artistName": null,
                    "audioUrlMap": null,
                    "songName": null,
                    "adToken": "000000000000000000-none"
                }
            ]
        })))
        .mount(&mock_server)
        .await;

    let station = Station::new("2", "2", "Jazz");
    let tracks = gateway.playlist(&session, &station).await.unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].uri().as_str(), "pandora:track:2:0001");
    assert_eq!(tracks[0].bitrate(AudioQuality::Low), Some(64));
    assert!(matches!(tracks[1], Track::Advertisement(_)));
    assert_eq!(
        tracks[1].uri().as_str(),
        "pandora:ad:2:none:000000000000000000-none"
    );
}

#[tokio::test]
async fn test_fault_codes() {
    let mock_server = MockServer::start().await;
    let (gateway, session) = logged_in(&mock_server).await;

    authenticated("user.getStationList")
        .respond_with(fail(1001, "An unexpected error occurred"))
        .mount(&mock_server)
        .await;

    authenticated("station.getGenreStations")
        .respond_with(fail(1006, "Station does not exist"))
        .mount(&mock_server)
        .await;

    let error = gateway.station_list(&session).await.unwrap_err();
    assert!(error.is_token_expired());

    let error = gateway.genre_stations(&session).await.unwrap_err();
    assert_eq!(error.kind, ErrorKind::Remote);
    assert_eq!(error.fault().map(|fault| fault.code), Some(1006));
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let mock_server = MockServer::start().await;
    let (gateway, session) = logged_in(&mock_server).await;

    authenticated("user.getStationList")
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let error = gateway.station_list(&session).await.unwrap_err();
    assert_eq!(error.kind, ErrorKind::Unavailable);
}

#[tokio::test]
async fn test_reauthentication_on_expired_token() {
    let mock_server = MockServer::start().await;
    mount_login(&mock_server, 2).await;

    authenticated("user.getStationList")
        .respond_with(fail(1001, "Invalid Auth Token"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    authenticated("user.getStationList")
        .respond_with(ok(json!({ "stations": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = config(&mock_server);
    let client = Client::new(&config, Arc::new(Gateway::new(&config).unwrap()));
    client.login(&credentials()).await.unwrap();

    let list = client.station_list().await.unwrap();
    assert!(list.stations.is_empty());
}

#[tokio::test]
async fn test_probe() {
    let mock_server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/audio/high.mp4"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let gateway = Gateway::new(&config(&mock_server)).unwrap();

    let found = Url::parse(&format!("{}/audio/high.mp4", mock_server.uri())).unwrap();
    assert_eq!(gateway.probe(&found).await.unwrap(), http::StatusCode::OK);

    let missing = Url::parse(&format!("{}/audio/gone.mp4", mock_server.uri())).unwrap();
    assert_eq!(
        gateway.probe(&missing).await.unwrap(),
        http::StatusCode::NOT_FOUND
    );
}
