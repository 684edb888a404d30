//! HTTP implementation of [`Remote`] for the Pandora JSON API.
//!
//! Every call is a `POST` to the API endpoint with the method name and the
//! current authorization in the query string:
//!
//! ```text
//! {api_url}?method=user.getStationList&partner_id=..&auth_token=..&user_id=..
//! ```
//!
//! The body is the method's JSON object. Authenticated calls additionally
//! carry `userAuthToken` and the synchronized `syncTime`. All bodies but the
//! partner login are encrypted, see [`crypt`](crate::crypt).
//!
//! # Login
//!
//! 1. `auth.partnerLogin` with the partner credentials, in plain text
//! 2. Decrypt the server time to learn the clock offset
//! 3. `auth.userLogin` with the listener credentials
//!
//! Only when all steps succeed is a [`Session`] returned.

use std::{
    sync::{Arc, PoisonError, RwLock},
    time::SystemTime,
};

use async_trait::async_trait;
use http::StatusCode;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use url::Url;

use crate::{
    config::Config,
    credentials::{Credentials, PartnerCredentials},
    crypt::Crypt,
    error::{Error, Result},
    http::Client as HttpClient,
    protocol::{
        self,
        auth::{PartnerLogin, UserLogin},
        playlist::GetPlaylist,
        station::{CreateStation, GetGenreStations, GetStationList},
        Method, Response,
    },
    remote::Remote,
    session::{self, now_from_epoch, Session},
    station::{GenreDirectory, Station, StationList},
    track::Track,
};

/// Authorization sent along with a call.
enum Auth<'a> {
    None,
    Partner { id: &'a str, token: &'a str },
    User(&'a Session),
}

pub struct Gateway {
    http_client: HttpClient,
    api_url: Url,

    /// Ciphers of the partner that logged in last.
    crypt: RwLock<Arc<Crypt>>,
}

impl Gateway {
    /// Although request bodies are JSON or hex, the `Content-Type` is not.
    const PLAIN_TEXT_CONTENT: HeaderValue = HeaderValue::from_static("text/plain");

    /// # Errors
    ///
    /// Will return `Err` if:
    /// - the HTTP client cannot be built
    /// - the partner keys of `config` are not valid Blowfish keys
    pub fn new(config: &Config) -> Result<Self> {
        let partner = &config.partner;
        let crypt = Crypt::new(&partner.encryption_key, &partner.decryption_key)?;

        Ok(Self {
            http_client: HttpClient::new(config)?,
            api_url: config.api_url.clone(),
            crypt: RwLock::new(Arc::new(crypt)),
        })
    }

    fn crypt(&self) -> Arc<Crypt> {
        Arc::clone(&self.crypt.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn url<M: Method>(&self, auth: &Auth<'_>) -> Url {
        let mut url = self.api_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("method", M::METHOD);
            match auth {
                Auth::None => {}
                Auth::Partner { id, token } => {
                    query.append_pair("partner_id", id);
                    query.append_pair("auth_token", token);
                }
                Auth::User(session) => {
                    query.append_pair("partner_id", &session.partner_id);
                    query.append_pair("auth_token", &session.user_token);
                    query.append_pair("user_id", &session.user_id);
                }
            }
        }
        url
    }

    fn body<M: Method>(method: &M, auth: &Auth<'_>, crypt: &Crypt) -> Result<String> {
        let mut body = serde_json::to_value(method)?;

        if let Auth::User(session) = auth {
            let object = body.as_object_mut().ok_or_else(|| {
                Error::internal(format!("{} body is not a JSON object", M::METHOD))
            })?;
            object.insert("userAuthToken".to_owned(), session.user_token.clone().into());
            object.insert("syncTime".to_owned(), session.sync_time().into());
        }

        let json = body.to_string();
        Ok(if M::ENCRYPTED {
            crypt.encrypt(&json)
        } else {
            json
        })
    }

    /// Sends `method` and unwraps the response envelope.
    ///
    /// # Errors
    ///
    /// Will return `Err` if:
    /// - the HTTP request fails or answers with an error status
    /// - the response cannot be parsed
    /// - the remote service reports a fault
    async fn request<M: Method>(
        &self,
        method: &M,
        auth: Auth<'_>,
        crypt: &Crypt,
    ) -> Result<M::Response> {
        let url = self.url::<M>(&auth);
        let body = Self::body(method, &auth, crypt)?;

        let mut request = self.http_client.post(url, body);
        request
            .headers_mut()
            .try_insert(CONTENT_TYPE, Self::PLAIN_TEXT_CONTENT)?;

        let response = self.http_client.execute(request).await?;
        let status = response.status();
        if status.is_server_error() {
            return Err(Error::unavailable(format!("{}: {status}", M::METHOD)));
        }

        let body = response.error_for_status()?.text().await?;
        let response: Response<M::Response> = protocol::json(&body, M::METHOD)?;
        response.into_result()
    }
}

#[async_trait]
impl Remote for Gateway {
    async fn login(&self, partner: &PartnerCredentials, user: &Credentials) -> Result<Session> {
        let crypt = Crypt::new(&partner.encryption_key, &partner.decryption_key)?;

        let partner_login = PartnerLogin {
            username: partner.username.clone(),
            password: partner.password.clone(),
            device_model: partner.device.clone(),
            version: PartnerLogin::VERSION.to_owned(),
            include_urls: true,
        };
        let partner_auth = self.request(&partner_login, Auth::None, &crypt).await?;

        let server_time = crypt.decrypt_sync_time(&partner_auth.sync_time)?;
        let sync_offset = session::offset(server_time, now_from_epoch());
        trace!("server time: {server_time}");

        let user_login = UserLogin {
            login_type: UserLogin::LOGIN_TYPE.to_owned(),
            username: user.username.clone(),
            password: user.password.clone(),
            partner_auth_token: partner_auth.partner_auth_token.clone(),
            sync_time: session::synchronize(now_from_epoch(), sync_offset),
        };
        let auth = Auth::Partner {
            id: &partner_auth.partner_id,
            token: &partner_auth.partner_auth_token,
        };
        let user_auth = self.request(&user_login, auth, &crypt).await?;

        *self.crypt.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(crypt);

        Ok(Session {
            partner_id: partner_auth.partner_id,
            partner_token: partner_auth.partner_auth_token,
            user_id: user_auth.user_id,
            user_token: user_auth.user_auth_token,
            sync_offset,
            start_time: SystemTime::now(),
        })
    }

    async fn station_list(&self, session: &Session) -> Result<StationList> {
        let method = GetStationList {
            include_station_art_url: true,
        };
        self.request(&method, Auth::User(session), &self.crypt())
            .await
    }

    async fn genre_stations(&self, session: &Session) -> Result<GenreDirectory> {
        let categories = self
            .request(&GetGenreStations {}, Auth::User(session), &self.crypt())
            .await?;
        Ok(categories.into())
    }

    async fn create_station(&self, session: &Session, search_token: &str) -> Result<Station> {
        let method = CreateStation {
            music_token: search_token.to_owned(),
        };
        self.request(&method, Auth::User(session), &self.crypt())
            .await
    }

    async fn playlist(&self, session: &Session, station: &Station) -> Result<Vec<Track>> {
        let method = GetPlaylist {
            station_token: station.token.clone(),
            include_track_length: true,
        };
        let playlist = self
            .request(&method, Auth::User(session), &self.crypt())
            .await?;

        playlist
            .items
            .into_iter()
            .map(|item| item.into_track(&station.id))
            .collect()
    }

    async fn probe(&self, url: &Url) -> Result<StatusCode> {
        let request = self.http_client.head(url.clone());
        let response = self.http_client.execute(request).await?;
        Ok(response.status())
    }
}
