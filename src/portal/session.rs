use scraper::{Html, Selector};
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

const LOGIN_PATH: &str = "login/index.php";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Invalid portal URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Login page has no logintoken input")]
    MissingLoginToken,
    #[error("Login rejected, portal redirected to {landed}")]
    LoginRejected { landed: String },
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub struct PortalSession {
    root: Url,
    client: reqwest::Client,
}

impl PortalSession {
    pub fn new(base_url: &str) -> Result<Self, SessionError> {
        let mut root = Url::parse(base_url)?;
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }

        let client = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self { root, client })
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub async fn login(base_url: &str, credentials: &Credentials) -> Result<Self, SessionError> {
        let session = Self::new(base_url)?;
        let login_url = session.root.join(LOGIN_PATH)?;

        tracing::info!("Fetching login page {}", login_url);
        let login_page = session.client.get(login_url.clone()).send().await?.text().await?;
        let token = extract_login_token(&login_page).ok_or(SessionError::MissingLoginToken)?;

        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("logintoken", token.as_str()),
        ];

        let response = session.client.post(login_url).form(&form).send().await?;
        tracing::info!("Login response status: {}, landed on {}", response.status(), response.url());

        if response.url() != &session.root {
            tracing::error!("Login rejected for user {}", credentials.username);
            return Err(SessionError::LoginRejected {
                landed: response.url().to_string(),
            });
        }

        Ok(session)
    }

    pub async fn fetch(&self, link: &str) -> Result<String, SessionError> {
        let url = self.root.join(link)?;
        tracing::debug!("GET {}", url);

        let body = self.client.get(url).send().await?.text().await?;
        Ok(body)
    }
}

pub fn extract_login_token(html: &str) -> Option<String> {
    static TOKEN_SELECTOR: OnceLock<Selector> = OnceLock::new();
    let selector = TOKEN_SELECTOR.get_or_init(|| {
        Selector::parse(r#"input[name="logintoken"]"#).expect("invalid logintoken selector")
    });

    let document = Html::parse_document(html);
    document
        .select(selector)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string)
}
