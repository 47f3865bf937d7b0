use crate::{GoogleRequest, Service};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tower_api_client::Request;

/// OpenID Connect profile of the token's owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Default, Debug, Clone, Serialize)]
pub struct GetUserInfo;

impl Request for GetUserInfo {
    type Data = ();
    type Response = UserInfo;

    fn endpoint(&self) -> Cow<'_, str> {
        "/oauth2/v3/userinfo".into()
    }
}

impl GoogleRequest for GetUserInfo {
    const SERVICE: Service = Service::GoogleApis;
}
