//! [`Command`] for authorizing a [`User`].

use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::user::{session, Session},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`] by a [`Session`] token issued by
/// the identity provider.
///
/// Doesn't require the [`User`] to be registered yet.
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

impl<Db, Geo> Command<AuthorizeUserSession> for Service<Db, Geo> {
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config().jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        Ok(session)
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use jsonwebtoken::{EncodingKey, Header};

    use super::AuthorizeUserSession;
    use crate::{
        domain::user::{self, session::Token, Session},
        infra::Memory,
        testing::{self, CountingGeocoder},
        Command as _,
    };

    fn token(session: &Session, secret: &[u8]) -> Token {
        let token = jsonwebtoken::encode(
            &Header::default(),
            session,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();
        token.parse().unwrap()
    }

    fn session(expires_in_secs: i64) -> Session {
        Session {
            user_id: user::Id::new(),
            expires_at: DateTime::from_unix_timestamp(
                DateTime::now().unix_timestamp() + expires_in_secs,
            )
            .unwrap()
            .coerce(),
        }
    }

    #[tokio::test]
    async fn accepts_valid_token() {
        let svc = testing::service(Memory::new(), CountingGeocoder::missing());
        let issued = session(3600);

        let authorized = svc
            .execute(AuthorizeUserSession {
                token: token(&issued, testing::JWT_SECRET),
            })
            .await
            .unwrap();

        assert_eq!(authorized.user_id, issued.user_id);
    }

    #[tokio::test]
    async fn rejects_foreign_or_expired_token() {
        let svc = testing::service(Memory::new(), CountingGeocoder::missing());

        let foreign = svc
            .execute(AuthorizeUserSession {
                token: token(&session(3600), b"other-secret"),
            })
            .await;
        assert!(foreign.is_err());

        let expired = svc
            .execute(AuthorizeUserSession {
                token: token(&session(-3600), testing::JWT_SECRET),
            })
            .await;
        assert!(expired.is_err());
    }
}
