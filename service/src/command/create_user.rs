//! [`Command`] for registering a [`User`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Session;
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for registering a [`User`] authorized by a [`Session`].
///
/// Returns the already registered [`User`] as is, if any.
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// ID of the [`User`], as issued by the identity provider.
    pub user_id: user::Id,

    /// [`user::Name`] of a new [`User`].
    pub name: user::Name,
}

impl<Db, Geo> Command<CreateUser> for Service<Db, Geo>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        let CreateUser { user_id, name } = cmd;

        let existing = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::wrap!())?;
        if let Some(user) = existing {
            return Ok(user);
        }

        let user = User {
            id: user_id,
            name,
            favorites: [].into(),
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(user.clone()))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
pub type ExecutionError = database::Error;

#[cfg(test)]
mod spec {
    use super::CreateUser;
    use crate::{
        domain::user,
        infra::Memory,
        testing::{self, CountingGeocoder},
        Command as _,
    };

    #[tokio::test]
    async fn keeps_existing_user() {
        let svc = testing::service(Memory::new(), CountingGeocoder::missing());
        let user_id = user::Id::new();

        let created = svc
            .execute(CreateUser {
                user_id,
                name: user::Name::new("Alice").unwrap(),
            })
            .await
            .unwrap();
        let again = svc
            .execute(CreateUser {
                user_id,
                name: user::Name::new("Bob").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(created.id, user_id);
        assert_eq!(again.name, created.name);
        assert_eq!(again.created_at, created.created_at);
    }
}
