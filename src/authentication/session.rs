use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::schema::Id;

/// Identity of the requester, supplied by the authentication layer. Reads
/// are open to anyone; operations that need an authenticated caller gate on
/// [`Viewer::require_user`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Viewer {
    Anonymous,
    User(Id),
}

impl Viewer {
    pub fn user_id(self) -> Option<Id> {
        match self {
            Viewer::User(id) => Some(id),
            Viewer::Anonymous => None,
        }
    }

    pub fn is_anonymous(self) -> bool {
        matches!(self, Viewer::Anonymous)
    }

    pub fn require_user(self) -> Result<Id, Error> {
        self.user_id()
            .ok_or_else(|| Error::forbidden("You must be signed in to perform this action"))
    }
}

impl From<Option<Id>> for Viewer {
    fn from(user_id: Option<Id>) -> Self {
        match user_id {
            Some(id) => Viewer::User(id),
            None => Viewer::Anonymous,
        }
    }
}
