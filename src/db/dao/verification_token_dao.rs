use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use super::{DaoBase, DaoResult};
use crate::{
    auth::VerificationKind,
    db::entities::{prelude::VerificationToken, verification_token},
};

#[derive(Clone)]
pub struct VerificationTokenDao {
    db: DatabaseConnection,
}

impl DaoBase for VerificationTokenDao {
    type Entity = VerificationToken;

    fn from_db(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl VerificationTokenDao {
    /// Stores `token`, dropping any earlier token of the same kind for the
    /// same identifier.
    pub async fn issue(
        &self,
        identifier: &str,
        kind: VerificationKind,
        token: &str,
        expires_at: chrono::DateTime<chrono::FixedOffset>,
    ) -> DaoResult<verification_token::Model> {
        VerificationToken::delete_many()
            .filter(verification_token::Column::Identifier.eq(identifier))
            .filter(verification_token::Column::Kind.eq(kind.as_str()))
            .exec(&self.db)
            .await?;

        self.create(verification_token::ActiveModel {
            token: Set(token.to_string()),
            identifier: Set(identifier.to_string()),
            kind: Set(kind.as_str().to_string()),
            expires_at: Set(expires_at),
            ..Default::default()
        })
        .await
    }

    pub async fn find_by_token(
        &self,
        token: &str,
        kind: VerificationKind,
    ) -> DaoResult<Option<verification_token::Model>> {
        let token = token.to_string();
        self.find_first(move |query| {
            query
                .filter(verification_token::Column::Token.eq(token))
                .filter(verification_token::Column::Kind.eq(kind.as_str()))
        })
        .await
    }

    /// Number of rows removed.
    pub async fn delete_token(&self, token: &str) -> DaoResult<u64> {
        let result = VerificationToken::delete_many()
            .filter(verification_token::Column::Token.eq(token))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete_for_identifier(&self, identifier: &str) -> DaoResult<u64> {
        let result = VerificationToken::delete_many()
            .filter(verification_token::Column::Identifier.eq(identifier))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
